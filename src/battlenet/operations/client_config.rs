//! `Battle.net.config` inside the prefix

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;

/// Location of the client settings for Windows user `user`.
pub fn client_config_path(prefix: &Path, user: &str) -> PathBuf {
    prefix
        .join("drive_c/users")
        .join(user)
        .join("Application Data/Battle.net/Battle.net.config")
}

/// The whole document. A missing file reads as an empty object.
pub fn read_client_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Object(Default::default()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Replace the document with `config`.
pub fn write_client_config(path: &Path, config: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(config)?)?;
    tracing::debug!(path = %path.display(), "Wrote Battle.net config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_then_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = client_config_path(dir.path(), "gamer");
        assert!(path.ends_with("users/gamer/Application Data/Battle.net/Battle.net.config"));
        assert_eq!(read_client_config(&path).unwrap(), serde_json::json!({}));

        let config = serde_json::json!({"Client": {"HardwareAcceleration": "false"}});
        write_client_config(&path, &config).unwrap();
        assert_eq!(read_client_config(&path).unwrap(), config);
    }

    #[test]
    fn corrupt_document_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Battle.net.config");
        std::fs::write(&path, "{").unwrap();
        let err = read_client_config(&path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
