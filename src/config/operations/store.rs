//! Small key/value store for per-runner preferences

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Key/value settings grouped by scope (usually a runner identifier).
pub trait SettingsStore: Send + Sync {
    fn read(&self, key: &str, scope: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str, scope: &str) -> Result<()>;
}

type Scopes = BTreeMap<String, BTreeMap<String, String>>;

/// Settings kept in a JSON file, rewritten wholesale on every write.
pub struct JsonSettingsStore {
    path: PathBuf,
    data: Mutex<Scopes>,
}

impl JsonSettingsStore {
    pub fn open(path: PathBuf) -> Self {
        let data = std::fs::read(&path)
            .ok()
            .and_then(|bytes| match serde_json::from_slice::<Scopes>(&bytes) {
                Ok(data) => Some(data),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Ignoring unreadable preferences: {e}");
                    None
                }
            })
            .unwrap_or_default();
        Self {
            path,
            data: Mutex::new(data),
        }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn read(&self, key: &str, scope: &str) -> Option<String> {
        self.data.lock().ok()?.get(scope)?.get(key).cloned()
    }

    fn write(&self, key: &str, value: &str, scope: &str) -> Result<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| Error::Config("preferences lock poisoned".to_string()))?;
        data.entry(scope.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&*data)?)?;
        Ok(())
    }
}
