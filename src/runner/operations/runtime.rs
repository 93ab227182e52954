//! Bundled runtime libraries

use std::collections::HashMap;
use std::path::Path;

/// Environment that puts the runtime's library folders below `root` in
/// front of the system ones. Empty when none are present.
pub fn runtime_env(root: &Path) -> HashMap<String, String> {
    let dirs: Vec<String> = ["lib32", "lib64"]
        .iter()
        .map(|lib| root.join(lib))
        .filter(|dir| dir.is_dir())
        .map(|dir| dir.display().to_string())
        .collect();
    if dirs.is_empty() {
        return HashMap::new();
    }

    let mut paths = dirs.join(":");
    if let Ok(existing) = std::env::var("LD_LIBRARY_PATH")
        && !existing.is_empty()
    {
        paths = format!("{}:{}", paths, existing);
    }
    HashMap::from([("LD_LIBRARY_PATH".to_string(), paths)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_existing_lib_dirs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(runtime_env(dir.path()).is_empty());

        std::fs::create_dir(dir.path().join("lib64")).unwrap();
        let env = runtime_env(dir.path());
        assert!(env["LD_LIBRARY_PATH"].starts_with(&dir.path().join("lib64").display().to_string()));
    }
}
