//! Prefix creation

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::prefix::pure::resolve_path;
use crate::prefix::types::Arch;

/// External tool that turns an empty directory into a prefix.
pub trait PrefixTool {
    fn create(&self, path: &Path, arch: Arch) -> Result<()>;
}

/// Creates prefixes by running `wineboot --init` through the given wine binary.
pub struct WineBoot {
    pub wine: PathBuf,
}

impl WineBoot {
    pub fn new(wine: PathBuf) -> Self {
        Self { wine }
    }
}

impl PrefixTool for WineBoot {
    fn create(&self, path: &Path, arch: Arch) -> Result<()> {
        tracing::info!(prefix = %path.display(), %arch, "Creating wine prefix");

        let status = Command::new(&self.wine)
            .arg("wineboot")
            .arg("--init")
            .env("WINEPREFIX", path)
            .env("WINEARCH", arch.as_str())
            // Skip the Mono/Gecko install prompts
            .env("WINEDLLOVERRIDES", "mscoree,mshtml=")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| Error::EnvironmentCreationFailed {
                path: path.to_path_buf(),
                reason: format!("could not run {}: {}", self.wine.display(), e),
            })?;

        if !status.success() {
            return Err(Error::EnvironmentCreationFailed {
                path: path.to_path_buf(),
                reason: format!("wineboot exited with {}", status),
            });
        }
        Ok(())
    }
}

/// A directory counts as a prefix once it has a `drive_c`.
pub fn is_prefix(path: &Path) -> bool {
    path.join("drive_c").is_dir()
}

/// Locates and lazily creates the default prefixes below a runner directory.
pub struct Provisioner {
    root: PathBuf,
    tool: Box<dyn PrefixTool + Send + Sync>,
}

impl Provisioner {
    pub fn new(root: PathBuf, tool: Box<dyn PrefixTool + Send + Sync>) -> Self {
        Self { root, tool }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve_path(&self, kind: &str, arch: Arch) -> PathBuf {
        resolve_path(&self.root, kind, arch)
    }

    /// Return the prefix for `(kind, arch)`, creating it if it does not exist yet.
    /// A leftover directory from an earlier failed creation is replaced.
    pub fn ensure(&self, kind: &str, arch: Arch) -> Result<PathBuf> {
        let path = self.resolve_path(kind, arch);
        if is_prefix(&path) {
            return Ok(path);
        }
        if path.exists() {
            tracing::warn!(prefix = %path.display(), "Replacing incomplete prefix");
            discard(&path)?;
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let created = self.tool.create(&path, arch).and_then(|()| {
            if is_prefix(&path) {
                Ok(())
            } else {
                Err(Error::EnvironmentCreationFailed {
                    path: path.clone(),
                    reason: "drive_c missing after creation".to_string(),
                })
            }
        });
        if let Err(e) = created {
            if let Err(cleanup) = discard(&path) {
                tracing::error!(prefix = %path.display(), "Could not remove incomplete prefix: {cleanup}");
            }
            return Err(e);
        }

        tracing::info!(prefix = %path.display(), %arch, kind, "Prefix ready");
        Ok(path)
    }
}

fn discard(path: &Path) -> Result<()> {
    if path.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Creates the bare prefix layout and counts invocations.
    #[derive(Clone, Default)]
    pub struct FakeTool {
        pub calls: Arc<AtomicUsize>,
        pub broken: bool,
    }

    impl FakeTool {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PrefixTool for FakeTool {
        fn create(&self, path: &Path, _arch: Arch) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::fs::create_dir_all(path)?;
            if !self.broken {
                std::fs::create_dir_all(path.join("drive_c/users"))?;
                std::fs::write(path.join("user.reg"), "WINE REGISTRY Version 2\n")?;
            }
            Ok(())
        }
    }
}
