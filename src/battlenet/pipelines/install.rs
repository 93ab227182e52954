//! Installing the Battle.net client into its prefixes

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::battlenet::operations::{client_config_path, write_client_config};
use crate::battlenet::pure::{client_registry_keys, default_client_config};
use crate::battlenet::types::INSTALLER_EXCLUDE;
use crate::error::Result;
use crate::install::InstallSteps;
use crate::prefix::{Arch, link_shared_dir};
use crate::process::{ManagedProcess, Supervisor};
use crate::wine::{ExecOptions, WineEnv, import_registry, shutdown_prefix, wineexec, winetricks};

const FONT_VERBS: &str = "eufonts fontsmooth=rgb";

/// Directories the 64-bit prefix shares with the 32-bit one, so both see the
/// same login and the same installed products.
const SHARED_DIRS: &[&str] = &["drive_c/users", "drive_c/ProgramData"];

pub struct ClientInstall {
    pub env: Arc<WineEnv>,
    pub supervisor: Supervisor,
    pub user: String,
}

impl ClientInstall {
    fn prefix(&self) -> PathBuf {
        self.env.default_prefix(Some(Arch::Win32))
    }
}

impl InstallSteps for ClientInstall {
    fn setup_environment(&self) -> Result<()> {
        let prefix = self.env.ensure_prefix(Some(Arch::Win32))?;
        let prefix64 = self.env.ensure_prefix(Some(Arch::Win64))?;

        winetricks(&self.env, &prefix, Arch::Win32, FONT_VERBS)?;
        if prefix != prefix64 {
            for subdir in SHARED_DIRS {
                let outcome = link_shared_dir(&prefix, &prefix64, subdir)?;
                tracing::debug!(subdir, ?outcome, "Shared prefix directory");
            }
            winetricks(&self.env, &prefix64, Arch::Win64, FONT_VERBS)?;
        }

        import_registry(&self.env, &prefix, Arch::Win32, &client_registry_keys())?;
        write_client_config(&client_config_path(&prefix, &self.user), &default_client_config())
    }

    fn spawn_installer(&self, artifact: &Path) -> Result<ManagedProcess> {
        wineexec(
            &self.env,
            &self.supervisor,
            &self.prefix(),
            Arch::Win32,
            artifact,
            ExecOptions {
                working_dir: Some(PathBuf::from("/tmp")),
                exclude: INSTALLER_EXCLUDE.iter().map(|s| s.to_string()).collect(),
                watch: true,
                ..Default::default()
            },
        )
    }

    fn finalize(&self) -> Result<()> {
        // The client starts itself after installing; leave nothing behind.
        if let Err(e) = shutdown_prefix(&self.env, &self.prefix(), Arch::Win32) {
            tracing::warn!(prefix = %self.prefix().display(), "Could not shut down prefix: {e}");
        }
        Ok(())
    }
}
