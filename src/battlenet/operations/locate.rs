//! Finding the client and its product database in a prefix

use std::path::{Path, PathBuf};

use crate::wine::{command_program, fix_path_case, read_registry, to_unix_path};

const LAUNCHER_CANDIDATES: &[&str] = &[
    "drive_c/Program Files/Battle.net/Battle.net Launcher.exe",
    "drive_c/Program Files (x86)/Battle.net/Battle.net Launcher.exe",
];

/// URL handler registered by the client installer; its `Open` command
/// points at the launcher even before the client first ran.
const OPEN_COMMAND_KEY: &str = "Software/Classes/blizzard/Shell/Open/Command";

pub fn product_db_path(prefix: &Path) -> PathBuf {
    prefix.join("drive_c/ProgramData/Battle.net/Agent/product.db")
}

pub fn uninstaller_path(prefix: &Path) -> PathBuf {
    prefix.join("drive_c/ProgramData/Battle.net/Agent/Blizzard Uninstaller.exe")
}

/// Launcher executable in `prefix`: the default install folders first, then
/// the registered URL handler.
pub fn find_launcher(prefix: &Path) -> Option<PathBuf> {
    if let Some(path) = LAUNCHER_CANDIDATES
        .iter()
        .map(|candidate| prefix.join(candidate))
        .find(|path| path.exists())
    {
        return Some(path);
    }

    let user_reg = prefix.join("user.reg");
    if !user_reg.exists() {
        return None;
    }
    let registry = match read_registry(&user_reg) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::warn!(path = %user_reg.display(), "Could not read registry: {e}");
            return None;
        }
    };
    let command = registry.query(OPEN_COMMAND_KEY, "default")?;
    let program = command_program(command)?;
    let path = fix_path_case(&to_unix_path(prefix, program));
    tracing::debug!(path = %path.display(), "Battle.net located through the registry");
    Some(path)
}
