//! Blocking wine helper tools

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::paths::wine_sibling;
use crate::prefix::Arch;
use crate::wine::operations::exec::run_blocking;
use crate::wine::pure::{RegistryKey, render_import};
use crate::wine::types::WineEnv;

/// Run winetricks `verbs` (space separated, e.g. `eufonts fontsmooth=rgb`)
/// in `prefix` and wait for it.
pub fn winetricks(env: &WineEnv, prefix: &Path, arch: Arch, verbs: &str) -> Result<()> {
    tracing::info!(prefix = %prefix.display(), verbs, "Running winetricks, this takes a while");
    let mut args = vec!["--unattended"];
    args.extend(verbs.split_whitespace());
    run_blocking(env, prefix, arch, env.winetricks(), &args)
}

/// Import `keys` into `prefix` through `regedit /S`.
pub fn import_registry(env: &WineEnv, prefix: &Path, arch: Arch, keys: &[RegistryKey]) -> Result<()> {
    if keys.is_empty() {
        return Ok(());
    }

    let reg_path = prefix.join("winerunner-import.reg");
    std::fs::write(&reg_path, render_import(keys))?;

    let regedit = wine_sibling(env.executable(), "regedit");
    let program = if regedit.exists() {
        regedit
    } else {
        env.executable().to_path_buf()
    };
    let reg_arg = reg_path.display().to_string();
    let result = if program == env.executable() {
        run_blocking(env, prefix, arch, &program, &["regedit", "/S", &reg_arg])
    } else {
        run_blocking(env, prefix, arch, &program, &["/S", &reg_arg])
    };

    if let Err(e) = std::fs::remove_file(&reg_path) {
        tracing::debug!(path = %reg_path.display(), "Could not remove registry import file: {e}");
    }
    result
}

/// Resolve `path` component by component, matching names case-insensitively
/// where the exact name does not exist.
///
/// Components that match nothing are kept as written.
pub fn fix_path_case(path: &Path) -> PathBuf {
    let mut fixed = PathBuf::new();
    let mut unresolved = false;

    for component in path.components() {
        let part = component.as_os_str();
        let candidate = fixed.join(part);
        if unresolved || candidate.exists() {
            fixed = candidate;
            continue;
        }

        let wanted = part.to_string_lossy().to_lowercase();
        let found = std::fs::read_dir(&fixed).ok().and_then(|entries| {
            entries
                .flatten()
                .map(|entry| entry.file_name())
                .find(|name| name.to_string_lossy().to_lowercase() == wanted)
        });
        match found {
            Some(name) => fixed.push(name),
            None => {
                unresolved = true;
                fixed = candidate;
            }
        }
    }
    fixed
}
