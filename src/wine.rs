//! Wine environment adapter
//!
//! Everything a wine-based runner needs around its prefixes: the environment
//! variables, running programs and helper tools, reading `.reg` hives and
//! translating Windows paths.
//!
//! ## Module Structure
//! - `types.rs`: WineEnv, ExecOptions, wine's own process names
//! - `pure/`: registry parsing, Windows path conversion
//! - `operations/`: wineexec, winetricks, regedit import, wineserver

mod operations;
mod pure;
mod types;

pub use operations::{
    fix_path_case, import_registry, shutdown_prefix, wineexec, wineserver_kill, winekill, winetricks,
};
pub use pure::{
    RegValue, RegistryKey, WineRegistry, command_program, parse_registry, render_import,
    to_unix_path,
};
pub use types::{ExecOptions, WINE_SYSTEM_PROCESSES, WineEnv};

/// Read and parse a hive file such as `<prefix>/user.reg`.
pub fn read_registry(path: &std::path::Path) -> crate::Result<WineRegistry> {
    let bytes = std::fs::read(path)?;
    Ok(parse_registry(&String::from_utf8_lossy(&bytes)))
}
