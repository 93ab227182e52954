//! Operations module (atomic side effects)

pub mod exec;
pub mod tools;

pub use exec::{shutdown_prefix, wineexec, wineserver_kill, winekill};
pub use tools::{fix_path_case, import_registry, winetricks};
