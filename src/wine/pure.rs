//! Pure wine helpers (no I/O)

pub mod registry;
pub mod winepath;

pub use registry::{RegValue, RegistryKey, WineRegistry, parse_registry, render_import};
pub use winepath::{command_program, to_unix_path};
