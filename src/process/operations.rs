//! Operations module (atomic side effects)

pub mod procfs;
pub mod supervisor;

pub use procfs::{ProcFs, ProcessTable, find_by_name};
pub use supervisor::Supervisor;
