//! Wine prefix provisioning
//!
//! A prefix is the directory tree a Windows program sees as its machine.
//! Each (runner, architecture) pair owns exactly one default prefix whose
//! location is derived from the runner directory, never stored.
//!
//! ## Module Structure
//! - `types.rs`: Arch, Prefix
//! - `pure.rs`: Path resolution (no I/O)
//! - `operations/`: Prefix creation, shared directory linking

mod operations;
mod pure;
mod types;

pub use operations::{LinkOutcome, PrefixTool, Provisioner, WineBoot, is_prefix, link_shared_dir};
pub use pure::resolve_path;
pub use types::{Arch, Prefix};

#[cfg(test)]
pub(crate) use operations::create::fakes::FakeTool;
