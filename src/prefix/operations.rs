//! Operations module (atomic side effects)

pub mod create;
pub mod link;

pub use create::{PrefixTool, Provisioner, WineBoot, is_prefix};
pub use link::{LinkOutcome, link_shared_dir};
