//! Pipelines module (orchestration)

pub mod install;

pub use install::ClientInstall;
