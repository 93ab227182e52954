//! Pipelines module (orchestration)

pub mod launch;

pub use launch::{Session, launch};
