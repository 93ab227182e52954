//! Pipelines module (orchestration)

pub mod run_job;

pub use run_job::{InstallHandle, InstallPipeline, InstallSteps};
