//! Installing runners and vendor clients
//!
//! An install job walks `Idle → Downloading → EnvironmentSetup → Installing
//! → Finalizing → Done`, or ends in `Failed` from any active stage. The
//! installer runs as a supervised process polled by a heartbeat; the job
//! finishes when the heartbeat sees it gone.
//!
//! ## Module Structure
//! - `types.rs`: states, jobs, outcomes
//! - `operations/`: download, archive extraction, per-runner locks
//! - `pipelines/`: the job pipeline

mod operations;
mod pipelines;
mod types;

pub use operations::{
    Downloader, Extractor, HttpDownloader, InstallGuard, InstallLocks, ZipExtractor,
};
pub use pipelines::{InstallHandle, InstallPipeline, InstallSteps};
pub use types::{Artifact, InstallCallback, InstallJob, InstallOutcome, InstallState, JobStatus};

#[cfg(test)]
pub(crate) use operations::download::fakes::FakeDownloader;
#[cfg(test)]
pub(crate) use operations::extract::fixtures::write_zip;
