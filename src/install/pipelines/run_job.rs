//! Download, set up, install, finalize

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::install::operations::{Downloader, InstallGuard, InstallLocks};
use crate::install::types::{InstallCallback, InstallJob, InstallOutcome, InstallState, JobStatus};
use crate::process::{Heartbeat, HeartbeatExit, ManagedProcess, Supervisor, TimerHandle};

/// The runner-specific parts of an install.
pub trait InstallSteps: Send + Sync {
    /// Make sure every needed environment exists and write default documents.
    fn setup_environment(&self) -> Result<()>;

    /// Start the downloaded installer. Must not wait for it.
    fn spawn_installer(&self, artifact: &Path) -> Result<ManagedProcess>;

    /// Post-install hooks and a clean shutdown of the environment.
    fn finalize(&self) -> Result<()>;
}

/// A started job.
pub struct InstallHandle {
    pub status: JobStatus,
    pub timer: Option<TimerHandle>,
}

impl InstallHandle {
    pub fn state(&self) -> InstallState {
        self.status.state()
    }
}

/// Runs install jobs, at most one per runner.
#[derive(Clone)]
pub struct InstallPipeline {
    supervisor: Supervisor,
    heartbeat: Heartbeat,
    downloader: Arc<dyn Downloader>,
    locks: InstallLocks,
}

struct Completion {
    runner: String,
    status: JobStatus,
    callback: Option<InstallCallback>,
    _guard: InstallGuard,
}

impl Completion {
    fn fail(self, error: Error) {
        tracing::error!(runner = %self.runner, state = %self.status.state(), "Install failed: {error}");
        self.status.advance(&self.runner, InstallState::Failed);
        self.finish(InstallOutcome::failed(&error));
    }

    fn finish(mut self, outcome: InstallOutcome) {
        if let Some(callback) = self.callback.take() {
            callback(outcome);
        }
        // Guard drops here, releasing the runner.
    }
}

impl InstallPipeline {
    pub fn new(
        supervisor: Supervisor,
        heartbeat: Heartbeat,
        downloader: Arc<dyn Downloader>,
        locks: InstallLocks,
    ) -> Self {
        Self {
            supervisor,
            heartbeat,
            downloader,
            locks,
        }
    }

    pub fn locks(&self) -> &InstallLocks {
        &self.locks
    }

    /// Start `job`. Only a conflicting job for the same runner is an error
    /// here; every later failure ends the job in `Failed` and reaches
    /// `on_complete`.
    pub fn run(
        &self,
        job: InstallJob,
        steps: Arc<dyn InstallSteps>,
        downloader: Option<Arc<dyn Downloader>>,
        on_complete: Option<InstallCallback>,
    ) -> Result<InstallHandle> {
        let guard = self.locks.acquire(&job.runner)?;
        let status = JobStatus::new();
        let runner = job.runner.clone();
        let done = Completion {
            runner: runner.clone(),
            status: status.clone(),
            callback: on_complete,
            _guard: guard,
        };
        let stopped = |status: JobStatus| InstallHandle { status, timer: None };

        status.advance(&runner, InstallState::Downloading);
        let Some(url) = job.artifact.resolve(job.arch.as_deref()) else {
            done.fail(Error::UnsupportedPlatform(runner.clone()));
            return Ok(stopped(status));
        };
        let downloader = downloader.unwrap_or_else(|| self.downloader.clone());
        if let Err(e) = downloader.fetch(url, &job.dest) {
            done.fail(e);
            return Ok(stopped(status));
        }
        if !job.dest.exists() {
            done.fail(Error::Download {
                url: url.to_string(),
                reason: format!("{} missing after download", job.dest.display()),
            });
            return Ok(stopped(status));
        }

        status.advance(&runner, InstallState::EnvironmentSetup);
        if let Err(e) = steps.setup_environment() {
            done.fail(e);
            return Ok(stopped(status));
        }

        status.advance(&runner, InstallState::Installing);
        let process = match steps.spawn_installer(&job.dest) {
            Ok(process) => process,
            Err(e) => {
                done.fail(e);
                return Ok(stopped(status));
            }
        };
        tracing::info!(runner = %runner, pid = process.pid, "Installer running");

        let timer = self.heartbeat.watch(
            self.supervisor.clone(),
            process,
            None,
            Box::new(move |exit| {
                done.status.advance(&done.runner, InstallState::Finalizing);
                if let HeartbeatExit::Failed { error, .. } = exit {
                    done.fail(error);
                    return;
                }
                if let Err(e) = steps.finalize() {
                    done.fail(e);
                    return;
                }
                done.status.advance(&done.runner, InstallState::Done);
                tracing::info!(runner = %done.runner, "Install complete");
                done.finish(InstallOutcome::Done);
            }),
        );

        Ok(InstallHandle {
            status,
            timer: Some(timer),
        })
    }
}
