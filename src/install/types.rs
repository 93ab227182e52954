use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::{Error, ErrorKind};

/// Stages of an install job, in the only order they may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Idle,
    Downloading,
    EnvironmentSetup,
    Installing,
    Finalizing,
    Done,
    Failed,
}

impl InstallState {
    fn rank(&self) -> Option<u8> {
        match self {
            InstallState::Idle => Some(0),
            InstallState::Downloading => Some(1),
            InstallState::EnvironmentSetup => Some(2),
            InstallState::Installing => Some(3),
            InstallState::Finalizing => Some(4),
            InstallState::Done => Some(5),
            InstallState::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InstallState::Done | InstallState::Failed)
    }

    /// Whether a job in this state may move to `next`.
    pub fn can_advance_to(&self, next: InstallState) -> bool {
        match (self.rank(), next.rank()) {
            (Some(0) | Some(5) | None, None) => false,
            (Some(_), None) => true,
            (Some(cur), Some(nxt)) => nxt == cur + 1,
            (None, Some(_)) => false,
        }
    }
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstallState::Idle => "idle",
            InstallState::Downloading => "downloading",
            InstallState::EnvironmentSetup => "environment setup",
            InstallState::Installing => "installing",
            InstallState::Finalizing => "finalizing",
            InstallState::Done => "done",
            InstallState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Where the installer artifact comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Url(String),
    /// Download URL per host architecture key.
    PerArch(BTreeMap<String, String>),
}

impl Artifact {
    /// URL to download on a host with architecture `arch`, if there is one.
    pub fn resolve(&self, arch: Option<&str>) -> Option<&str> {
        match self {
            Artifact::Url(url) => Some(url),
            Artifact::PerArch(map) => map.get(arch?).map(String::as_str),
        }
    }
}

/// Final result reported to the completion callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Done,
    Failed { kind: ErrorKind, message: String },
}

impl InstallOutcome {
    pub fn failed(error: &Error) -> Self {
        InstallOutcome::Failed {
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, InstallOutcome::Done)
    }
}

pub type InstallCallback = Box<dyn FnOnce(InstallOutcome) + Send>;

/// One install for one runner.
#[derive(Debug, Clone)]
pub struct InstallJob {
    /// Runner identifier; at most one job per identifier runs at a time.
    pub runner: String,
    pub artifact: Artifact,
    /// Where the downloaded artifact is stored.
    pub dest: PathBuf,
    /// Host architecture key used to pick from [`Artifact::PerArch`].
    pub arch: Option<String>,
}

/// Stage tracking shared between the caller and the heartbeat.
#[derive(Debug, Clone)]
pub struct JobStatus {
    inner: Arc<Mutex<Vec<InstallState>>>,
}

impl JobStatus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(vec![InstallState::Idle])),
        }
    }

    pub fn state(&self) -> InstallState {
        self.inner
            .lock()
            .ok()
            .and_then(|h| h.last().copied())
            .unwrap_or(InstallState::Failed)
    }

    /// Every state the job went through, oldest first.
    pub fn history(&self) -> Vec<InstallState> {
        self.inner.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Move to `next`. Out-of-order transitions are refused.
    pub fn advance(&self, runner: &str, next: InstallState) -> bool {
        let Ok(mut history) = self.inner.lock() else {
            return false;
        };
        let current = history.last().copied().unwrap_or(InstallState::Idle);
        if !current.can_advance_to(next) {
            tracing::error!(runner, from = %current, to = %next, "Refusing install state transition");
            return false;
        }
        tracing::debug!(runner, state = %next, "Install state");
        history.push(next);
        true
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::new()
    }
}
