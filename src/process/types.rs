use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Child;
use std::time::Duration;

/// Scheduler state of a process, from the third field of `/proc/<pid>/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Sleeping,
    DiskSleep,
    Zombie,
    Stopped,
    TracingStop,
    Dead,
    Idle,
    Other(char),
}

impl ProcessState {
    pub fn from_char(c: char) -> Self {
        match c {
            'R' => ProcessState::Running,
            'S' => ProcessState::Sleeping,
            'D' => ProcessState::DiskSleep,
            'Z' => ProcessState::Zombie,
            'T' => ProcessState::Stopped,
            't' => ProcessState::TracingStop,
            'X' | 'x' => ProcessState::Dead,
            'I' => ProcessState::Idle,
            other => ProcessState::Other(other),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            ProcessState::Running => 'R',
            ProcessState::Sleeping => 'S',
            ProcessState::DiskSleep => 'D',
            ProcessState::Zombie => 'Z',
            ProcessState::Stopped => 'T',
            ProcessState::TracingStop => 't',
            ProcessState::Dead => 'X',
            ProcessState::Idle => 'I',
            ProcessState::Other(c) => *c,
        }
    }

    /// Zombies and dead entries still show up in `/proc` but will never do work again.
    pub fn is_alive(&self) -> bool {
        !matches!(self, ProcessState::Zombie | ProcessState::Dead)
    }
}

/// One entry of a process snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub ppid: u32,
    pub pgid: u32,
    pub name: String,
    pub state: ProcessState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Term,
    Kill,
}

impl Signal {
    pub fn as_raw(&self) -> libc::c_int {
        match self {
            Signal::Term => libc::SIGTERM,
            Signal::Kill => libc::SIGKILL,
        }
    }
}

/// A command line plus the environment it runs with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub command: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            ..Default::default()
        }
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or("")
    }
}

/// Options that only matter once the process is running.
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    /// Owning runner, for logging.
    pub runner: String,
    /// Count descendants when deciding liveness.
    pub watch: bool,
    /// Process names never counted as "the program" when checking liveness.
    pub exclude: Vec<String>,
    /// Command that asks the process tree to exit cleanly.
    pub stop_command: Option<CommandSpec>,
    /// Replace the inherited environment instead of overlaying it.
    pub clear_env: bool,
}

/// A process started by the supervisor.
#[derive(Debug)]
pub struct ManagedProcess {
    pub pid: u32,
    /// Process group the command was placed in. Equal to `pid` for spawned commands.
    pub pgid: u32,
    pub spec: CommandSpec,
    pub options: SpawnOptions,
    pub(crate) child: Option<Child>,
    pub(crate) exit_code: Option<i32>,
    pub(crate) root_exited: bool,
}

impl ManagedProcess {
    /// Track a process that was started elsewhere.
    pub fn attach(pid: u32, pgid: u32, options: SpawnOptions) -> Self {
        Self {
            pid,
            pgid,
            spec: CommandSpec::default(),
            options,
            child: None,
            exit_code: None,
            root_exited: false,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }
}

/// Bounded graceful-then-forced shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownPolicy {
    /// Liveness checks after the graceful stop request.
    pub graceful_attempts: u32,
    /// Liveness checks after the force kill.
    pub kill_attempts: u32,
    pub poll_interval_ms: u64,
}

impl ShutdownPolicy {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Longest time a shutdown may take before it is reported as timed out.
    pub fn budget(&self) -> Duration {
        self.poll_interval() * (self.graceful_attempts + self.kill_attempts)
    }
}

impl Default for ShutdownPolicy {
    fn default() -> Self {
        Self {
            graceful_attempts: 10,
            kill_attempts: 5,
            poll_interval_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zombie_is_not_alive() {
        assert!(!ProcessState::from_char('Z').is_alive());
        assert!(ProcessState::from_char('S').is_alive());
        assert_eq!(ProcessState::from_char('q'), ProcessState::Other('q'));
    }

    #[test]
    fn default_budget_is_fifteen_seconds() {
        assert_eq!(ShutdownPolicy::default().budget(), Duration::from_secs(15));
    }
}
