//! Process table access through /proc

use std::path::PathBuf;

use regex::Regex;

use crate::error::{Error, Result};
use crate::process::pure::{parse_stat, process_name};
use crate::process::types::{ProcessInfo, Signal};

/// Read and signal the processes of the machine.
pub trait ProcessTable: Send + Sync {
    /// Every process currently visible.
    fn snapshot(&self) -> Vec<ProcessInfo>;

    /// Like [`ProcessTable::snapshot`], reporting a table that could not be read.
    fn try_snapshot(&self) -> Result<Vec<ProcessInfo>> {
        Ok(self.snapshot())
    }

    fn info(&self, pid: u32) -> Option<ProcessInfo>;

    /// Deliver `signal` to `pid`. A pid that no longer exists is not an error.
    fn signal(&self, pid: u32, signal: Signal) -> Result<()>;

    /// Deliver `signal` to every member of a process group.
    fn signal_group(&self, pgid: u32, signal: Signal) -> Result<()>;
}

/// The real process table.
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/proc"),
        }
    }

    fn read(&self, pid: u32) -> Option<ProcessInfo> {
        let dir = self.root.join(pid.to_string());
        let stat = std::fs::read_to_string(dir.join("stat")).ok()?;
        let line = parse_stat(&stat)?;
        let cmdline = std::fs::read(dir.join("cmdline")).unwrap_or_default();

        Some(ProcessInfo {
            pid,
            ppid: line.ppid,
            pgid: line.pgrp,
            name: process_name(&cmdline, &line.comm),
            state: line.state,
        })
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver(target: libc::pid_t, signal: Signal) -> Result<()> {
    // pid 0 and -1 address whole sessions, never what we mean.
    if target == 0 || target == -1 {
        return Ok(());
    }
    let rc = unsafe { libc::kill(target, signal.as_raw()) };
    if rc == 0 {
        return Ok(());
    }
    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::ESRCH) => Ok(()),
        _ => Err(Error::Io(err)),
    }
}

impl ProcessTable for ProcFs {
    fn snapshot(&self) -> Vec<ProcessInfo> {
        self.try_snapshot().unwrap_or_else(|e| {
            tracing::warn!(root = %self.root.display(), "Could not read process table: {e}");
            Vec::new()
        })
    }

    fn try_snapshot(&self) -> Result<Vec<ProcessInfo>> {
        let mut out: Vec<ProcessInfo> = std::fs::read_dir(&self.root)?
            .flatten()
            .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
            .filter_map(|pid| self.read(pid))
            .collect();
        out.sort_by_key(|p| p.pid);
        Ok(out)
    }

    fn info(&self, pid: u32) -> Option<ProcessInfo> {
        self.read(pid)
    }

    fn signal(&self, pid: u32, signal: Signal) -> Result<()> {
        deliver(pid as libc::pid_t, signal)
    }

    fn signal_group(&self, pgid: u32, signal: Signal) -> Result<()> {
        if pgid <= 1 {
            return Ok(());
        }
        deliver(-(pgid as libc::pid_t), signal)
    }
}

/// First live process whose name matches `pattern`.
pub fn find_by_name(table: &dyn ProcessTable, pattern: &Regex) -> Option<ProcessInfo> {
    table
        .snapshot()
        .into_iter()
        .find(|p| p.state.is_alive() && pattern.is_match(&p.name))
}
