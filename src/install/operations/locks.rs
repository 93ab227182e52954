//! One install per runner at a time

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct InstallLocks {
    held: Arc<Mutex<HashSet<String>>>,
}

/// Held for the lifetime of one install job. Dropping it releases the runner.
#[derive(Debug)]
pub struct InstallGuard {
    runner: String,
    held: Arc<Mutex<HashSet<String>>>,
}

impl InstallLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, runner: &str) -> Result<InstallGuard> {
        let mut held = self
            .held
            .lock()
            .map_err(|_| Error::InstallInProgress(runner.to_string()))?;
        if !held.insert(runner.to_string()) {
            return Err(Error::InstallInProgress(runner.to_string()));
        }
        Ok(InstallGuard {
            runner: runner.to_string(),
            held: self.held.clone(),
        })
    }

    pub fn is_locked(&self, runner: &str) -> bool {
        self.held.lock().map(|h| h.contains(runner)).unwrap_or(false)
    }
}

impl Drop for InstallGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.held.lock() {
            held.remove(&self.runner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_job_for_same_runner_is_rejected() {
        let locks = InstallLocks::new();
        let guard = locks.acquire("winebattlenet").unwrap();

        let err = locks.acquire("winebattlenet").unwrap_err();
        assert!(matches!(err, Error::InstallInProgress(ref r) if r == "winebattlenet"));
        // Other runners are independent
        assert!(locks.acquire("wine").is_ok());

        drop(guard);
        assert!(!locks.is_locked("winebattlenet"));
        assert!(locks.acquire("winebattlenet").is_ok());
    }
}
