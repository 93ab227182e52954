//! Process handles shared between a heartbeat and whoever may stop it

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use crate::error::{Error, Result};
use crate::process::operations::Supervisor;
use crate::process::pipelines::{Clock, ShutdownOutcome};
use crate::process::types::{ManagedProcess, ShutdownPolicy};

/// One managed process behind a lock. The heartbeat empties the slot once
/// the process has finished.
#[derive(Debug, Clone, Default)]
pub struct ProcessSlot {
    inner: Arc<Mutex<Option<ManagedProcess>>>,
}

impl ProcessSlot {
    pub fn holding(process: ManagedProcess) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(process))),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Option<ManagedProcess>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `None` while someone else holds the slot.
    pub(crate) fn try_lock(&self) -> Option<MutexGuard<'_, Option<ManagedProcess>>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.lock().as_ref().map(|p| p.pid)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    /// Stop the held process with the escalation policy. The handle stays in
    /// the slot so its heartbeat reports the exit.
    pub fn stop(
        &self,
        supervisor: &Supervisor,
        policy: &ShutdownPolicy,
        clock: &dyn Clock,
    ) -> Result<ShutdownOutcome> {
        let mut guard = self.lock();
        match guard.as_mut() {
            Some(process) => supervisor.stop(process, policy, clock),
            None => Ok(ShutdownOutcome::NotRunning),
        }
    }
}

/// The single primary process a runner owns.
#[derive(Debug, Default)]
pub struct Primary {
    current: Mutex<Option<ProcessSlot>>,
}

impl Primary {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Option<ProcessSlot> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fails while the previous primary process is still running.
    pub fn check_idle(&self, supervisor: &Supervisor, runner: &str) -> Result<()> {
        let Some(slot) = self.current() else {
            return Ok(());
        };
        let mut guard = slot.lock();
        let Some(process) = guard.as_mut() else {
            return Ok(());
        };
        if supervisor.is_running(process).unwrap_or(false) {
            return Err(Error::AlreadyRunning {
                runner: runner.to_string(),
                pid: process.pid,
            });
        }
        Ok(())
    }

    /// Make `process` the primary one. The returned slot is shared with it.
    pub fn adopt(&self, process: ManagedProcess) -> ProcessSlot {
        let slot = ProcessSlot::holding(process);
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(slot.clone());
        slot
    }

    pub fn pid(&self) -> Option<u32> {
        self.current().and_then(|slot| slot.pid())
    }

    pub fn stop(
        &self,
        supervisor: &Supervisor,
        policy: &ShutdownPolicy,
        clock: &dyn Clock,
    ) -> Result<ShutdownOutcome> {
        match self.current() {
            Some(slot) => slot.stop(supervisor, policy, clock),
            None => Ok(ShutdownOutcome::NotRunning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::operations::procfs::fakes::FakeTable;
    use crate::process::pipelines::shutdown::fakes::FakeClock;
    use crate::process::types::{ProcessState, Signal, SpawnOptions};

    fn attached(pid: u32) -> ManagedProcess {
        ManagedProcess::attach(
            pid,
            pid,
            SpawnOptions {
                watch: true,
                ..Default::default()
            },
        )
    }

    #[test]
    fn empty_primary_is_idle_and_stops_nothing() {
        let table = Arc::new(FakeTable::default());
        let supervisor = Supervisor::new(table.clone());
        let primary = Primary::new();

        assert!(primary.check_idle(&supervisor, "test").is_ok());
        let outcome = primary
            .stop(&supervisor, &ShutdownPolicy::default(), &FakeClock::default())
            .unwrap();
        assert_eq!(outcome, ShutdownOutcome::NotRunning);
        assert!(table.signals().is_empty());
    }

    #[test]
    fn running_primary_refuses_a_second_one() {
        let table = Arc::new(FakeTable::default());
        table.add(300, 1, 300, "game.exe", ProcessState::Running);
        let supervisor = Supervisor::new(table.clone());
        let primary = Primary::new();
        primary.adopt(attached(300));

        let err = primary.check_idle(&supervisor, "test").unwrap_err();
        assert!(matches!(err, Error::AlreadyRunning { pid: 300, .. }));

        table.set_state(300, ProcessState::Zombie);
        assert!(primary.check_idle(&supervisor, "test").is_ok());
    }

    #[test]
    fn stop_reaches_the_adopted_process() {
        let table = Arc::new(FakeTable::default());
        table.add(300, 1, 300, "game.exe", ProcessState::Running);
        let supervisor = Supervisor::new(table.clone());
        let primary = Primary::new();
        let slot = primary.adopt(attached(300));

        let outcome = primary
            .stop(&supervisor, &ShutdownPolicy::default(), &FakeClock::default())
            .unwrap();

        assert_eq!(outcome, ShutdownOutcome::Killed { checks: 1 });
        assert!(table.signals().contains(&(300, Signal::Kill)));
        // Left for the heartbeat to report
        assert_eq!(slot.pid(), Some(300));
    }

    #[test]
    fn try_lock_skips_while_held() {
        let slot = ProcessSlot::holding(attached(5));
        let guard = slot.lock();
        assert!(slot.try_lock().is_none());
        drop(guard);
        assert!(slot.try_lock().is_some());
    }
}
