//! Graceful-then-forced shutdown

use std::time::Duration;

use crate::error::{Error, Result};
use crate::process::types::ShutdownPolicy;

/// Source of waiting between liveness checks.
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Nothing was running to begin with.
    NotRunning,
    /// Exited after the stop request, on the given check.
    Graceful { checks: u32 },
    /// Exited after the force kill, on the given check.
    Killed { checks: u32 },
}

fn wait_until_stopped(
    attempts: u32,
    interval: Duration,
    clock: &dyn Clock,
    is_running: &mut dyn FnMut() -> bool,
) -> Option<u32> {
    (1..=attempts).find(|_| {
        clock.sleep(interval);
        !is_running()
    })
}

/// Ask a process to stop, then force it, checking liveness once per interval.
///
/// Gives up with [`Error::ShutdownTimeout`] once both tiers are exhausted.
pub fn escalate(
    policy: &ShutdownPolicy,
    clock: &dyn Clock,
    pid: u32,
    mut is_running: impl FnMut() -> bool,
    request_stop: impl FnOnce(),
    force_kill: impl FnOnce(),
) -> Result<ShutdownOutcome> {
    if !is_running() {
        return Ok(ShutdownOutcome::NotRunning);
    }

    tracing::info!(pid, "Waiting for process to shut down");
    request_stop();
    if let Some(checks) =
        wait_until_stopped(policy.graceful_attempts, policy.poll_interval(), clock, &mut is_running)
    {
        tracing::debug!(pid, checks, "Process stopped gracefully");
        return Ok(ShutdownOutcome::Graceful { checks });
    }

    tracing::warn!(pid, "Process does not shut down, killing it");
    force_kill();
    if let Some(checks) =
        wait_until_stopped(policy.kill_attempts, policy.poll_interval(), clock, &mut is_running)
    {
        return Ok(ShutdownOutcome::Killed { checks });
    }

    tracing::error!(pid, "Process refuses to die");
    Err(Error::ShutdownTimeout {
        pid,
        attempts: policy.graceful_attempts + policy.kill_attempts,
    })
}


#[cfg(test)]
mod tests {
    use super::fakes::FakeClock;
    use super::*;
    use std::cell::Cell;

    #[test]
    fn never_dies_times_out_after_full_budget() {
        let policy = ShutdownPolicy::default();
        let clock = FakeClock::default();
        let killed = Cell::new(false);

        let err = escalate(&policy, &clock, 42, || true, || {}, || killed.set(true)).unwrap_err();

        assert!(matches!(err, Error::ShutdownTimeout { pid: 42, attempts: 15 }));
        assert!(killed.get());
        assert_eq!(clock.sleeps(), 15);
        assert_eq!(clock.total(), policy.budget());
    }

    #[test]
    fn dies_in_kill_tier() {
        let policy = ShutdownPolicy::default();
        let clock = FakeClock::default();
        let killed = Cell::new(false);
        let checks = Cell::new(0);

        let outcome = escalate(
            &policy,
            &clock,
            7,
            || {
                checks.set(checks.get() + 1);
                // Two checks after the kill before it is gone
                !(killed.get() && checks.get() >= 13)
            },
            || {},
            || killed.set(true),
        )
        .unwrap();

        assert_eq!(outcome, ShutdownOutcome::Killed { checks: 2 });
        assert!(clock.total() < policy.budget());
    }

    #[test]
    fn graceful_stop_skips_kill() {
        let clock = FakeClock::default();
        let stopped = Cell::new(false);
        let killed = Cell::new(false);

        let outcome = escalate(
            &ShutdownPolicy::default(),
            &clock,
            7,
            || !stopped.get(),
            || stopped.set(true),
            || killed.set(true),
        )
        .unwrap();

        assert_eq!(outcome, ShutdownOutcome::Graceful { checks: 1 });
        assert!(!killed.get());
        assert_eq!(clock.sleeps(), 1);
    }

    #[test]
    fn not_running_does_nothing() {
        let clock = FakeClock::default();
        let outcome =
            escalate(&ShutdownPolicy::default(), &clock, 7, || false, || panic!(), || panic!())
                .unwrap();
        assert_eq!(outcome, ShutdownOutcome::NotRunning);
        assert_eq!(clock.sleeps(), 0);
    }
}
