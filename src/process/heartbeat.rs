//! Fixed-interval liveness polling of a managed process

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::process::operations::Supervisor;
use crate::process::slot::ProcessSlot;
use crate::process::types::{ManagedProcess, ProcessInfo};

/// One tick of a repeating task. Returning `false` ends the task.
pub type Tick = Box<dyn FnMut() -> bool + Send>;

/// Called on every tick while the process runs, with its live children.
pub type BeatHook = Box<dyn FnMut(&[ProcessInfo]) -> Result<()> + Send>;

/// Called once when the process is gone or can no longer be tracked.
pub type Finalize = Box<dyn FnOnce(HeartbeatExit) + Send>;

/// Runs ticks at a fixed interval. Ticks of one task never overlap.
pub trait Scheduler: Send + Sync {
    fn every(&self, interval: Duration, tick: Tick) -> TimerHandle;
}

/// Cancels a repeating task. Clones share the same task.
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Runs each task on its own thread.
#[derive(Debug, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn every(&self, interval: Duration, mut tick: Tick) -> TimerHandle {
        let handle = TimerHandle::new();
        let timer = handle.clone();
        std::thread::spawn(move || {
            loop {
                std::thread::sleep(interval);
                if timer.is_cancelled() {
                    break;
                }
                if !tick() {
                    timer.cancel();
                    break;
                }
            }
        });
        handle
    }
}

/// Runs ticks only when told to.
#[derive(Default)]
pub struct ManualScheduler {
    tasks: Mutex<Vec<(TimerHandle, Tick)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one tick of every live task. Returns how many ran.
    pub fn tick_all(&self) -> usize {
        let mut tasks = match self.tasks.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return 0,
        };

        let mut ran = 0;
        for (handle, tick) in tasks.iter_mut() {
            if handle.is_cancelled() {
                continue;
            }
            ran += 1;
            if !tick() {
                handle.cancel();
            }
        }
        tasks.retain(|(handle, _)| !handle.is_cancelled());

        // Tasks registered during the ticks were pushed meanwhile.
        if let Ok(mut guard) = self.tasks.lock() {
            tasks.append(&mut guard);
            *guard = tasks;
        }
        ran
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().map(|t| t.len()).unwrap_or(0)
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, _interval: Duration, tick: Tick) -> TimerHandle {
        let handle = TimerHandle::new();
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push((handle.clone(), tick));
        }
        handle
    }
}

/// How a heartbeat ended.
#[derive(Debug)]
pub enum HeartbeatExit {
    /// The process and every watched child are gone.
    Finished(ManagedProcess),
    /// The handle stopped being trackable.
    Failed { pid: u32, error: Error },
}

/// Polls a managed process until it stops running.
#[derive(Clone)]
pub struct Heartbeat {
    scheduler: Arc<dyn Scheduler>,
    interval: Duration,
}

impl Heartbeat {
    pub fn new(scheduler: Arc<dyn Scheduler>, interval: Duration) -> Self {
        Self {
            scheduler,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling `process`. `finalize` fires exactly once, after which the
    /// timer cancels itself.
    pub fn watch(
        &self,
        supervisor: Supervisor,
        process: ManagedProcess,
        beat: Option<BeatHook>,
        finalize: Finalize,
    ) -> TimerHandle {
        self.watch_slot(supervisor, ProcessSlot::holding(process), beat, finalize)
    }

    /// Like [`Heartbeat::watch`] for a process others may stop meanwhile.
    /// Ticks are skipped while the slot is held elsewhere, and the slot is
    /// emptied once the process has finished.
    pub fn watch_slot(
        &self,
        supervisor: Supervisor,
        slot: ProcessSlot,
        mut beat: Option<BeatHook>,
        finalize: Finalize,
    ) -> TimerHandle {
        let pid = slot.pid().unwrap_or(0);
        let mut finalize = Some(finalize);

        let mut finish = move |exit: HeartbeatExit| {
            if let Some(finalize) = finalize.take()
                && catch_unwind(AssertUnwindSafe(|| finalize(exit))).is_err()
            {
                tracing::error!(pid, "Finalize callback panicked");
            }
        };

        tracing::debug!(pid, interval_ms = self.interval.as_millis() as u64, "Heartbeat started");

        self.scheduler.every(
            self.interval,
            Box::new(move || {
                let Some(mut guard) = slot.try_lock() else {
                    tracing::debug!(pid, "Process is being stopped, skipping tick");
                    return true;
                };
                if guard.is_none() {
                    drop(guard);
                    finish(HeartbeatExit::Failed {
                        pid,
                        error: Error::InvalidHandle(pid),
                    });
                    return false;
                }
                let Some(handle) = guard.as_mut() else {
                    return false;
                };

                let alive = catch_unwind(AssertUnwindSafe(|| supervisor.is_running(handle)));
                match alive {
                    Ok(Ok(true)) => {
                        if let Some(beat) = beat.as_mut() {
                            let children = supervisor.list_children(handle);
                            match catch_unwind(AssertUnwindSafe(|| beat(&children))) {
                                Ok(Ok(())) => {}
                                Ok(Err(e)) => tracing::warn!(pid, "Heartbeat hook failed: {e}"),
                                Err(_) => tracing::warn!(pid, "Heartbeat hook panicked"),
                            }
                        }
                        true
                    }
                    Ok(Ok(false)) => {
                        tracing::debug!(pid, "Process finished");
                        let done = guard.take();
                        drop(guard);
                        if let Some(done) = done {
                            finish(HeartbeatExit::Finished(done));
                        }
                        false
                    }
                    Ok(Err(error @ Error::InvalidHandle(_))) => {
                        tracing::error!(pid, "Lost track of process: {error}");
                        guard.take();
                        drop(guard);
                        finish(HeartbeatExit::Failed { pid, error });
                        false
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(pid, "Heartbeat tick failed, retrying: {e}");
                        true
                    }
                    Err(_) => {
                        tracing::warn!(pid, "Heartbeat tick panicked, retrying");
                        true
                    }
                }
            }),
        )
    }
}
