//! Process supervision
//!
//! Spawns external commands in their own process group, tracks the resulting
//! process tree through `/proc`, polls liveness on a heartbeat and stops
//! trees with a graceful-then-forced escalation.
//!
//! ## Module Structure
//!
//! - `types`: process state, command and policy types
//! - `pure/`: stat parsing, tree selection, exclude lists (no I/O)
//! - `operations/`: process table access and the supervisor
//! - `pipelines/`: shutdown escalation
//! - `heartbeat`: repeating liveness poll
//! - `slot`: process handles shared by a heartbeat and a runner's stop

pub mod heartbeat;
mod operations;
mod pipelines;
mod pure;
mod slot;
mod types;

pub use heartbeat::{
    BeatHook, Finalize, Heartbeat, HeartbeatExit, ManualScheduler, Scheduler, ThreadScheduler,
    TimerHandle,
};
pub use operations::{ProcFs, ProcessTable, Supervisor, find_by_name};
pub use pipelines::{Clock, ShutdownOutcome, SystemClock, escalate};
pub use pure::{is_excluded, parse_exclude_list};
pub use slot::{Primary, ProcessSlot};
pub use types::{
    CommandSpec, ManagedProcess, ProcessInfo, ProcessState, ShutdownPolicy, Signal, SpawnOptions,
};

#[cfg(test)]
pub(crate) use operations::procfs::fakes::FakeTable;
#[cfg(test)]
pub(crate) use pipelines::shutdown::fakes::FakeClock;
