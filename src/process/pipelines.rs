//! Pipelines module (orchestration)

pub mod shutdown;

pub use shutdown::{Clock, ShutdownOutcome, SystemClock, escalate};
