//! Runner abstraction - HOW a game gets started
//!
//! A runner knows how to install itself, build the command for a game and
//! stop what it started. Concrete runners:
//! - ArchiveRunner: a downloadable emulator or compatibility layer
//! - BattleNet: Blizzard games through the Battle.net client under wine
//!
//! Runners never block on a running process. Launches are handed to the
//! process supervisor and polled by a heartbeat.

use crate::error::Result;
use crate::install::InstallCallback;
use crate::process::{Primary, ProcessInfo, ShutdownOutcome};

pub mod archive;
pub mod collaborators;
pub mod operations;
pub mod pipelines;
pub mod pure;
pub mod registry;
pub mod types;

pub use archive::{ArchiveRunner, RunnerSource};
pub use collaborators::{Collaborators, CollaboratorsBuilder, RunnerDirs};
pub use pipelines::{Session, launch};
pub use registry::RunnerRegistry;
pub use types::{
    Capabilities, LaunchFailure, LaunchInfo, OptionDescriptor, OptionKind, RunData, RunnerInfo,
};

/// Capability set every runner implements.
pub trait Runner: Send + Sync {
    fn info(&self) -> &RunnerInfo;

    /// Options stored in the `game` section.
    fn game_options(&self) -> Vec<OptionDescriptor> {
        Vec::new()
    }

    /// Options stored in the `runner` section.
    fn runner_options(&self) -> Vec<OptionDescriptor> {
        Vec::new()
    }

    /// Options stored in the `system` section.
    fn system_options(&self) -> Vec<OptionDescriptor> {
        pure::default_system_options()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Never fails; anything that prevents detection reads as not installed.
    fn is_installed(&self) -> bool;

    /// Install the runner. Returns `false` when the install could not be
    /// started or failed; `on_complete` fires once the install has finished.
    fn install(&self, on_complete: Option<InstallCallback>) -> bool;

    /// Command and environment to start the runner alone.
    fn get_run_data(&self) -> RunData;

    /// Preparation before a game starts. `false` aborts the launch.
    fn prelaunch(&self) -> bool {
        true
    }

    fn play(&self) -> std::result::Result<LaunchInfo, LaunchFailure>;

    /// Called on every heartbeat while a launched game runs.
    fn beat(&self, _children: &[ProcessInfo]) -> Result<()> {
        Ok(())
    }

    /// Holder of the game or runner process this runner started, if it
    /// tracks one. Launches refuse to start a second one while it runs.
    fn primary(&self) -> Option<&Primary> {
        None
    }

    fn stop(&self) -> Result<ShutdownOutcome>;

    /// Remove the data of one game. Returns `false` when nothing was done.
    fn remove_game_data(&self, identifier: Option<&str>) -> bool;
}
