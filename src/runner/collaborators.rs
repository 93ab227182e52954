//! Services a runner is built on

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, SettingsStore};
use crate::install::{Downloader, Extractor, InstallLocks, InstallPipeline};
use crate::paths::{PATH_CACHE, PATH_RUNNERS, PATH_TMP};
use crate::process::{Clock, Heartbeat, Scheduler, Supervisor};
use crate::ui::Prompt;

/// Directories runners install into and download to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerDirs {
    pub runners: PathBuf,
    pub cache: PathBuf,
    pub tmp: PathBuf,
}

impl Default for RunnerDirs {
    fn default() -> Self {
        Self {
            runners: PATH_RUNNERS.clone(),
            cache: PATH_CACHE.clone(),
            tmp: PATH_TMP.clone(),
        }
    }
}

impl RunnerDirs {
    /// Everything below one root, for tests and portable setups.
    pub fn under(root: &std::path::Path) -> Self {
        Self {
            runners: root.join("runners"),
            cache: root.join("cache"),
            tmp: root.join("tmp"),
        }
    }
}

#[derive(Clone)]
pub struct Collaborators {
    pub app: AppConfig,
    pub dirs: RunnerDirs,
    pub supervisor: Supervisor,
    pub heartbeat: Heartbeat,
    pub pipeline: InstallPipeline,
    pub downloader: Arc<dyn Downloader>,
    pub extractor: Arc<dyn Extractor>,
    pub prompt: Arc<dyn Prompt>,
    pub settings: Arc<dyn SettingsStore>,
    pub clock: Arc<dyn Clock>,
}

pub struct CollaboratorsBuilder {
    pub app: AppConfig,
    pub dirs: RunnerDirs,
    pub supervisor: Supervisor,
    pub scheduler: Arc<dyn Scheduler>,
    pub downloader: Arc<dyn Downloader>,
    pub extractor: Arc<dyn Extractor>,
    pub prompt: Arc<dyn Prompt>,
    pub settings: Arc<dyn SettingsStore>,
    pub clock: Arc<dyn Clock>,
}

impl CollaboratorsBuilder {
    pub fn build(self) -> Collaborators {
        let heartbeat = Heartbeat::new(self.scheduler, Duration::from_millis(self.app.heartbeat_ms));
        let pipeline = InstallPipeline::new(
            self.supervisor.clone(),
            heartbeat.clone(),
            self.downloader.clone(),
            InstallLocks::new(),
        );
        Collaborators {
            app: self.app,
            dirs: self.dirs,
            supervisor: self.supervisor,
            heartbeat,
            pipeline,
            downloader: self.downloader,
            extractor: self.extractor,
            prompt: self.prompt,
            settings: self.settings,
            clock: self.clock,
        }
    }
}
