//! Runners shipped as a downloadable archive

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{GameConfig, Section};
use crate::error::{Error, Result};
use crate::install::{InstallCallback, InstallOutcome};
use crate::process::{Primary, ShutdownOutcome};
use crate::runner::Runner;
use crate::runner::collaborators::Collaborators;
use crate::runner::operations::{download_and_extract, fetch_runner_versions, install_dialog, run_alone};
use crate::runner::pure::{
    api_arch, host_machine, option_args, option_bool, option_str, pick_version_url, tarball_arch,
};
use crate::runner::types::{LaunchFailure, LaunchInfo, RunData, RunnerInfo};

/// Where the runner archive is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerSource {
    /// Fixed archive names per architecture key, below `base_url`.
    Tarballs {
        base_url: String,
        tarballs: BTreeMap<String, String>,
    },
    /// Versions listed by the runner API at `base_url`.
    Api { base_url: String },
}

pub struct ArchiveRunner {
    info: RunnerInfo,
    /// Executable relative to the runner's install directory.
    executable: PathBuf,
    source: RunnerSource,
    merge_single: bool,
    machine: String,
    collab: Collaborators,
    config: GameConfig,
    primary: Primary,
}

impl ArchiveRunner {
    pub fn new(
        info: RunnerInfo,
        executable: PathBuf,
        source: RunnerSource,
        collab: Collaborators,
        config: GameConfig,
    ) -> Self {
        Self {
            info,
            executable,
            source,
            merge_single: true,
            machine: host_machine().to_string(),
            collab,
            config,
            primary: Primary::new(),
        }
    }

    /// Pretend to run on `machine` when picking archives.
    pub fn with_machine(mut self, machine: &str) -> Self {
        self.machine = machine.to_string();
        self
    }

    pub fn with_merge_single(mut self, merge_single: bool) -> Self {
        self.merge_single = merge_single;
        self
    }

    pub fn install_dir(&self) -> PathBuf {
        self.collab.dirs.runners.join(&self.info.identifier)
    }

    pub fn get_executable(&self) -> PathBuf {
        self.install_dir().join(&self.executable)
    }

    /// Download URL for this machine, `None` when nothing is published for it.
    pub fn runner_url(&self) -> Result<Option<String>> {
        match &self.source {
            RunnerSource::Tarballs { base_url, tarballs } => {
                tracing::debug!(runner = %self.info.identifier, "Using static tarball list");
                Ok(tarball_arch(&self.machine)
                    .and_then(|arch| tarballs.get(arch))
                    .map(|tarball| format!("{}{}", base_url, tarball)))
            }
            RunnerSource::Api { base_url } => {
                let Some(arch) = api_arch(&self.machine) else {
                    return Ok(None);
                };
                let versions = fetch_runner_versions(base_url, &self.info.identifier)?;
                Ok(pick_version_url(&versions, arch).map(str::to_string))
            }
        }
    }

    /// Start the runner on its own and keep track of it for [`Runner::stop`].
    /// Fails while a process started earlier is still running.
    pub fn run_alone(&self) -> Result<bool> {
        self.primary
            .check_idle(&self.collab.supervisor, &self.info.identifier)?;
        let disable_runtime = option_bool(
            &self.config,
            Section::System,
            &self.system_options(),
            "disable_runtime",
        );
        let Some(process) = run_alone(self, &self.collab, disable_runtime)? else {
            return Ok(false);
        };
        self.primary.adopt(process);
        Ok(true)
    }

    fn report(&self, on_complete: Option<InstallCallback>, outcome: InstallOutcome) {
        if let Some(callback) = on_complete {
            callback(outcome);
        }
    }
}

impl Runner for ArchiveRunner {
    fn info(&self) -> &RunnerInfo {
        &self.info
    }

    fn is_installed(&self) -> bool {
        self.get_executable().is_file()
    }

    fn install(&self, on_complete: Option<InstallCallback>) -> bool {
        let _guard = match self.collab.pipeline.locks().acquire(&self.info.identifier) {
            Ok(guard) => guard,
            Err(e) => {
                tracing::warn!(runner = %self.info.identifier, "{e}");
                self.report(on_complete, InstallOutcome::failed(&e));
                return false;
            }
        };

        let result = match self.runner_url() {
            Ok(Some(url)) => {
                download_and_extract(&self.collab, &url, &self.install_dir(), self.merge_single)
            }
            Ok(None) => Err(Error::UnsupportedPlatform(self.info.name.clone())),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.report(on_complete, InstallOutcome::Done);
                true
            }
            Err(e) => {
                tracing::error!(runner = %self.info.identifier, "Runner install failed: {e}");
                self.collab.prompt.msg("Runner install failed", &e.user_message());
                self.report(on_complete, InstallOutcome::failed(&e));
                false
            }
        }
    }

    fn get_run_data(&self) -> RunData {
        RunData {
            command: vec![self.get_executable().display().to_string()],
            env: Default::default(),
        }
    }

    fn play(&self) -> std::result::Result<LaunchInfo, LaunchFailure> {
        let executable = self.get_executable();
        if !executable.is_file() {
            return Err(LaunchFailure::path_not_found(executable));
        }

        let schema = self.system_options();
        let mut command = vec![executable.display().to_string()];
        if let Some(main_file) = self.config.get(Section::Game, "main_file").and_then(|v| v.as_str()) {
            command.push(main_file.to_string());
        }
        command.extend(option_args(&self.config, Section::Game, &[], "args"));

        Ok(LaunchInfo {
            command,
            env: Default::default(),
            working_dir: option_str(&self.config, Section::System, &schema, "game_path").map(PathBuf::from),
            exclude: option_str(&self.config, Section::System, &schema, "exclude_processes")
                .map(crate::process::parse_exclude_list)
                .unwrap_or_default(),
            stop_command: None,
        })
    }

    fn primary(&self) -> Option<&Primary> {
        Some(&self.primary)
    }

    fn stop(&self) -> Result<ShutdownOutcome> {
        self.primary.stop(
            &self.collab.supervisor,
            &self.collab.app.shutdown,
            self.collab.clock.as_ref(),
        )
    }

    fn remove_game_data(&self, identifier: Option<&str>) -> bool {
        if !self.is_installed() && !install_dialog(self, self.collab.prompt.as_ref()) {
            return false;
        }

        let schema = self.system_options();
        let Some(path) = identifier
            .or_else(|| option_str(&self.config, Section::System, &schema, "game_path"))
            .map(PathBuf::from)
        else {
            return false;
        };
        if !path.is_dir() {
            tracing::warn!(path = %path.display(), "Game data folder does not exist");
            return false;
        }

        tracing::info!(path = %path.display(), "Removing game data");
        match std::fs::remove_dir_all(&path) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(path = %path.display(), "Could not remove game data: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::{FakeDownloader, write_zip};
    use crate::runner::collaborators::fakes::TestBed;
    use crate::process::HeartbeatExit;
    use crate::runner::operations::INSTALL_QUESTION;
    use crate::runner::pipelines::launch;
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn info() -> RunnerInfo {
        RunnerInfo {
            identifier: "dosbox".into(),
            name: "DOSBox".into(),
            description: "MS-Dos emulator".into(),
            platforms: vec!["MS-DOS".into()],
            runnable_alone: true,
        }
    }

    fn tarballs() -> RunnerSource {
        RunnerSource::Tarballs {
            base_url: "https://runners.invalid/".into(),
            tarballs: BTreeMap::from([("x64".to_string(), "dosbox-x64.zip".to_string())]),
        }
    }

    fn zipped_runner() -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("r.zip");
        write_zip(&archive, &[("dosbox-0.74/bin/dosbox", "#!/bin/sh\n")]);
        std::fs::read(archive).unwrap()
    }

    #[test]
    fn installs_from_tarball_map() {
        let bed = TestBed::new(FakeDownloader::serving(&zipped_runner()), true);
        let runner = ArchiveRunner::new(info(), "bin/dosbox".into(), tarballs(), bed.collab.clone(), GameConfig::default())
            .with_machine("x86_64");
        assert!(!runner.is_installed());

        let outcome = Arc::new(Mutex::new(None));
        let seen = outcome.clone();
        assert!(runner.install(Some(Box::new(move |o| *seen.lock().unwrap() = Some(o)))));

        assert!(runner.is_installed());
        assert_eq!(*outcome.lock().unwrap(), Some(InstallOutcome::Done));
        assert_eq!(bed.downloader.fetched(), vec!["https://runners.invalid/dosbox-x64.zip"]);
        // Archive removed from the cache
        assert!(!bed.collab.dirs.cache.join("dosbox-x64.zip").exists());
    }

    #[test]
    fn no_archive_for_machine_is_unsupported() {
        let bed = TestBed::new(FakeDownloader::serving(b""), true);
        let runner = ArchiveRunner::new(info(), "bin/dosbox".into(), tarballs(), bed.collab.clone(), GameConfig::default())
            .with_machine("i686");

        assert!(!runner.install(None));
        assert!(bed.downloader.fetched().is_empty());
        assert!(bed.prompt.messages()[0].contains("not available for your platform"));
    }

    /// Runner whose game is `sh -c "sleep 30"`.
    fn sleeping_runner(bed: &TestBed) -> Arc<ArchiveRunner> {
        let mut config = GameConfig::default();
        config.set(Section::Game, "main_file", "-c");
        config.set(Section::Game, "args", "'sleep 30'");
        Arc::new(ArchiveRunner::new(info(), "/bin/sh".into(), tarballs(), bed.collab.clone(), config))
    }

    #[test]
    fn stop_reaches_a_launched_game() {
        let bed = TestBed::new(FakeDownloader::failing(), true);
        let runner = sleeping_runner(&bed);
        let (tx, rx) = mpsc::channel();

        let session = launch(
            runner.clone(),
            &bed.collab,
            Box::new(move |exit| {
                let _ = tx.send(exit);
            }),
        )
        .unwrap();
        assert_eq!(runner.primary().and_then(Primary::pid), Some(session.pid));

        let second = launch(runner.clone(), &bed.collab, Box::new(|_| {})).unwrap_err();
        assert_eq!(second.error, crate::error::ErrorKind::AlreadyRunning);
        assert!(matches!(
            runner.run_alone(),
            Err(crate::error::Error::AlreadyRunning { .. })
        ));
        assert_eq!(runner.primary().and_then(Primary::pid), Some(session.pid));

        let outcome = runner.stop();
        assert!(!matches!(outcome, Ok(ShutdownOutcome::NotRunning)));

        let mut exit = None;
        for _ in 0..300 {
            bed.scheduler.tick_all();
            if let Ok(received) = rx.try_recv() {
                exit = Some(received);
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(matches!(exit, Some(HeartbeatExit::Finished(_))));
        assert!(session.process.is_empty());
        assert_eq!(runner.stop().unwrap(), ShutdownOutcome::NotRunning);
    }

    #[test]
    fn run_alone_declined_install_starts_nothing() {
        let bed = TestBed::new(FakeDownloader::serving(&zipped_runner()), false);
        let runner = ArchiveRunner::new(info(), "bin/dosbox".into(), tarballs(), bed.collab.clone(), GameConfig::default())
            .with_machine("x86_64");

        assert!(!runner.run_alone().unwrap());
        assert_eq!(bed.prompt.questions(), vec![INSTALL_QUESTION.to_string()]);
        assert!(bed.downloader.fetched().is_empty());
        assert_eq!(runner.stop().unwrap(), ShutdownOutcome::NotRunning);
    }

    #[test]
    fn play_without_executable_is_path_not_found() {
        let bed = TestBed::new(FakeDownloader::serving(b""), true);
        let runner = ArchiveRunner::new(info(), "bin/dosbox".into(), tarballs(), bed.collab.clone(), GameConfig::default());

        let failure = runner.play().unwrap_err();
        assert_eq!(failure.error, crate::error::ErrorKind::PathNotFound);
        assert_eq!(failure.file, Some(runner.get_executable()));
    }

    #[test]
    fn remove_game_data_aborts_when_install_declined() {
        let bed = TestBed::new(FakeDownloader::serving(b""), false);
        let game_dir = bed.dir.path().join("games/keen");
        std::fs::create_dir_all(&game_dir).unwrap();
        let runner = ArchiveRunner::new(info(), "bin/dosbox".into(), tarballs(), bed.collab.clone(), GameConfig::default());

        assert!(!runner.remove_game_data(Some(game_dir.to_str().unwrap())));
        assert!(game_dir.exists());
        assert_eq!(bed.prompt.questions(), vec![INSTALL_QUESTION]);
        assert!(bed.downloader.fetched().is_empty());
    }

    #[test]
    fn remove_game_data_deletes_folder_when_installed() {
        let bed = TestBed::new(FakeDownloader::serving(&zipped_runner()), true);
        let game_dir = bed.dir.path().join("games/keen");
        std::fs::create_dir_all(game_dir.join("saves")).unwrap();
        let runner = ArchiveRunner::new(info(), "bin/dosbox".into(), tarballs(), bed.collab.clone(), GameConfig::default())
            .with_machine("x86_64");

        // Accepting the install dialog installs first
        assert!(runner.remove_game_data(Some(game_dir.to_str().unwrap())));
        assert!(runner.is_installed());
        assert!(!game_dir.exists());
    }

    #[test]
    fn stop_without_process_is_noop() {
        let bed = TestBed::new(FakeDownloader::serving(b""), true);
        let runner = ArchiveRunner::new(info(), "bin/dosbox".into(), tarballs(), bed.collab.clone(), GameConfig::default());
        assert_eq!(runner.stop().unwrap(), ShutdownOutcome::NotRunning);
    }
}
