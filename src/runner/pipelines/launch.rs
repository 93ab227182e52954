//! Starting a game and watching it

use std::sync::Arc;

use crate::error::{ErrorKind, Result};
use crate::process::{CommandSpec, Finalize, ProcessSlot, ShutdownOutcome, SpawnOptions, TimerHandle};
use crate::runner::Runner;
use crate::runner::collaborators::Collaborators;
use crate::runner::types::LaunchFailure;

/// A running game.
#[derive(Debug, Clone)]
pub struct Session {
    pub pid: u32,
    pub timer: TimerHandle,
    /// Shared with the heartbeat, and with the runner when it tracks a primary process.
    pub process: ProcessSlot,
}

impl Session {
    /// Stop the game with the configured escalation. The heartbeat then
    /// reports the exit.
    pub fn stop(&self, collab: &Collaborators) -> Result<ShutdownOutcome> {
        self.process
            .stop(&collab.supervisor, &collab.app.shutdown, collab.clock.as_ref())
    }
}

/// Run prelaunch, build the launch command, spawn it and poll it until it
/// exits. `on_exit` fires once the game and its watched children are gone.
pub fn launch(
    runner: Arc<dyn Runner>,
    collab: &Collaborators,
    on_exit: Finalize,
) -> std::result::Result<Session, LaunchFailure> {
    let identifier = runner.info().identifier.clone();

    if let Some(primary) = runner.primary() {
        primary.check_idle(&collab.supervisor, &identifier)?;
    }

    if !runner.prelaunch() {
        return Err(LaunchFailure {
            error: ErrorKind::ShutdownTimeout,
            file: None,
            detail: Some("A previous session could not be shut down".to_string()),
        });
    }

    let info = runner.play()?;
    let mut spec = CommandSpec::new(info.command).with_env(info.env);
    if let Some(dir) = info.working_dir {
        spec = spec.with_working_dir(dir);
    }

    let process = collab.supervisor.spawn(
        spec,
        SpawnOptions {
            runner: identifier.clone(),
            watch: true,
            exclude: info.exclude,
            stop_command: info.stop_command,
            clear_env: false,
        },
    )?;
    let pid = process.pid;
    tracing::info!(runner = %identifier, pid, "Game started");

    let slot = match runner.primary() {
        Some(primary) => primary.adopt(process),
        None => ProcessSlot::holding(process),
    };

    let beat_runner = runner.clone();
    let timer = collab.heartbeat.watch_slot(
        collab.supervisor.clone(),
        slot.clone(),
        Some(Box::new(move |children| beat_runner.beat(children))),
        on_exit,
    );

    Ok(Session {
        pid,
        timer,
        process: slot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    use crate::install::{FakeDownloader, InstallCallback};
    use crate::process::{HeartbeatExit, Primary, ProcessInfo};
    use crate::runner::collaborators::fakes::TestBed;
    use crate::runner::types::{LaunchInfo, RunData, RunnerInfo};

    struct ShellRunner {
        info: RunnerInfo,
        command: Vec<String>,
        ready: bool,
        beats: AtomicUsize,
        played: Mutex<u32>,
        primary: Primary,
    }

    impl ShellRunner {
        fn new(script: &str, ready: bool) -> Self {
            Self {
                info: RunnerInfo {
                    identifier: "shell".to_string(),
                    name: "Shell".to_string(),
                    description: String::new(),
                    platforms: vec!["Linux".to_string()],
                    runnable_alone: false,
                },
                command: vec!["sh".into(), "-c".into(), script.to_string()],
                ready,
                beats: AtomicUsize::new(0),
                played: Mutex::new(0),
                primary: Primary::new(),
            }
        }
    }

    impl Runner for ShellRunner {
        fn info(&self) -> &RunnerInfo {
            &self.info
        }

        fn is_installed(&self) -> bool {
            true
        }

        fn install(&self, _on_complete: Option<InstallCallback>) -> bool {
            true
        }

        fn get_run_data(&self) -> RunData {
            RunData::default()
        }

        fn prelaunch(&self) -> bool {
            self.ready
        }

        fn play(&self) -> std::result::Result<LaunchInfo, LaunchFailure> {
            *self.played.lock().unwrap() += 1;
            Ok(LaunchInfo {
                command: self.command.clone(),
                ..Default::default()
            })
        }

        fn beat(&self, _children: &[ProcessInfo]) -> Result<()> {
            self.beats.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn primary(&self) -> Option<&Primary> {
            Some(&self.primary)
        }

        fn stop(&self) -> Result<ShutdownOutcome> {
            Ok(ShutdownOutcome::NotRunning)
        }

        fn remove_game_data(&self, _identifier: Option<&str>) -> bool {
            false
        }
    }

    #[test]
    fn game_is_watched_until_it_exits() {
        let bed = TestBed::new(FakeDownloader::failing(), true);
        let runner = Arc::new(ShellRunner::new("exit 7", true));
        let (tx, rx) = mpsc::channel();

        let session = launch(
            runner.clone(),
            &bed.collab,
            Box::new(move |exit| {
                let _ = tx.send(exit);
            }),
        )
        .unwrap();
        assert!(session.pid > 0);
        assert_eq!(runner.primary.pid(), Some(session.pid));

        let mut exit = None;
        for _ in 0..300 {
            bed.scheduler.tick_all();
            if let Ok(received) = rx.try_recv() {
                exit = Some(received);
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        match exit {
            Some(HeartbeatExit::Finished(process)) => assert_eq!(process.exit_code(), Some(7)),
            other => panic!("unexpected heartbeat result: {:?}", other),
        }
        assert!(session.timer.is_cancelled());
        assert!(session.process.is_empty());
        assert_eq!(runner.primary.pid(), None);
        assert_eq!(*runner.played.lock().unwrap(), 1);
    }

    #[test]
    fn failed_prelaunch_skips_play() {
        let bed = TestBed::new(FakeDownloader::failing(), true);
        let runner = Arc::new(ShellRunner::new("exit 0", false));

        let failure = launch(runner.clone(), &bed.collab, Box::new(|_| {})).unwrap_err();

        assert_eq!(failure.error, ErrorKind::ShutdownTimeout);
        assert_eq!(*runner.played.lock().unwrap(), 0);
        assert_eq!(bed.scheduler.pending(), 0);
    }

    #[test]
    fn spawn_error_is_reported() {
        let bed = TestBed::new(FakeDownloader::failing(), true);
        let mut runner = ShellRunner::new("", true);
        runner.command = vec!["/nonexistent/winerunner-game".into()];

        let failure = launch(Arc::new(runner), &bed.collab, Box::new(|_| {})).unwrap_err();

        assert_eq!(failure.error, ErrorKind::ProcessSpawn);
        assert!(failure.detail.is_some());
        assert_eq!(bed.scheduler.pending(), 0);
    }
}
