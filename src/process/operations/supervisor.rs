//! Spawning and tracking external commands

use std::cell::RefCell;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::process::operations::procfs::{ProcFs, ProcessTable};
use crate::process::pipelines::shutdown::{Clock, ShutdownOutcome, escalate};
use crate::process::pure::{is_excluded, process_tree};
use crate::process::types::{
    CommandSpec, ManagedProcess, ProcessInfo, ShutdownPolicy, Signal, SpawnOptions,
};

#[derive(Clone)]
pub struct Supervisor {
    table: Arc<dyn ProcessTable>,
}

impl Supervisor {
    pub fn new(table: Arc<dyn ProcessTable>) -> Self {
        Self { table }
    }

    /// Supervisor over the real `/proc`.
    pub fn system() -> Self {
        Self::new(Arc::new(ProcFs::new()))
    }

    pub fn table(&self) -> &dyn ProcessTable {
        self.table.as_ref()
    }

    /// Start `spec` in its own process group and return without waiting.
    pub fn spawn(&self, spec: CommandSpec, options: SpawnOptions) -> Result<ManagedProcess> {
        let Some((program, args)) = spec.command.split_first() else {
            return Err(Error::ProcessSpawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        let mut cmd = Command::new(program);
        cmd.args(args);
        if options.clear_env {
            cmd.env_clear();
        }
        cmd.envs(&spec.env);
        if let Some(dir) = &spec.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        // Own group so the whole tree can be found and signalled later.
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|source| Error::ProcessSpawn {
            program: program.clone(),
            source,
        })?;
        let pid = child.id();

        tracing::info!(
            runner = %options.runner,
            pid,
            watch = options.watch,
            command = ?spec.command,
            "Process started"
        );

        Ok(ManagedProcess {
            pid,
            pgid: pid,
            spec,
            options,
            child: Some(child),
            exit_code: None,
            root_exited: false,
        })
    }

    fn root_alive(&self, handle: &mut ManagedProcess) -> Result<bool> {
        if handle.root_exited {
            return Ok(false);
        }

        let Some(child) = handle.child.as_mut() else {
            return match self.table.info(handle.pid) {
                // The pid now belongs to an unrelated process.
                Some(p) if handle.pgid != 0 && p.pgid != handle.pgid => {
                    Err(Error::InvalidHandle(handle.pid))
                }
                Some(p) => Ok(p.state.is_alive()),
                None => Ok(false),
            };
        };

        let status = child
            .try_wait()
            .map_err(|_| Error::InvalidHandle(handle.pid))?;
        match status {
            Some(status) => {
                tracing::debug!(pid = handle.pid, %status, "Root process exited");
                handle.exit_code = status.code();
                handle.root_exited = true;
                handle.child = None;
                Ok(false)
            }
            None => Ok(true),
        }
    }

    /// Whether the command is still doing work.
    ///
    /// Zombies never count. For watched processes, any live descendant whose
    /// name is not on the exclude list keeps the command running.
    pub fn is_running(&self, handle: &mut ManagedProcess) -> Result<bool> {
        if self.root_alive(handle)? {
            return Ok(true);
        }
        if !handle.options.watch {
            return Ok(false);
        }

        Ok(self
            .children(handle)?
            .iter()
            .any(|p| p.state.is_alive() && !is_excluded(&p.name, &handle.options.exclude)))
    }

    /// Like [`Supervisor::list_children`], failing when the table cannot be read.
    pub fn children(&self, handle: &ManagedProcess) -> Result<Vec<ProcessInfo>> {
        Ok(process_tree(&self.table.try_snapshot()?, handle.pid, handle.pgid))
    }

    /// Fresh snapshot of the process tree below the command, zombies included.
    pub fn list_children(&self, handle: &ManagedProcess) -> Vec<ProcessInfo> {
        process_tree(&self.table.snapshot(), handle.pid, handle.pgid)
    }

    /// Run the graceful stop command registered at spawn time.
    ///
    /// Returns `false` when there was none.
    pub fn request_stop(&self, handle: &ManagedProcess) -> Result<bool> {
        let Some(stop) = &handle.options.stop_command else {
            return Ok(false);
        };
        let Some((program, args)) = stop.command.split_first() else {
            return Ok(false);
        };

        tracing::debug!(pid = handle.pid, command = ?stop.command, "Requesting graceful stop");
        let status = Command::new(program)
            .args(args)
            .envs(&stop.env)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| Error::ProcessSpawn {
                program: program.clone(),
                source,
            })?;
        if !status.success() {
            tracing::warn!(pid = handle.pid, %status, "Stop command failed");
        }
        Ok(true)
    }

    /// Force-terminate the command and everything below it.
    pub fn kill(&self, handle: &mut ManagedProcess) -> Result<()> {
        let children = self.list_children(handle);
        tracing::warn!(
            pid = handle.pid,
            children = children.len(),
            "Force killing process tree"
        );

        for child in &children {
            self.table.signal(child.pid, Signal::Kill)?;
        }
        self.table.signal_group(handle.pgid, Signal::Kill)?;
        if !handle.root_exited {
            self.table.signal(handle.pid, Signal::Kill)?;
        }

        if let Some(child) = handle.child.as_mut() {
            // Reap so the root does not linger as a zombie.
            if let Ok(Some(status)) = child.try_wait() {
                handle.exit_code = status.code();
                handle.root_exited = true;
                handle.child = None;
            }
        }
        Ok(())
    }

    /// Stop the command using the escalation policy.
    pub fn stop(
        &self,
        handle: &mut ManagedProcess,
        policy: &ShutdownPolicy,
        clock: &dyn Clock,
    ) -> Result<ShutdownOutcome> {
        let pid = handle.pid;
        let handle = RefCell::new(handle);

        escalate(
            policy,
            clock,
            pid,
            || {
                self.is_running(&mut handle.borrow_mut())
                    .unwrap_or_else(|e| {
                        tracing::warn!(pid, "Liveness check failed, assuming stopped: {e}");
                        false
                    })
            },
            || {
                if let Err(e) = self.request_stop(&handle.borrow()) {
                    tracing::warn!(pid, "Graceful stop failed: {e}");
                }
            },
            || {
                if let Err(e) = self.kill(&mut handle.borrow_mut()) {
                    tracing::error!(pid, "Kill failed: {e}");
                }
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::operations::procfs::fakes::FakeTable;
    use crate::process::pipelines::shutdown::fakes::FakeClock;
    use crate::process::types::ProcessState;

    fn attached(table: &Arc<FakeTable>, exclude: &[&str]) -> (Supervisor, ManagedProcess) {
        let supervisor = Supervisor::new(table.clone());
        let handle = ManagedProcess::attach(
            100,
            100,
            SpawnOptions {
                runner: "test".to_string(),
                watch: true,
                exclude: exclude.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
        );
        (supervisor, handle)
    }

    #[test]
    fn excluded_helpers_do_not_keep_it_running() {
        let table = Arc::new(FakeTable::default());
        table.add(101, 1, 100, "Agent.exe", ProcessState::Sleeping);
        table.add(102, 1, 100, "Battle.net Helper.exe", ProcessState::Sleeping);
        let (supervisor, mut handle) = attached(&table, &["Agent.exe", "Battle.net Helper.exe"]);

        assert!(!supervisor.is_running(&mut handle).unwrap());
        assert_eq!(supervisor.list_children(&handle).len(), 2);
    }

    #[test]
    fn live_child_keeps_it_running_until_zombie() {
        let table = Arc::new(FakeTable::default());
        table.add(100, 1, 100, "wine", ProcessState::Sleeping);
        table.add(101, 100, 100, "Blizzard-Setup.exe", ProcessState::Running);
        let (supervisor, mut handle) = attached(&table, &[]);

        assert!(supervisor.is_running(&mut handle).unwrap());

        table.remove(100);
        assert!(supervisor.is_running(&mut handle).unwrap());

        table.set_state(101, ProcessState::Zombie);
        assert!(!supervisor.is_running(&mut handle).unwrap());
        // Still listed for kill enumeration
        assert_eq!(supervisor.list_children(&handle)[0].pid, 101);
    }

    #[test]
    fn recycled_pid_is_an_invalid_handle() {
        let table = Arc::new(FakeTable::default());
        table.add(100, 1, 555, "bash", ProcessState::Sleeping);
        let (supervisor, mut handle) = attached(&table, &[]);

        let err = supervisor.is_running(&mut handle).unwrap_err();
        assert!(matches!(err, Error::InvalidHandle(100)));
    }

    #[test]
    fn unreadable_table_is_reported() {
        let table = Arc::new(FakeTable::default());
        table.add(101, 100, 100, "game.exe", ProcessState::Running);
        *table.failing_reads.lock().unwrap() = 1;
        let (supervisor, mut handle) = attached(&table, &[]);

        assert!(matches!(supervisor.is_running(&mut handle), Err(Error::Io(_))));
        assert!(supervisor.is_running(&mut handle).unwrap());
    }

    #[test]
    fn unwatched_ignores_children() {
        let table = Arc::new(FakeTable::default());
        table.add(101, 100, 100, "game.exe", ProcessState::Running);
        let (supervisor, mut handle) = attached(&table, &[]);
        handle.options.watch = false;

        assert!(!supervisor.is_running(&mut handle).unwrap());
    }

    #[test]
    fn kill_on_exited_process_is_noop() {
        let table = Arc::new(FakeTable::default());
        let (supervisor, mut handle) = attached(&table, &[]);
        assert!(supervisor.kill(&mut handle).is_ok());
        assert!(supervisor.kill(&mut handle).is_ok());
    }

    #[test]
    fn request_stop_without_command_is_noop() {
        let table = Arc::new(FakeTable::default());
        let (supervisor, handle) = attached(&table, &[]);
        assert!(!supervisor.request_stop(&handle).unwrap());
    }

    #[test]
    fn stop_escalates_to_kill() {
        let table = Arc::new(FakeTable::default());
        table.add(100, 1, 100, "Battle.net.exe", ProcessState::Sleeping);
        let (supervisor, mut handle) = attached(&table, &[]);
        let clock = FakeClock::default();

        let outcome = supervisor
            .stop(&mut handle, &ShutdownPolicy::default(), &clock)
            .unwrap();

        assert_eq!(outcome, ShutdownOutcome::Killed { checks: 1 });
        assert_eq!(clock.sleeps(), 11);
        assert!(table.signals().contains(&(100, Signal::Kill)));
    }

    #[test]
    fn spawn_real_process_and_reap() {
        let supervisor = Supervisor::system();
        let mut handle = supervisor
            .spawn(
                CommandSpec::new(vec!["sh".into(), "-c".into(), "exit 3".into()]),
                SpawnOptions::default(),
            )
            .unwrap();

        let mut running = true;
        for _ in 0..200 {
            running = supervisor.is_running(&mut handle).unwrap();
            if !running {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(!running);
        assert_eq!(handle.exit_code(), Some(3));
    }

    #[test]
    fn spawn_missing_program_is_spawn_error() {
        let supervisor = Supervisor::system();
        let err = supervisor
            .spawn(
                CommandSpec::new(vec!["/nonexistent/winerunner-test".into()]),
                SpawnOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::ProcessSpawn { .. }));
    }
}
