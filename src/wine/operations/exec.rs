//! Running programs inside a prefix

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::prefix::Arch;
use crate::process::{CommandSpec, ManagedProcess, SpawnOptions, Supervisor};
use crate::wine::types::{ExecOptions, WINE_SYSTEM_PROCESSES, WineEnv};

/// `wineserver -k` for `prefix`: asks every process of the prefix to exit.
pub fn wineserver_kill(env: &WineEnv, prefix: &Path, arch: Arch) -> CommandSpec {
    CommandSpec::new(vec![
        env.wineserver().display().to_string(),
        "-k".to_string(),
    ])
    .with_env(env.get_env(prefix, arch))
}

/// Start `executable` under wine without waiting for it.
///
/// The returned process stops gracefully through `wineserver -k`.
pub fn wineexec(
    env: &WineEnv,
    supervisor: &Supervisor,
    prefix: &Path,
    arch: Arch,
    executable: &Path,
    opts: ExecOptions,
) -> Result<ManagedProcess> {
    let mut command = vec![
        env.executable().display().to_string(),
        executable.display().to_string(),
    ];
    command.extend(opts.args);

    let mut vars = env.get_env(prefix, arch);
    vars.extend(opts.env);

    let mut spec = CommandSpec::new(command).with_env(vars);
    if let Some(dir) = opts.working_dir {
        spec = spec.with_working_dir(dir);
    }

    let mut exclude = opts.exclude;
    exclude.extend(WINE_SYSTEM_PROCESSES.iter().map(|s| s.to_string()));

    supervisor.spawn(
        spec,
        SpawnOptions {
            runner: env.kind().to_string(),
            watch: opts.watch,
            exclude,
            stop_command: Some(wineserver_kill(env, prefix, arch)),
            clear_env: false,
        },
    )
}

/// Run `program args` with the prefix environment and wait for it.
pub(crate) fn run_blocking(
    env: &WineEnv,
    prefix: &Path,
    arch: Arch,
    program: &Path,
    args: &[&str],
) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .envs(env.get_env(prefix, arch))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .status()
        .map_err(|source| Error::ProcessSpawn {
            program: program.display().to_string(),
            source,
        })?;

    if !status.success() {
        tracing::warn!(program = %program.display(), %status, "Command exited with failure");
    }
    Ok(())
}

/// Ask every process of `prefix` to exit, without waiting for them.
pub fn winekill(env: &WineEnv, prefix: &Path, arch: Arch) -> Result<()> {
    run_blocking(env, prefix, arch, &env.wineserver(), &["-k"])
}

/// Stop everything running in `prefix` and wait for the wineserver to exit.
pub fn shutdown_prefix(env: &WineEnv, prefix: &Path, arch: Arch) -> Result<()> {
    tracing::debug!(prefix = %prefix.display(), "Stopping wine processes");
    winekill(env, prefix, arch)?;
    run_blocking(env, prefix, arch, &env.wineserver(), &["-w"])
}
