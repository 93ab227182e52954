//! Starting a runner without a game

use crate::config::use_runtime;
use crate::error::{Error, Result};
use crate::paths::PATH_DATA;
use crate::process::{CommandSpec, ManagedProcess, SpawnOptions};
use crate::runner::Runner;
use crate::runner::collaborators::Collaborators;
use crate::runner::operations::runtime::runtime_env;
use crate::ui::Prompt;

pub const INSTALL_QUESTION: &str =
    "The required runner is not installed.\nDo you wish to install it now?";

/// Offer to install `runner`. Returns whether it is installed afterwards.
///
/// Runners that finish installing in the background return `false` here
/// until their install job completes.
pub fn install_dialog(runner: &dyn Runner, prompt: &dyn Prompt) -> bool {
    if !prompt.yesno("Required runner unavailable", INSTALL_QUESTION) {
        tracing::info!(runner = %runner.info().identifier, "Runner install declined");
        return false;
    }
    runner.install(None) && runner.is_installed()
}

/// Start `runner` on its own, unwatched.
pub fn run_alone(
    runner: &dyn Runner,
    collab: &Collaborators,
    disable_runtime: bool,
) -> Result<Option<ManagedProcess>> {
    let info = runner.info();
    if !info.runnable_alone {
        return Ok(None);
    }
    if !runner.is_installed() && !install_dialog(runner, collab.prompt.as_ref()) {
        return Ok(None);
    }

    let data = runner.get_run_data();
    if data.command.is_empty() {
        return Err(Error::PrerequisiteMissing(info.identifier.clone()));
    }
    let mut env = data.env;
    if use_runtime(disable_runtime || collab.app.disable_runtime) {
        env.extend(runtime_env(&PATH_DATA.join("runtime")));
    }

    let process = collab.supervisor.spawn(
        CommandSpec::new(data.command).with_env(env),
        SpawnOptions {
            runner: info.identifier.clone(),
            watch: false,
            ..Default::default()
        },
    )?;
    Ok(Some(process))
}
