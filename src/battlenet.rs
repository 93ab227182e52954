//! Battle.net runner - Blizzard games through the Battle.net client under wine
//!
//! The client lives in a 32-bit prefix, with a 64-bit prefix sharing its
//! users and program data. Games are started either through the client
//! (`battlenet://` URIs) or directly from the folder the agent's product
//! database records for them.
//!
//! ## Module Structure
//! - `types.rs`: known games, installer location, client process names
//! - `pure/`: option schema, client config merging, registry settings
//! - `operations/`: client config file, locating the launcher, client processes
//! - `pipelines/`: client install steps

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::config::{GameConfig, Section};
use crate::error::{Error, Result};
use crate::install::{Artifact, InstallCallback, InstallJob, InstallOutcome, InstallState};
use crate::paths::{BIN_WINE, PATH_HOME};
use crate::prefix::{Arch, Provisioner, WineBoot};
use crate::process::{
    CommandSpec, ManagedProcess, Primary, ProcessInfo, ShutdownOutcome, SpawnOptions, escalate,
    parse_exclude_list,
};
use crate::productdb::{ProductDb, read_product_db};
use crate::runner::operations::install_dialog;
use crate::runner::pure::{option_args, option_bool, option_str};
use crate::runner::{
    Collaborators, LaunchFailure, LaunchInfo, OptionDescriptor, RunData, Runner, RunnerInfo,
};
use crate::wine::{WineEnv, to_unix_path, wineserver_kill, winekill};

mod operations;
mod pipelines;
mod pure;
mod types;

pub use operations::{client_process, find_launcher, product_db_path};
pub use pipelines::ClientInstall;
pub use pure::selective_merge;
pub use types::{BNET_INSTALLER_URL, GAMELIST, GameEntry, UNKNOWN_GAME, game_entry, get_game_name};

use operations::{
    client_config_path, kill_client, quit_client_when_playing, read_client_config, uninstaller_path,
    write_client_config,
};
use pure::client_overrides;
use types::{BNET_INSTALLER_NAME, DEFAULT_EXCLUDE_PROCESSES};

pub const IDENTIFIER: &str = "winebattlenet";

pub fn runner_info() -> RunnerInfo {
    RunnerInfo {
        identifier: IDENTIFIER.to_string(),
        name: "Wine Battle.net".to_string(),
        description: "Runs Blizzard games with Battle.net (Wine)".to_string(),
        platforms: vec!["Windows".to_string()],
        runnable_alone: true,
    }
}

/// Windows user name wine creates the profile for.
fn login_name() -> String {
    ["USER", "LOGNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "winerunner".to_string())
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => PATH_HOME.join(rest),
        None if path == "~" => PATH_HOME.clone(),
        None => PathBuf::from(path),
    }
}

pub struct BattleNet {
    info: RunnerInfo,
    env: Arc<WineEnv>,
    collab: Collaborators,
    config: GameConfig,
    user: String,
    game: Primary,
}

impl BattleNet {
    pub fn new(env: WineEnv, collab: Collaborators, config: GameConfig) -> Self {
        Self {
            info: runner_info(),
            env: Arc::new(env),
            collab,
            config,
            user: login_name(),
            game: Primary::new(),
        }
    }

    /// Runner using the configured or managed wine, creating prefixes with
    /// `wineboot`.
    pub fn system(collab: Collaborators, config: GameConfig) -> Self {
        let wine = collab.app.wine_path.clone().unwrap_or_else(|| BIN_WINE.clone());
        let provisioner = Provisioner::new(collab.dirs.runners.clone(), Box::new(WineBoot::new(wine.clone())));
        let env = WineEnv::new(wine, IDENTIFIER, Arch::Win32, provisioner);
        Self::new(env, collab, config)
    }

    pub fn with_user(mut self, user: &str) -> Self {
        self.user = user.to_string();
        self
    }

    pub fn wine(&self) -> &WineEnv {
        &self.env
    }

    pub fn gameid(&self) -> &str {
        self.config
            .get(Section::Game, "gameid")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    fn runner_flag(&self, key: &str) -> bool {
        option_bool(&self.config, Section::Runner, &self.runner_options(), key)
    }

    fn arch(&self) -> Option<Arch> {
        let schema = self.game_options();
        option_str(&self.config, Section::Game, &schema, "arch").and_then(Arch::from_option)
    }

    /// Prefix the game runs in: the configured one, else the default prefix
    /// for the configured architecture, created when missing.
    pub fn prefix_path(&self) -> Result<(PathBuf, Arch)> {
        let arch = self.arch();
        let schema = self.game_options();
        if let Some(prefix) = option_str(&self.config, Section::Game, &schema, "prefix") {
            return Ok((expand_home(prefix), arch.unwrap_or(self.env.default_arch())));
        }
        let prefix = self.env.ensure_prefix(arch)?;
        Ok((prefix, arch.unwrap_or(self.env.default_arch())))
    }

    pub fn default_prefix(&self) -> PathBuf {
        self.env.default_prefix(None)
    }

    pub fn get_bnet_path(&self) -> Option<PathBuf> {
        find_launcher(&self.default_prefix())
    }

    /// Folder holding the client files.
    pub fn bnet_dir(&self) -> Option<PathBuf> {
        self.get_bnet_path()
            .and_then(|path| path.parent().map(PathBuf::from))
            .filter(|dir| dir.is_dir())
    }

    fn client_config_file(&self) -> Result<PathBuf> {
        let prefix = self.env.ensure_prefix(None)?;
        Ok(client_config_path(&prefix, &self.user))
    }

    pub fn get_bnet_config(&self) -> Result<Value> {
        read_client_config(&self.client_config_file()?)
    }

    pub fn set_bnet_config(&self, config: &Value) -> Result<()> {
        write_client_config(&self.client_config_file()?, config)
    }

    /// Installed products according to the agent, read fresh on every call.
    pub fn get_bnet_games(&self) -> Option<ProductDb> {
        let path = product_db_path(&self.default_prefix());
        match read_product_db(&path) {
            Ok(products) => products,
            Err(e) => {
                tracing::error!(path = %path.display(), "Could not read product database: {e}");
                None
            }
        }
    }

    pub fn get_gameid_list(&self) -> Vec<String> {
        self.get_bnet_games()
            .map(|products| products.into_keys().collect())
            .unwrap_or_default()
    }

    /// Windows path of the folder `gameid` is installed in.
    pub fn get_game_path_from_gameid(&self, gameid: &str) -> Option<String> {
        let path = self
            .get_bnet_games()
            .and_then(|mut products| products.remove(gameid))
            .map(|record| record.path);
        if path.is_none() {
            tracing::warn!(gameid, "Data path for Battle.net game not found");
        }
        path
    }

    pub fn game_path(&self) -> Option<String> {
        let gameid = self.gameid();
        if gameid.is_empty() {
            return None;
        }
        self.get_game_path_from_gameid(gameid)
    }

    /// Folder to open for "browse files", offering to install the client first.
    pub fn browse_dir(&self) -> Option<String> {
        if !self.is_installed() && !install_dialog(self, self.collab.prompt.as_ref()) {
            return None;
        }
        self.game_path()
    }

    fn launch_args(&self) -> Vec<String> {
        let mut args = vec![self.env.executable().display().to_string()];
        if let Some(bnet) = self.get_bnet_path() {
            args.push(bnet.display().to_string());
        }
        args
    }

    /// Shut the client down cleanly, killing it if it will not go.
    pub fn shutdown(&self) -> Result<ShutdownOutcome> {
        let table = self.collab.supervisor.table();
        let Some(client) = client_process(table) else {
            return Ok(ShutdownOutcome::NotRunning);
        };

        tracing::info!(pid = client.pid, "Waiting for Battle.net to shutdown");
        let prefix = self.default_prefix();
        escalate(
            &self.collab.app.shutdown,
            self.collab.clock.as_ref(),
            client.pid,
            || client_process(table).is_some(),
            || {
                if let Err(e) = winekill(&self.env, &prefix, Arch::Win32) {
                    tracing::warn!(prefix = %prefix.display(), "wineserver -k failed: {e}");
                }
            },
            || kill_client(table),
        )
    }

    /// Ask the client to install `gameid`.
    pub fn install_game(&self, gameid: &str) -> Result<ManagedProcess> {
        if gameid.is_empty() {
            return Err(Error::Config("Missing gameid for Battle.net game install".to_string()));
        }
        let bnet = self
            .get_bnet_path()
            .ok_or_else(|| Error::PathNotFound(self.default_prefix().join("drive_c/Program Files (x86)/Battle.net")))?;

        let command = vec![
            self.env.executable().display().to_string(),
            bnet.display().to_string(),
            "--install".to_string(),
            format!("--game={}", gameid),
        ];
        tracing::info!(gameid, "Installing game through Battle.net");
        self.collab.supervisor.spawn(
            CommandSpec::new(command).with_env(self.env.get_env(&self.default_prefix(), Arch::Win32)),
            SpawnOptions {
                runner: IDENTIFIER.to_string(),
                watch: false,
                ..Default::default()
            },
        )
    }

    fn installer_job(&self) -> InstallJob {
        InstallJob {
            runner: IDENTIFIER.to_string(),
            artifact: Artifact::Url(BNET_INSTALLER_URL.to_string()),
            dest: self.collab.dirs.tmp.join(BNET_INSTALLER_NAME),
            arch: None,
        }
    }

    fn play_direct(&self, prefix: &std::path::Path, env: HashMap<String, String>) -> std::result::Result<LaunchInfo, LaunchFailure> {
        let gameid = self.gameid();
        let entry = game_entry(gameid)
            .ok_or_else(|| Error::Config(format!("Unknown Battle.net game '{}'", gameid)))?;
        let windows_dir = self.get_game_path_from_gameid(gameid).ok_or_else(|| LaunchFailure {
            error: crate::error::ErrorKind::PathNotFound,
            file: None,
            detail: Some(format!("{} is not installed", entry.name)),
        })?;

        let game_dir = to_unix_path(prefix, &windows_dir);
        if !game_dir.is_dir() {
            return Err(LaunchFailure::path_not_found(game_dir));
        }
        let game_exe = game_dir.join(entry.executable);
        if !game_exe.exists() {
            return Err(LaunchFailure::path_not_found(game_exe));
        }

        let mut command = vec![self.env.executable().display().to_string()];
        command.extend(option_args(&self.config, Section::Runner, &self.runner_options(), "args"));
        command.push(game_exe.display().to_string());
        command.extend(option_args(&self.config, Section::Game, &self.game_options(), "args"));

        Ok(LaunchInfo {
            command,
            env,
            working_dir: Some(game_dir),
            ..Default::default()
        })
    }

    fn play_through_client(&self, env: HashMap<String, String>) -> std::result::Result<LaunchInfo, LaunchFailure> {
        let Some(bnet) = self.get_bnet_path() else {
            return Err(LaunchFailure::path_not_found(
                self.default_prefix().join("drive_c/Program Files (x86)/Battle.net/Battle.net Launcher.exe"),
            ));
        };

        let mut config = self.get_bnet_config()?;
        selective_merge(
            &mut config,
            &client_overrides(self.runner_flag("hwaccel"), self.runner_flag("streaming")),
        );
        self.set_bnet_config(&config)?;

        let mut command = vec![self.env.executable().display().to_string(), bnet.display().to_string()];
        let game_args = option_args(&self.config, Section::Game, &self.game_options(), "args");
        if game_args.is_empty() {
            if let Some(entry) = game_entry(self.gameid()) {
                command.push(format!("battlenet://{}", entry.code));
            }
        } else {
            command.extend(game_args);
        }

        Ok(LaunchInfo {
            command,
            env,
            working_dir: Some(PATH_HOME.clone()),
            ..Default::default()
        })
    }
}

impl Runner for BattleNet {
    fn info(&self) -> &RunnerInfo {
        &self.info
    }

    fn game_options(&self) -> Vec<OptionDescriptor> {
        pure::game_options()
    }

    fn runner_options(&self) -> Vec<OptionDescriptor> {
        pure::runner_options()
    }

    fn system_options(&self) -> Vec<OptionDescriptor> {
        pure::system_options()
    }

    fn is_installed(&self) -> bool {
        if !self.env.is_wine_installed() {
            tracing::warn!(wine = %self.env.executable().display(), "wine is not installed");
            return false;
        }
        if !self.default_prefix().exists() {
            return false;
        }
        self.get_bnet_path().is_some_and(|path| path.exists())
    }

    fn install(&self, on_complete: Option<InstallCallback>) -> bool {
        if !self.env.is_wine_installed() {
            let error = Error::PrerequisiteMissing("wine".to_string());
            tracing::error!(runner = IDENTIFIER, "{error}");
            self.collab.prompt.msg("Required runner unavailable", &error.user_message());
            if let Some(callback) = on_complete {
                callback(InstallOutcome::failed(&error));
            }
            return false;
        }

        let prompt = self.collab.prompt.clone();
        let report: InstallCallback = Box::new(move |outcome| {
            if let InstallOutcome::Failed { message, .. } = &outcome {
                prompt.msg("Battle.net install failed", message);
            }
            if let Some(callback) = on_complete {
                callback(outcome);
            }
        });

        let steps = Arc::new(ClientInstall {
            env: self.env.clone(),
            supervisor: self.collab.supervisor.clone(),
            user: self.user.clone(),
        });
        match self.collab.pipeline.run(self.installer_job(), steps, None, Some(report)) {
            Ok(handle) => handle.state() != InstallState::Failed,
            Err(e) => {
                tracing::warn!(runner = IDENTIFIER, "{e}");
                self.collab.prompt.msg("Battle.net", &e.user_message());
                false
            }
        }
    }

    fn get_run_data(&self) -> RunData {
        RunData {
            command: self.launch_args(),
            env: self.env.get_env(&self.default_prefix(), self.env.default_arch()),
        }
    }

    /// Stop a client left over from an earlier session, so the game does
    /// not attach to one running with another prefix or wine.
    fn prelaunch(&self) -> bool {
        match self.shutdown() {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Failed to shut down Battle.net: {e}");
                false
            }
        }
    }

    fn play(&self) -> std::result::Result<LaunchInfo, LaunchFailure> {
        let (prefix, arch) = self.prefix_path()?;
        let env = self.env.get_env(&prefix, arch);

        let mut info = if self.runner_flag("run_without_bnet") {
            self.play_direct(&prefix, env)?
        } else {
            self.play_through_client(env)?
        };

        let schema = self.system_options();
        let exclude = option_str(&self.config, Section::System, &schema, "exclude_processes")
            .unwrap_or(DEFAULT_EXCLUDE_PROCESSES);
        info.exclude = parse_exclude_list(exclude);
        info.stop_command = Some(wineserver_kill(&self.env, &prefix, arch));
        Ok(info)
    }

    fn beat(&self, children: &[ProcessInfo]) -> Result<()> {
        if !self.runner_flag("quit_bnet_on_play") {
            return Ok(());
        }
        if let Some(entry) = game_entry(self.gameid()) {
            quit_client_when_playing(self.collab.supervisor.table(), children, entry.executable);
        }
        Ok(())
    }

    fn primary(&self) -> Option<&Primary> {
        Some(&self.game)
    }

    /// Stop the launched game, then the client.
    fn stop(&self) -> Result<ShutdownOutcome> {
        tracing::debug!("Stopping all winebattlenet processes");
        let game = self.game.stop(
            &self.collab.supervisor,
            &self.collab.app.shutdown,
            self.collab.clock.as_ref(),
        )?;
        let client = self.shutdown()?;
        Ok(match game {
            ShutdownOutcome::NotRunning => client,
            stopped => stopped,
        })
    }

    fn remove_game_data(&self, identifier: Option<&str>) -> bool {
        if !self.is_installed() && !install_dialog(self, self.collab.prompt.as_ref()) {
            return false;
        }
        let gameid = identifier.unwrap_or(self.gameid()).to_string();
        if gameid.is_empty() {
            return false;
        }

        let prefix = self.default_prefix();
        let command = vec![
            self.env.executable().display().to_string(),
            uninstaller_path(&prefix).display().to_string(),
            format!("--uid={}", gameid),
            format!("--displayname={}", get_game_name(&gameid)),
        ];
        if !self.prelaunch() {
            tracing::warn!(gameid, "Battle.net still running, uninstalling anyway");
        }

        match self.collab.supervisor.spawn(
            CommandSpec::new(command).with_env(self.env.get_env(&prefix, Arch::Win32)),
            SpawnOptions {
                runner: IDENTIFIER.to_string(),
                watch: false,
                ..Default::default()
            },
        ) {
            Ok(process) => {
                tracing::info!(gameid, pid = process.pid, "Uninstaller started");
                true
            }
            Err(e) => {
                tracing::error!(gameid, "Could not start uninstaller: {e}");
                false
            }
        }
    }
}
