use std::process::ExitCode;
use std::sync::Arc;
use std::sync::mpsc;

use tracing_subscriber::EnvFilter;

use winerunner::battlenet::{self, BattleNet};
use winerunner::config::{JsonSettingsStore, load_cfg, load_game_config};
use winerunner::install::{HttpDownloader, InstallOutcome, ZipExtractor};
use winerunner::paths::PATH_DATA;
use winerunner::process::{HeartbeatExit, Supervisor, SystemClock, ThreadScheduler};
use winerunner::runner::operations::run_alone;
use winerunner::runner::{Collaborators, CollaboratorsBuilder, Runner, RunnerDirs, RunnerRegistry, launch};
use winerunner::ui::{AutoPrompt, DialogPrompt, Prompt};

fn arg_value(args: &[String], flag: &str) -> Option<Option<String>> {
    let index = args.iter().position(|arg| arg == flag)?;
    Some(args.get(index + 1).filter(|v| !v.starts_with("--")).cloned())
}

fn collaborators(prompt: Arc<dyn Prompt>) -> Collaborators {
    CollaboratorsBuilder {
        app: load_cfg(),
        dirs: RunnerDirs::default(),
        supervisor: Supervisor::system(),
        scheduler: Arc::new(ThreadScheduler),
        downloader: Arc::new(HttpDownloader::default()),
        extractor: Arc::new(ZipExtractor),
        prompt,
        settings: Arc::new(JsonSettingsStore::open(PATH_DATA.join("preferences.json"))),
        clock: Arc::new(SystemClock),
    }
    .build()
}

fn registry(collab: &Collaborators) -> RunnerRegistry {
    let mut registry = RunnerRegistry::new();
    let collab = collab.clone();
    registry.register(
        battlenet::IDENTIFIER,
        Box::new(move |config| Arc::new(BattleNet::system(collab.clone(), config))),
    );
    registry
}

fn game_runner(registry: &RunnerRegistry, gameid: Option<&str>) -> winerunner::Result<Arc<dyn Runner>> {
    let mut config = match gameid {
        Some(gameid) => load_game_config(gameid)?,
        None => Default::default(),
    };
    if let Some(gameid) = gameid
        && config.game.get("gameid").is_none()
    {
        config.game.insert("gameid".to_string(), gameid.into());
    }
    registry.create(battlenet::IDENTIFIER, &config)
}

fn install(runner: &dyn Runner) -> ExitCode {
    let (tx, rx) = mpsc::channel();
    if !runner.install(Some(Box::new(move |outcome| {
        let _ = tx.send(outcome);
    }))) {
        return ExitCode::FAILURE;
    }
    match rx.recv() {
        Ok(InstallOutcome::Done) => {
            println!("[winerunner] Battle.net installed");
            ExitCode::SUCCESS
        }
        Ok(InstallOutcome::Failed { message, .. }) => {
            eprintln!("[winerunner] Install failed: {}", message);
            ExitCode::FAILURE
        }
        Err(_) => ExitCode::FAILURE,
    }
}

fn play(runner: Arc<dyn Runner>, collab: &Collaborators) -> ExitCode {
    let (tx, rx) = mpsc::channel();
    let session = match launch(runner, collab, Box::new(move |exit| {
        let _ = tx.send(exit);
    })) {
        Ok(session) => session,
        Err(failure) => {
            match serde_json::to_string(&failure) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("[winerunner] Launch failed: {:?}", failure),
            }
            return ExitCode::FAILURE;
        }
    };

    println!("[winerunner] Game running (pid {})", session.pid);
    match rx.recv() {
        Ok(HeartbeatExit::Finished(process)) => {
            println!("[winerunner] Game exited ({:?})", process.exit_code());
            ExitCode::SUCCESS
        }
        Ok(HeartbeatExit::Failed { pid, error }) => {
            eprintln!("[winerunner] Lost track of pid {}: {}", pid, error);
            ExitCode::FAILURE
        }
        Err(_) => ExitCode::FAILURE,
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("winerunner=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help") || args.len() < 2 {
        println!("{}", USAGE_TEXT);
        return ExitCode::SUCCESS;
    }

    let prompt: Arc<dyn Prompt> = if args.iter().any(|arg| arg == "--yes") {
        Arc::new(AutoPrompt { answer: true })
    } else {
        Arc::new(DialogPrompt)
    };
    let collab = collaborators(prompt);
    let registry = registry(&collab);

    for id in registry.startup_syncs(collab.settings.as_ref()) {
        tracing::info!(runner = id, "Library sync at startup is enabled");
    }

    let play_id = arg_value(&args, "--play");
    let uninstall_id = arg_value(&args, "--uninstall");
    if matches!(play_id, Some(None)) || matches!(uninstall_id, Some(None)) {
        eprintln!("{}", USAGE_TEXT);
        return ExitCode::FAILURE;
    }
    let gameid = play_id.clone().or(uninstall_id.clone()).flatten();

    let runner = match game_runner(&registry, gameid.as_deref()) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("[winerunner] {}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    if args.iter().any(|arg| arg == "--install") {
        return install(runner.as_ref());
    }

    if args.iter().any(|arg| arg == "--stop") {
        return match runner.stop() {
            Ok(outcome) => {
                println!("[winerunner] {:?}", outcome);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("[winerunner] {}", e.user_message());
                ExitCode::FAILURE
            }
        };
    }

    if args.iter().any(|arg| arg == "--games") {
        let config = registry.default_config(battlenet::IDENTIFIER).unwrap_or_default();
        let bnet = BattleNet::system(collab.clone(), config);
        for gameid in bnet.get_gameid_list() {
            let path = bnet.get_game_path_from_gameid(&gameid).unwrap_or_default();
            println!("{:<20} {:<24} {}", gameid, battlenet::get_game_name(&gameid), path);
        }
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|arg| arg == "--run") {
        return match run_alone(runner.as_ref(), &collab, collab.app.disable_runtime) {
            Ok(Some(process)) => {
                println!("[winerunner] Battle.net started (pid {})", process.pid);
                ExitCode::SUCCESS
            }
            Ok(None) => ExitCode::FAILURE,
            Err(e) => {
                eprintln!("[winerunner] {}", e.user_message());
                ExitCode::FAILURE
            }
        };
    }

    if let Some(Some(gameid)) = uninstall_id {
        return if runner.remove_game_data(Some(&gameid)) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    if play_id.is_some() {
        return play(runner, &collab);
    }

    eprintln!("{}", USAGE_TEXT);
    ExitCode::FAILURE
}

static USAGE_TEXT: &str = r#"
Usage: winerunner [OPTIONS]

Options:
    --install             Install the Battle.net client into its wine prefixes
    --play <gameid>       Launch a game (e.g. prometheus) and wait for it to exit
    --stop                Shut down Battle.net, killing it if it does not exit
    --games               List the games Battle.net has installed
    --uninstall <gameid>  Remove a game through the Blizzard uninstaller
    --run                 Start the Battle.net client on its own
    --yes                 Answer every question with yes instead of showing dialogs
    --help                Show this text
"#;
