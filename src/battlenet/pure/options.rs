// Option schema of the Battle.net runner

use crate::battlenet::types::{DEFAULT_EXCLUDE_PROCESSES, GAMELIST};
use crate::runner::OptionDescriptor;
use crate::runner::pure::default_system_options;

pub fn game_options() -> Vec<OptionDescriptor> {
    let games: Vec<(&str, &str)> = GAMELIST.iter().map(|g| (g.name, g.gameid)).collect();
    vec![
        OptionDescriptor::choice("gameid", "Game", &games, None),
        OptionDescriptor::path("prefix", "Prefix").with_help(
            "The prefix (also named \"bottle\") used by Wine.\n\
             It's a directory containing a set of files and folders making up a confined \
             Windows environment.",
        ),
        OptionDescriptor::choice(
            "arch",
            "Prefix architecture",
            &[("Auto", "auto"), ("32-bit", "win32"), ("64-bit", "win64")],
            Some("auto"),
        )
        .with_help(
            "The architecture of the Windows environment.\n\
             32-bit is recommended unless running a 64-bit only game.",
        ),
        OptionDescriptor::string("args", "Arguments", None)
            .with_help("Command line arguments passed to the game or to Battle.net."),
    ]
}

pub fn runner_options() -> Vec<OptionDescriptor> {
    vec![
        OptionDescriptor::boolean("quit_bnet_on_play", "Stop Battle.net when a game is launched", false)
            .with_help("Shut down Battle.net and kill Agent.exe when a game is launched."),
        OptionDescriptor::boolean("run_without_bnet", "Run without Battle.net (if possible)", false)
            .with_help("This attempts to launch the game directly, without Battle.net"),
        OptionDescriptor::boolean("hwaccel", "Enable hardware acceleration in Battle.net client", false),
        OptionDescriptor::boolean("streaming", "Enable streaming in Battle.net client", false),
        OptionDescriptor::string("args", "Wine arguments", None)
            .with_help("Arguments placed between wine and the game executable."),
    ]
}

/// System options with the Battle.net helpers excluded from liveness checks.
pub fn system_options() -> Vec<OptionDescriptor> {
    default_system_options()
        .into_iter()
        .map(|option| {
            if option.key == "exclude_processes" {
                let help = option.help.clone().unwrap_or_default();
                OptionDescriptor::string(&option.key, &option.label, Some(DEFAULT_EXCLUDE_PROCESSES))
                    .with_help(&help)
            } else {
                option
            }
        })
        .collect()
}
