/// Download location of the Battle.net client installer.
pub const BNET_INSTALLER_URL: &str =
    "https://www.battle.net/download/getInstallerForGame?os=win&version=LIVE&gameProgram=BATTLENET_APP";

pub const BNET_INSTALLER_NAME: &str = "Blizzard-Setup.exe";

/// Client helpers that outlive the installer and must not keep it "running".
pub const INSTALLER_EXCLUDE: &[&str] = &[
    "Agent.exe",
    "Battle.net.exe",
    "Battle.net Helper.exe",
    "SystemSurvey.exe",
];

/// Default of the `exclude_processes` system option for Battle.net games.
pub const DEFAULT_EXCLUDE_PROCESSES: &str = r#"Agent.exe SystemSurvey.exe "Battle.net Helper.exe""#;

/// Client processes stopped when a game runs with `quit_bnet_on_play`.
pub const CLIENT_PROCESSES: &[&str] = &["Agent.exe", "Battle.net.exe"];

pub const UNKNOWN_GAME: &str = "Unknown Game";

/// A game the adapter knows how to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameEntry {
    pub gameid: &'static str,
    pub name: &'static str,
    /// Main executable inside the game folder.
    pub executable: &'static str,
    /// Short code used in `battlenet://` URIs.
    pub code: &'static str,
}

pub const GAMELIST: &[GameEntry] = &[
    GameEntry {
        gameid: "prometheus",
        name: "Overwatch",
        executable: "Overwatch.exe",
        code: "Pro",
    },
    GameEntry {
        gameid: "prometheus_test",
        name: "Overwatch (PTR)",
        executable: "Overwatch.exe",
        code: "Pro",
    },
];

pub fn game_entry(gameid: &str) -> Option<&'static GameEntry> {
    GAMELIST.iter().find(|g| g.gameid == gameid)
}

/// Display name of `gameid`, or "Unknown Game".
pub fn get_game_name(gameid: &str) -> &'static str {
    game_entry(gameid).map(|g| g.name).unwrap_or(UNKNOWN_GAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_games() {
        assert_eq!(get_game_name("prometheus"), "Overwatch");
        assert_eq!(get_game_name("prometheus_test"), "Overwatch (PTR)");
        assert_eq!(get_game_name("wow"), UNKNOWN_GAME);
        assert_eq!(game_entry("prometheus").unwrap().code, "Pro");
    }
}
