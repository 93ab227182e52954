use crate::config::types::{AppConfig, GameConfig};
use crate::error::Result;
use crate::paths::{PATH_DATA, PATH_GAMES};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn load_cfg() -> AppConfig {
    load_cfg_from(&PATH_DATA.join("settings.json"))
}

/// Load settings from `path`, falling back to defaults when the file is
/// missing or unreadable.
pub fn load_cfg_from(path: &Path) -> AppConfig {
    if let Ok(file) = File::open(path) {
        match serde_json::from_reader::<_, AppConfig>(BufReader::new(file)) {
            Ok(config) => return config,
            Err(e) => tracing::warn!(path = %path.display(), "Ignoring unreadable settings: {e}"),
        }
    }

    AppConfig::default()
}

pub fn save_cfg(config: &AppConfig) -> Result<()> {
    save_cfg_to(&PATH_DATA.join("settings.json"), config)
}

pub fn save_cfg_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, config)?;
    Ok(())
}

/// Per-game configuration for `slug`. A missing file is an empty config.
pub fn load_game_config(slug: &str) -> Result<GameConfig> {
    load_game_config_from(&PATH_GAMES.join(format!("{}.yaml", slug)))
}

pub fn load_game_config_from(path: &Path) -> Result<GameConfig> {
    if !path.exists() {
        return Ok(GameConfig::default());
    }
    let file = File::open(path)?;
    Ok(serde_yaml::from_reader(BufReader::new(file))?)
}

pub fn save_game_config(slug: &str, config: &GameConfig) -> Result<()> {
    save_game_config_to(&PATH_GAMES.join(format!("{}.yaml", slug)), config)
}

pub fn save_game_config_to(path: &Path, config: &GameConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_yaml::to_writer(file, config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::Section;

    #[test]
    fn corrupt_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_cfg_from(&path), AppConfig::default());
    }

    #[test]
    fn settings_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");
        let config = AppConfig {
            heartbeat_ms: 500,
            ..Default::default()
        };
        save_cfg_to(&path, &config).unwrap();
        assert_eq!(load_cfg_from(&path), config);
    }

    #[test]
    fn game_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games/overwatch.yaml");
        assert_eq!(load_game_config_from(&path).unwrap(), GameConfig::default());

        let mut config = GameConfig::default();
        config.set(Section::Game, "gameid", "prometheus");
        save_game_config_to(&path, &config).unwrap();
        assert_eq!(load_game_config_from(&path).unwrap(), config);
    }
}
