pub mod operations;
pub mod types;

// Re-export types
pub use types::{AppConfig, GameConfig, OptionValue, Section};

// Re-export operations
pub use operations::{
    JsonSettingsStore, SettingsStore, load_cfg, load_cfg_from, load_game_config,
    load_game_config_from, save_cfg, save_cfg_to, save_game_config, save_game_config_to,
};

/// Whether the bundled runtime should be used. `WINERUNNER_RUNTIME=0` or
/// `off` disables it regardless of the configured flag.
pub fn use_runtime(disable_runtime: bool) -> bool {
    use_runtime_with(disable_runtime, std::env::var("WINERUNNER_RUNTIME").ok().as_deref())
}

fn use_runtime_with(disable_runtime: bool, env_value: Option<&str>) -> bool {
    let env_off = env_value.is_some_and(|v| matches!(v.to_lowercase().as_str(), "0" | "off"));
    !(disable_runtime || env_off)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_switches() {
        assert!(use_runtime_with(false, None));
        assert!(!use_runtime_with(true, None));
        assert!(!use_runtime_with(false, Some("OFF")));
        assert!(!use_runtime_with(false, Some("0")));
        assert!(use_runtime_with(false, Some("1")));
    }
}
