pub mod io;
pub mod store;

pub use io::{
    load_cfg, load_cfg_from, load_game_config, load_game_config_from, save_cfg, save_cfg_to,
    save_game_config, save_game_config_to,
};
pub use store::{JsonSettingsStore, SettingsStore};
