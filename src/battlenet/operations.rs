//! Operations module (atomic side effects)

pub mod client;
pub mod client_config;
pub mod locate;

pub use client::{client_process, kill_client, quit_client_when_playing};
pub use client_config::{client_config_path, read_client_config, write_client_config};
pub use locate::{find_launcher, product_db_path, uninstaller_path};
