//! Pure Battle.net helpers (no I/O)

pub mod merge;
pub mod options;
pub mod regkeys;

pub use merge::{client_overrides, default_client_config, selective_merge};
pub use options::{game_options, runner_options, system_options};
pub use regkeys::client_registry_keys;
