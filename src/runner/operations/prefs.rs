//! Startup preferences of optional capabilities

use crate::config::SettingsStore;
use crate::error::Result;

const SYNC_AT_STARTUP: &str = "sync_at_startup";

/// Whether the library of `runner` should be synced when the host starts.
pub fn sync_at_startup(settings: &dyn SettingsStore, runner: &str) -> bool {
    settings
        .read(SYNC_AT_STARTUP, runner)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

pub fn set_sync_at_startup(settings: &dyn SettingsStore, runner: &str, enabled: bool) -> Result<()> {
    let value = if enabled { "True" } else { "False" };
    settings.write(SYNC_AT_STARTUP, value, runner)
}
