//! Operations module (atomic side effects)

pub mod alone;
pub mod api;
pub mod archive;
pub mod prefs;
pub mod runtime;

pub use alone::{INSTALL_QUESTION, install_dialog, run_alone};
pub use api::{RUNNER_API_URL, fetch_runner_versions};
pub use archive::download_and_extract;
pub use prefs::{set_sync_at_startup, sync_at_startup};
pub use runtime::runtime_env;
