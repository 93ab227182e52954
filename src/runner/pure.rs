//! Pure runner helpers (no I/O)

pub mod arch;
pub mod options;
pub mod versions;

pub use arch::{api_arch, host_machine, tarball_arch};
pub use options::{default_system_options, option_args, option_bool, option_str, option_value};
pub use versions::{RunnerVersion, RunnerVersions, pick_version_url};
