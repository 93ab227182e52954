use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::{BIN_WINETRICKS, wine_sibling};
use crate::prefix::{Arch, Provisioner};

/// Wine's own helper processes. They linger in every prefix and never mean
/// the program is still doing work.
pub const WINE_SYSTEM_PROCESSES: &[&str] = &[
    "wineserver",
    "services.exe",
    "winedevice.exe",
    "plugplay.exe",
    "explorer.exe",
    "rpcss.exe",
    "tabtip.exe",
    "wineboot.exe",
    "rundll32.exe",
    "iexplore.exe",
    "winemenubuilder",
    "conhost.exe",
    "svchost.exe",
    "start.exe",
    "winecfg.exe",
    "wdfmgr.exe",
    "wineconsole",
    "winedbg",
];

/// A wine binary plus the default prefixes of one runner.
pub struct WineEnv {
    wine: PathBuf,
    winetricks: PathBuf,
    kind: String,
    default_arch: Arch,
    provisioner: Provisioner,
}

impl WineEnv {
    pub fn new(wine: PathBuf, kind: &str, default_arch: Arch, provisioner: Provisioner) -> Self {
        Self {
            wine,
            winetricks: BIN_WINETRICKS.clone(),
            kind: kind.to_string(),
            default_arch,
            provisioner,
        }
    }

    pub fn with_winetricks(mut self, winetricks: PathBuf) -> Self {
        self.winetricks = winetricks;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.wine
    }

    pub fn winetricks(&self) -> &Path {
        &self.winetricks
    }

    pub fn wineserver(&self) -> PathBuf {
        wine_sibling(&self.wine, "wineserver")
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn default_arch(&self) -> Arch {
        self.default_arch
    }

    pub fn is_wine_installed(&self) -> bool {
        self.wine.is_file()
    }

    pub fn default_prefix(&self, arch: Option<Arch>) -> PathBuf {
        self.provisioner
            .resolve_path(&self.kind, arch.unwrap_or(self.default_arch))
    }

    /// Default prefix for `arch`, created on first use.
    pub fn ensure_prefix(&self, arch: Option<Arch>) -> crate::Result<PathBuf> {
        self.provisioner
            .ensure(&self.kind, arch.unwrap_or(self.default_arch))
    }

    /// Variables every wine invocation for `prefix` needs.
    pub fn get_env(&self, prefix: &Path, arch: Arch) -> HashMap<String, String> {
        HashMap::from([
            ("WINEPREFIX".to_string(), prefix.display().to_string()),
            ("WINEARCH".to_string(), arch.as_str().to_string()),
            ("WINEDEBUG".to_string(), "-all".to_string()),
            ("WINE".to_string(), self.wine.display().to_string()),
        ])
    }
}

/// How to run a Windows program.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Process names never counted as the program, on top of wine's own.
    pub exclude: Vec<String>,
    pub watch: bool,
    pub env: HashMap<String, String>,
}
