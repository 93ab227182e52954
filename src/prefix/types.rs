use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Architecture of a Windows environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Arch {
    #[default]
    #[serde(rename = "win32")]
    Win32,
    #[serde(rename = "win64")]
    Win64,
}

impl Arch {
    /// Value passed to wine through `WINEARCH`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Win32 => "win32",
            Arch::Win64 => "win64",
        }
    }

    /// Parse an option value. `"auto"` and empty strings mean "runner default".
    pub fn from_option(value: &str) -> Option<Arch> {
        match value {
            "" | "auto" => None,
            other => other.parse().ok(),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win32" => Ok(Arch::Win32),
            "win64" => Ok(Arch::Win64),
            other => Err(format!("Unknown prefix architecture '{}'", other)),
        }
    }
}

/// A located prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    pub path: PathBuf,
    pub arch: Arch,
}

impl Prefix {
    pub fn new(path: PathBuf, arch: Arch) -> Self {
        Self { path, arch }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn drive_c(&self) -> PathBuf {
        self.path.join("drive_c")
    }

    pub fn user_reg(&self) -> PathBuf {
        self.path.join("user.reg")
    }
}
