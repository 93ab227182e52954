use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::OptionValue;
use crate::error::{Error, ErrorKind};
use crate::process::CommandSpec;

/// Static description of a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerInfo {
    /// Stable identifier, used for directories, locks and settings scopes.
    pub identifier: String,
    pub name: String,
    pub description: String,
    pub platforms: Vec<String>,
    /// Whether the runner can be started without a game.
    pub runnable_alone: bool,
}

/// Editor widget an option is shown with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionKind {
    Boolean,
    /// `(label, value)` pairs.
    Choice(Vec<(String, String)>),
    String,
    Path,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    pub key: String,
    pub label: String,
    pub kind: OptionKind,
    pub default: Option<OptionValue>,
    pub help: Option<String>,
}

impl OptionDescriptor {
    fn new(key: &str, label: &str, kind: OptionKind, default: Option<OptionValue>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            default,
            help: None,
        }
    }

    pub fn boolean(key: &str, label: &str, default: bool) -> Self {
        Self::new(key, label, OptionKind::Boolean, Some(default.into()))
    }

    pub fn choice(key: &str, label: &str, choices: &[(&str, &str)], default: Option<&str>) -> Self {
        let choices = choices
            .iter()
            .map(|(l, v)| (l.to_string(), v.to_string()))
            .collect();
        Self::new(key, label, OptionKind::Choice(choices), default.map(Into::into))
    }

    pub fn string(key: &str, label: &str, default: Option<&str>) -> Self {
        Self::new(key, label, OptionKind::String, default.map(Into::into))
    }

    pub fn path(key: &str, label: &str) -> Self {
        Self::new(key, label, OptionKind::Path, None)
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }
}

/// Optional features a runner may offer beyond launching games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Can import the user's game library.
    pub sync: bool,
    /// Can sign in to a remote account.
    pub connect: bool,
}

/// Command and environment to start a runner or game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunData {
    pub command: Vec<String>,
    pub env: HashMap<String, String>,
}

/// What the host needs to start a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LaunchInfo {
    pub command: Vec<String>,
    pub env: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    /// Process names that never count as the game itself.
    #[serde(skip)]
    pub exclude: Vec<String>,
    /// Command asking the game's process tree to exit.
    #[serde(skip)]
    pub stop_command: Option<CommandSpec>,
}

/// Structured reason a launch did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchFailure {
    pub error: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LaunchFailure {
    pub fn path_not_found(file: PathBuf) -> Self {
        Self {
            error: ErrorKind::PathNotFound,
            file: Some(file),
            detail: None,
        }
    }
}

impl From<Error> for LaunchFailure {
    fn from(error: Error) -> Self {
        match error {
            Error::PathNotFound(file) => LaunchFailure::path_not_found(file),
            other => LaunchFailure {
                error: other.kind(),
                file: None,
                detail: Some(other.user_message()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_serializes_with_file() {
        let failure = LaunchFailure::from(Error::PathNotFound(PathBuf::from("/pfx/drive_c/Game")));
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": "PathNotFound", "file": "/pfx/drive_c/Game"})
        );
    }

    #[test]
    fn other_errors_carry_detail() {
        let failure = LaunchFailure::from(Error::PrerequisiteMissing("wine".into()));
        assert_eq!(failure.error, ErrorKind::PrerequisiteMissing);
        assert!(failure.file.is_none());
        assert!(failure.detail.unwrap().contains("wine"));
    }
}
