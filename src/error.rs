//! Error taxonomy shared by every module.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Could not create environment at {}: {reason}", path.display())]
    EnvironmentCreationFailed { path: PathBuf, reason: String },

    #[error("Malformed record at offset {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: String },

    #[error("Truncated record at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedRecord {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Failed to spawn {program}: {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process {pid} still alive after {attempts} shutdown attempts")]
    ShutdownTimeout { pid: u32, attempts: u32 },

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("{0} is not available for your platform")]
    UnsupportedPlatform(String),

    #[error("Required runner {0} is not installed")]
    PrerequisiteMissing(String),

    #[error("Process handle {0} is no longer valid")]
    InvalidHandle(u32),

    #[error("An install is already running for {0}")]
    InstallInProgress(String),

    #[error("{runner} is already running as process {pid}")]
    AlreadyRunning { runner: String, pid: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Copyable discriminant so callers can pick a message without matching payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Download,
    EnvironmentCreationFailed,
    MalformedRecord,
    TruncatedRecord,
    ProcessSpawn,
    ShutdownTimeout,
    PathNotFound,
    UnsupportedPlatform,
    PrerequisiteMissing,
    InvalidHandle,
    InstallInProgress,
    AlreadyRunning,
    Config,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Download { .. } | Error::Http(_) => ErrorKind::Download,
            Error::EnvironmentCreationFailed { .. } => ErrorKind::EnvironmentCreationFailed,
            Error::MalformedRecord { .. } => ErrorKind::MalformedRecord,
            Error::TruncatedRecord { .. } => ErrorKind::TruncatedRecord,
            Error::ProcessSpawn { .. } => ErrorKind::ProcessSpawn,
            Error::ShutdownTimeout { .. } => ErrorKind::ShutdownTimeout,
            Error::PathNotFound(_) => ErrorKind::PathNotFound,
            Error::UnsupportedPlatform(_) => ErrorKind::UnsupportedPlatform,
            Error::PrerequisiteMissing(_) => ErrorKind::PrerequisiteMissing,
            Error::InvalidHandle(_) => ErrorKind::InvalidHandle,
            Error::InstallInProgress(_) => ErrorKind::InstallInProgress,
            Error::AlreadyRunning { .. } => ErrorKind::AlreadyRunning,
            Error::Config(_) | Error::Json(_) | Error::Yaml(_) => ErrorKind::Config,
            Error::Io(_) | Error::Zip(_) => ErrorKind::Io,
        }
    }

    /// Text shown to the user. Platform and prerequisite problems carry the
    /// corrective action instead of a generic failure.
    pub fn user_message(&self) -> String {
        match self {
            Error::UnsupportedPlatform(what) => format!(
                "{} is not available for your platform.\nTry a different prefix architecture.",
                what
            ),
            Error::PrerequisiteMissing(what) => format!(
                "The required runner {} is not installed.\nInstall it before continuing.",
                what
            ),
            Error::ShutdownTimeout { pid, .. } => format!(
                "Process {} did not shut down. You may need to kill it manually.",
                pid
            ),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_from_variants() {
        let err = Error::PathNotFound(PathBuf::from("/nope"));
        assert_eq!(err.kind(), ErrorKind::PathNotFound);

        let err = Error::TruncatedRecord {
            offset: 3,
            needed: 4,
            available: 1,
        };
        assert_eq!(err.kind(), ErrorKind::TruncatedRecord);
    }

    #[test]
    fn platform_and_prerequisite_messages_differ() {
        let platform = Error::UnsupportedPlatform("Wine".to_string()).user_message();
        let missing = Error::PrerequisiteMissing("wine".to_string()).user_message();
        assert!(platform.contains("not available for your platform"));
        assert!(missing.contains("is not installed"));
        assert_ne!(platform, missing);
    }
}
