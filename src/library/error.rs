//! Error taxonomy shared by every library operation.

use std::path::PathBuf;
use thiserror::Error;

/// Environment-level failures of a library operation.
///
/// A non-zero exit of `beet` is not an error: it is reported through
/// [`super::CommandResult::success`].
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Beets library database not found at {0:?}")]
    StoreNotFound(PathBuf),

    #[error("Remote host {host}:{port} is unreachable: {reason}")]
    RemoteUnreachable {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Authentication failed for {username}@{host}")]
    AuthenticationFailed { username: String, host: String },

    #[error("Host key for {host} rejected: {reason}")]
    HostKeyRejected { host: String, reason: String },

    #[error("Remote library data unavailable: {0}")]
    RemoteDataUnavailable(String),

    #[error("Invalid mode '{0}', expected 'local' or 'remote'")]
    InvalidMode(String),

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Path does not exist: {0}")]
    PathNotFound(String),

    #[error("Invalid command line: {0}")]
    InvalidCommand(String),

    #[error("Invalid beets configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not run {binary}: {reason}")]
    ToolUnavailable { binary: String, reason: String },

    #[error("Remote command failed: {0}")]
    RemoteCommand(String),

    #[error("Library query failed: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Stable tag exposed to API callers next to the human readable message.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::StoreNotFound(_) => "StoreNotFound",
            BridgeError::RemoteUnreachable { .. } => "RemoteUnreachable",
            BridgeError::AuthenticationFailed { .. } => "AuthenticationFailed",
            BridgeError::HostKeyRejected { .. } => "HostKeyRejected",
            BridgeError::RemoteDataUnavailable(_) => "RemoteDataUnavailable",
            BridgeError::InvalidMode(_) => "InvalidMode",
            BridgeError::MissingRequiredField(_) => "MissingRequiredField",
            BridgeError::NotImplemented(_) => "NotImplemented",
            BridgeError::PathNotFound(_) => "PathNotFound",
            BridgeError::InvalidCommand(_) => "InvalidCommand",
            BridgeError::InvalidConfig(_) => "InvalidConfig",
            BridgeError::ToolUnavailable { .. } => "ToolUnavailable",
            BridgeError::RemoteCommand(_) => "RemoteCommand",
            BridgeError::Store(_) => "StoreError",
            BridgeError::Io(_) => "IoError",
        }
    }

    /// True for the failures caused by the caller's input rather than the environment.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            BridgeError::InvalidMode(_)
                | BridgeError::MissingRequiredField(_)
                | BridgeError::PathNotFound(_)
                | BridgeError::InvalidCommand(_)
                | BridgeError::InvalidConfig(_)
        )
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
