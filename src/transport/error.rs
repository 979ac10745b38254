// ABOUTME: Transport-specific error types.
// ABOUTME: Covers connectivity, authentication, execution, and upload failures.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("host {host} unreachable: {reason}")]
    Unreachable { host: String, reason: String },

    #[error("authentication failed for {user}@{host}")]
    AuthenticationFailed { user: String, host: String },

    #[error("failed to load key from {path}: {reason}")]
    KeyLoadFailed { path: PathBuf, reason: String },

    #[error("command execution failed: {0}")]
    CommandFailed(String),

    #[error("command timed out after {0:?}")]
    CommandTimeout(Duration),

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed,

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
