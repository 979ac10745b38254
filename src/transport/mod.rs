// ABOUTME: Command transport for the deployment pipeline.
// ABOUTME: Remote execution over SSH, local execution, and the Transport trait.

mod command;
mod error;
pub mod local;
mod session;

pub use command::{CommandOutput, RemoteCommand, shell_quote};
pub use error::{Error, Result};
pub use session::{Session, SessionConfig};

use async_trait::async_trait;
use std::path::Path;

/// Remote operations every pipeline stage runs through. Implemented by
/// [`Session`]; tests substitute a scripted mock. Transport does not retry;
/// retry policy, where it exists, belongs to callers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a command on the remote host. Each call is its own round
    /// trip; a non-zero exit is a normal `CommandOutput`, not an `Err`.
    async fn exec(&self, command: &RemoteCommand) -> Result<CommandOutput>;

    /// Copy a local directory tree to a remote path, overwriting content.
    async fn copy_tree(&self, local: &Path, remote: &str) -> Result<()>;

    /// Write bytes to a remote file.
    async fn write_file(&self, remote: &str, contents: &[u8]) -> Result<()>;

    /// Check whether a remote path exists.
    async fn file_exists(&self, path: &str) -> Result<bool> {
        let output = self
            .exec(&RemoteCommand::new("test").arg("-e").arg(path))
            .await?;
        Ok(output.success())
    }
}
