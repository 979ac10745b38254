// ABOUTME: Local command execution for the source stage.
// ABOUTME: Wraps tokio::process with captured output.

use super::command::CommandOutput;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Run a local command and capture its output. Spawn failures (missing
/// binary, bad cwd) surface as I/O errors; non-zero exits are reported
/// through `CommandOutput` for the caller to interpret.
pub async fn run(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
) -> std::io::Result<CommandOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    tracing::debug!(command = ?cmd, "running local command");

    let output = cmd.output().await?;

    Ok(CommandOutput {
        exit_code: output.status.code().map(|c| c as u32).unwrap_or(1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}
