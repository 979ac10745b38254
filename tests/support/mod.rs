// ABOUTME: Test support utilities.
// ABOUTME: Scripted mock transport and fixture builders for pipeline tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use slipway::logging::RunLog;
use slipway::transport::{CommandOutput, RemoteCommand, Result, Transport};
use slipway::types::{DeploymentTarget, ReleaseDescriptor};
use std::path::{Path, PathBuf};

/// Scripted transport. Responses are matched by substring of the rendered
/// command line, first match wins; unmatched commands succeed with empty
/// output. Everything executed is recorded in order.
pub struct MockTransport {
    rules: Vec<(String, CommandOutput)>,
    executed: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Script a response for commands whose rendered line contains `needle`.
    pub fn respond(mut self, needle: &str, output: CommandOutput) -> Self {
        self.rules.push((needle.to_string(), output));
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }

    /// Index of the first executed line containing `needle`.
    pub fn index_of(&self, needle: &str) -> Option<usize> {
        self.executed().iter().position(|line| line.contains(needle))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn exec(&self, command: &RemoteCommand) -> Result<CommandOutput> {
        let line = command.render();
        self.executed.lock().push(line.clone());
        for (needle, output) in &self.rules {
            if line.contains(needle.as_str()) {
                return Ok(output.clone());
            }
        }
        Ok(ok())
    }

    async fn copy_tree(&self, local: &Path, remote: &str) -> Result<()> {
        self.executed
            .lock()
            .push(format!("copy_tree {} {}", local.display(), remote));
        Ok(())
    }

    async fn write_file(&self, remote: &str, contents: &[u8]) -> Result<()> {
        self.executed.lock().push(format!(
            "write_file {} ({} bytes)",
            remote,
            contents.len()
        ));
        Ok(())
    }
}

#[allow(dead_code)]
pub fn ok() -> CommandOutput {
    output(0, "", "")
}

#[allow(dead_code)]
pub fn output(exit_code: u32, stdout: &str, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

/// Run log writing into a temp dir; keep the guard alive for the test.
#[allow(dead_code)]
pub fn test_log() -> (tempfile::TempDir, RunLog) {
    let dir = tempfile::tempdir().unwrap();
    let log = RunLog::create(dir.path()).unwrap();
    (dir, log)
}

#[allow(dead_code)]
pub fn target() -> DeploymentTarget {
    DeploymentTarget {
        host: "app.example.com".to_string(),
        user: "deploy".to_string(),
        key_path: PathBuf::from("/tmp/id_ed25519"),
        port: 8080,
    }
}

#[allow(dead_code)]
pub fn descriptor(name: &str) -> ReleaseDescriptor {
    ReleaseDescriptor::derive(
        &format!("https://example.com/acme/{name}.git"),
        "main",
        Path::new("/tmp/slipway-tests"),
    )
    .unwrap()
}
