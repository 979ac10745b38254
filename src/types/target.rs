// ABOUTME: The remote host a release is deployed to.
// ABOUTME: Constructed once from operator input, read-only afterwards.

use std::path::PathBuf;

/// Deployment target, immutable for the run.
#[derive(Debug, Clone)]
pub struct DeploymentTarget {
    /// Public address of the host; also the nginx server identity.
    pub host: String,
    /// SSH user the pipeline operates as.
    pub user: String,
    /// Private key used for every remote operation. No password fallback.
    pub key_path: PathBuf,
    /// Port the application listens on; bound to loopback only.
    pub port: u16,
}

impl DeploymentTarget {
    /// Privileged remote commands are prefixed with sudo unless the
    /// operating user is root.
    pub fn needs_sudo(&self) -> bool {
        self.user != "root"
    }
}
