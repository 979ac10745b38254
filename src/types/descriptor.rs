// ABOUTME: Release descriptor tying repository, working copy, and remote path together.
// ABOUTME: All paths derive deterministically from the release name.

use super::release_name::{ReleaseName, ReleaseNameError};
use std::path::{Path, PathBuf};

/// Fixed remote root under which every release gets its own directory.
pub const REMOTE_DEPLOY_ROOT: &str = "/opt/deployments";

/// Everything needed to locate a release locally and remotely.
/// Constructed once before the pipeline starts, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ReleaseDescriptor {
    pub repo_url: String,
    pub branch: String,
    pub name: ReleaseName,
    /// Local working copy, kept between runs so re-deploys fast-forward
    /// instead of re-cloning.
    pub local_path: PathBuf,
    /// Remote deployment directory, namespaced by release name.
    pub remote_path: String,
}

impl ReleaseDescriptor {
    pub fn derive(
        repo_url: &str,
        branch: &str,
        workspace: &Path,
    ) -> Result<Self, ReleaseNameError> {
        let name = ReleaseName::from_repo_url(repo_url)?;
        let local_path = workspace.join(name.as_str());
        let remote_path = format!("{REMOTE_DEPLOY_ROOT}/{name}");
        Ok(Self {
            repo_url: repo_url.to_string(),
            branch: branch.to_string(),
            name,
            local_path,
            remote_path,
        })
    }
}
