// ABOUTME: Local source stage: clone or fast-forward the working copy.
// ABOUTME: Decides the deployment mode from the descriptors present.

use crate::logging::RunLog;
use crate::transport::local;
use crate::types::{Credential, DeploymentMode, ReleaseDescriptor};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source sync failed: {0}")]
    Sync(String),

    #[error("no deployment descriptor (compose file or Dockerfile) in {0}")]
    NoDescriptor(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What [`obtain`] will do with the local path. An existing working copy is
/// never re-cloned; it is switched and fast-forwarded in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePlan {
    Clone,
    Update,
}

pub fn plan(local_path: &Path) -> SourcePlan {
    if local_path.join(".git").exists() {
        SourcePlan::Update
    } else {
        SourcePlan::Clone
    }
}

/// Materialize the working copy at the requested branch, then compute the
/// deployment mode. Entirely local; nothing here touches the target host.
pub async fn obtain(
    release: &ReleaseDescriptor,
    credential: &Credential,
    log: &RunLog,
) -> Result<DeploymentMode, SourceError> {
    match plan(&release.local_path) {
        SourcePlan::Update => update(release, log).await?,
        SourcePlan::Clone => clone(release, credential, log).await?,
    }

    DeploymentMode::detect(&release.local_path)
        .ok_or_else(|| SourceError::NoDescriptor(release.local_path.clone()))
}

async fn update(release: &ReleaseDescriptor, log: &RunLog) -> Result<(), SourceError> {
    log.info(&format!(
        "updating working copy at {}",
        release.local_path.display()
    ));
    git(
        &["checkout", release.branch.as_str()],
        Some(&release.local_path),
    )
    .await?;
    git(
        &["pull", "--ff-only", "origin", release.branch.as_str()],
        Some(&release.local_path),
    )
    .await
}

async fn clone(
    release: &ReleaseDescriptor,
    credential: &Credential,
    log: &RunLog,
) -> Result<(), SourceError> {
    if let Some(parent) = release.local_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    log.info(&format!(
        "cloning {}",
        Credential::redacted_url(&release.repo_url)
    ));

    let url = credential.authenticated_url(&release.repo_url);
    let dest = release.local_path.display().to_string();
    git(
        &[
            "clone",
            "--branch",
            release.branch.as_str(),
            url.as_str(),
            dest.as_str(),
        ],
        None,
    )
    .await
    // git echoes the clone URL into its error output; keep the credential
    // out of anything we may log or display.
    .map_err(|e| match e {
        SourceError::Sync(message) => {
            SourceError::Sync(message.replace(credential.expose(), "***"))
        }
        other => other,
    })
}

async fn git(args: &[&str], cwd: Option<&Path>) -> Result<(), SourceError> {
    let output = local::run("git", args, cwd).await?;
    if !output.success() {
        return Err(SourceError::Sync(output.stderr.trim().to_string()));
    }
    Ok(())
}
