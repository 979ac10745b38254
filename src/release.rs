// ABOUTME: Release deployer: stop old, transfer, build, start, confirm.
// ABOUTME: Stage order is load-bearing; stopping the old instance comes first.

use crate::logging::RunLog;
use crate::transport::{self, RemoteCommand, Transport};
use crate::types::{DeploymentMode, DeploymentTarget, ReleaseDescriptor, ReleaseName};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("working copy transfer failed: {0}")]
    Transfer(String),

    #[error("image build failed: {0}")]
    Build(String),

    #[error("instance failed to start: {0}")]
    Startup(String),

    #[error(transparent)]
    Transport(#[from] transport::Error),
}

// Command builders, exercised directly by tests.

pub fn stop_container(name: &ReleaseName, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("docker")
        .args(["rm", "-f"])
        .arg(name.as_str())
        .sudo(sudo)
}

pub fn stop_stack(release: &ReleaseDescriptor, descriptor: &str, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("docker")
        .args(["compose", "-p"])
        .arg(release.name.as_str())
        .arg("-f")
        .arg(format!("{}/{}", release.remote_path, descriptor))
        .args(["down", "--remove-orphans"])
        .sudo(sudo)
}

pub fn clear_deploy_dir(release: &ReleaseDescriptor, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("rm")
        .args(["-rf"])
        .arg(&release.remote_path)
        .sudo(sudo)
}

pub fn build_image(release: &ReleaseDescriptor, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("docker")
        .args(["build", "-t"])
        .arg(release.name.image_tag())
        .arg(&release.remote_path)
        .sudo(sudo)
}

/// Loopback bind only; direct public access to the container is not
/// possible, traffic has to come through the proxy.
pub fn run_container(release: &ReleaseDescriptor, port: u16, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("docker")
        .args(["run", "-d", "--name"])
        .arg(release.name.as_str())
        .args(["--restart", "unless-stopped", "-p"])
        .arg(format!("127.0.0.1:{port}:{port}"))
        .arg(release.name.image_tag())
        .sudo(sudo)
}

pub fn stack_up(release: &ReleaseDescriptor, descriptor: &str, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("docker")
        .args(["compose", "-p"])
        .arg(release.name.as_str())
        .arg("-f")
        .arg(format!("{}/{}", release.remote_path, descriptor))
        .args(["up", "-d", "--build"])
        .sudo(sudo)
}

pub fn container_probe(name: &ReleaseName, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("docker")
        .args(["ps", "-q", "--filter"])
        .arg(format!("name=^{}$", name))
        .sudo(sudo)
}

pub fn stack_probe(release: &ReleaseDescriptor, descriptor: &str, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("docker")
        .args(["compose", "-p"])
        .arg(release.name.as_str())
        .arg("-f")
        .arg(format!("{}/{}", release.remote_path, descriptor))
        .args(["ps", "--status", "running", "-q"])
        .sudo(sudo)
}

/// Replace whatever instance carries this release name with one built from
/// the current working copy, and confirm it is observably running.
pub async fn run<T: Transport>(
    transport: &T,
    target: &DeploymentTarget,
    release: &ReleaseDescriptor,
    mode: DeploymentMode,
    log: &RunLog,
) -> Result<(), ReleaseError> {
    let sudo = target.needs_sudo();

    // Absence of a previous instance is not an error.
    log.info("stopping previous instance (if any)");
    let stop = match mode {
        DeploymentMode::ComposeStack { descriptor } => stop_stack(release, descriptor, sudo),
        DeploymentMode::SingleContainer => stop_container(&release.name, sudo),
    };
    let stopped = transport.exec(&stop).await?;
    if !stopped.success() {
        tracing::debug!(
            stderr = %stopped.stderr.trim(),
            "no previous instance to stop"
        );
    }

    log.info(&format!(
        "transferring working copy to {}",
        release.remote_path
    ));
    let cleared = transport.exec(&clear_deploy_dir(release, sudo)).await?;
    if !cleared.success() {
        return Err(ReleaseError::Transfer(cleared.stderr.trim().to_string()));
    }
    transport
        .copy_tree(&release.local_path, &release.remote_path)
        .await
        .map_err(|e| ReleaseError::Transfer(e.to_string()))?;

    match mode {
        DeploymentMode::ComposeStack { descriptor } => {
            log.info("building and starting compose stack");
            let up = transport.exec(&stack_up(release, descriptor, sudo)).await?;
            if !up.success() {
                return Err(ReleaseError::Startup(up.stderr.trim().to_string()));
            }
        }
        DeploymentMode::SingleContainer => {
            log.info(&format!("building image {}", release.name.image_tag()));
            let build = transport.exec(&build_image(release, sudo)).await?;
            if !build.success() {
                return Err(ReleaseError::Build(build.stderr.trim().to_string()));
            }

            log.info(&format!(
                "starting container bound to 127.0.0.1:{}",
                target.port
            ));
            let run = transport
                .exec(&run_container(release, target.port, sudo))
                .await?;
            if !run.success() {
                return Err(ReleaseError::Startup(run.stderr.trim().to_string()));
            }
        }
    }

    // The proxy must never be pointed at a dead instance.
    let probe = match mode {
        DeploymentMode::ComposeStack { descriptor } => stack_probe(release, descriptor, sudo),
        DeploymentMode::SingleContainer => container_probe(&release.name, sudo),
    };
    let status = transport.exec(&probe).await?;
    if status.stdout.trim().is_empty() {
        return Err(ReleaseError::Startup(
            "instance not running after start".to_string(),
        ));
    }

    log.success("new instance running");
    Ok(())
}
