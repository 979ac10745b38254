// ABOUTME: Teardown path: converge a release's remote resources to absent.
// ABOUTME: Every step is best-effort; missing resources are not failures.

use crate::logging::RunLog;
use crate::proxy;
use crate::release;
use crate::transport::{self, RemoteCommand, Transport};
use crate::types::{
    COMPOSE_DESCRIPTORS, CONTAINER_DESCRIPTOR, DeploymentMode, ReleaseDescriptor, ReleaseName,
};

pub fn remove_image(name: &ReleaseName, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("docker")
        .arg("rmi")
        .arg(name.image_tag())
        .sudo(sudo)
}

/// Infer the topology of a deployment that may only exist remotely, using
/// the same descriptor precedence as the source stage.
pub async fn infer_mode<T: Transport>(
    transport: &T,
    release: &ReleaseDescriptor,
) -> Result<Option<DeploymentMode>, transport::Error> {
    for descriptor in COMPOSE_DESCRIPTORS {
        let path = format!("{}/{}", release.remote_path, descriptor);
        if transport.file_exists(&path).await? {
            return Ok(Some(DeploymentMode::ComposeStack { descriptor }));
        }
    }
    let dockerfile = format!("{}/{}", release.remote_path, CONTAINER_DESCRIPTOR);
    if transport.file_exists(&dockerfile).await? {
        return Ok(Some(DeploymentMode::SingleContainer));
    }
    Ok(None)
}

/// Remove the release's instance, deployment directory, and proxy rule,
/// then reload the proxy. Converges to "absent": running this against a
/// host with nothing deployed succeeds and changes nothing.
pub async fn run<T: Transport>(
    transport: &T,
    release: &ReleaseDescriptor,
    sudo: bool,
    log: &RunLog,
) -> Result<(), transport::Error> {
    log.info(&format!("tearing down release {}", release.name));

    match infer_mode(transport, release).await? {
        Some(DeploymentMode::ComposeStack { descriptor }) => {
            best_effort(transport, &release::stop_stack(release, descriptor, sudo)).await?;
        }
        // With no remote descriptors left, fall back to the
        // single-container shape; the steps are no-ops if nothing exists.
        Some(DeploymentMode::SingleContainer) | None => {
            best_effort(transport, &release::stop_container(&release.name, sudo)).await?;
            best_effort(transport, &remove_image(&release.name, sudo)).await?;
        }
    }

    best_effort(transport, &release::clear_deploy_dir(release, sudo)).await?;
    best_effort(transport, &proxy::remove_site(&release.name, sudo)).await?;
    best_effort(transport, &proxy::reload_proxy(sudo)).await?;

    log.success("teardown complete");
    Ok(())
}

/// Run a command whose goal is "ensure absent". Non-zero exits are
/// swallowed; only transport-level failures propagate.
async fn best_effort<T: Transport>(
    transport: &T,
    command: &RemoteCommand,
) -> Result<(), transport::Error> {
    let output = transport.exec(command).await?;
    if !output.success() {
        tracing::debug!(
            command = %command.render(),
            stderr = %output.stderr.trim(),
            "best-effort step found nothing to remove"
        );
    }
    Ok(())
}
