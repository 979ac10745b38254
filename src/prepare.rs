// ABOUTME: Remote environment preparation: packages, runtime group, services.
// ABOUTME: Idempotent; success means services active at return.

use crate::logging::RunLog;
use crate::transport::{self, RemoteCommand, Transport};
use crate::types::{DeploymentTarget, REMOTE_DEPLOY_ROOT};
use thiserror::Error;

/// Packages the pipeline depends on. `curl` backs the internal validation
/// probe.
pub const REQUIRED_PACKAGES: [&str; 3] = ["docker.io", "nginx", "curl"];

/// Group granting socket access to the container runtime.
pub const RUNTIME_GROUP: &str = "docker";

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("package install failed: {0}")]
    PackageInstall(String),

    #[error("failed to add {user} to the {group} group: {reason}")]
    GroupAdd {
        user: String,
        group: String,
        reason: String,
    },

    #[error("failed to enable services: {0}")]
    ServiceEnable(String),

    #[error("failed to create deployment root: {0}")]
    DeployRoot(String),

    #[error(transparent)]
    Transport(#[from] transport::Error),
}

// Command builders, exercised directly by tests.

pub fn package_probe(package: &str) -> RemoteCommand {
    RemoteCommand::new("dpkg").args(["-s", package])
}

pub fn apt_update(sudo: bool) -> RemoteCommand {
    RemoteCommand::new("apt-get").args(["update", "-y"]).sudo(sudo)
}

pub fn package_install(packages: &[&str], sudo: bool) -> RemoteCommand {
    RemoteCommand::new("apt-get")
        .args(["install", "-y"])
        .args(packages.iter().copied())
        .sudo(sudo)
}

pub fn group_probe(user: &str) -> RemoteCommand {
    RemoteCommand::new("id").args(["-nG", user])
}

pub fn group_add(user: &str, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("usermod")
        .args(["-aG", RUNTIME_GROUP, user])
        .sudo(sudo)
}

pub fn enable_services(sudo: bool) -> RemoteCommand {
    RemoteCommand::new("systemctl")
        .args(["enable", "--now", "docker", "nginx"])
        .sudo(sudo)
}

/// Deployment root owned by the operating user, so working-copy transfers
/// need no privilege.
pub fn create_deploy_root(user: &str, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("install")
        .args(["-d", "-o", user, "-g", user, REMOTE_DEPLOY_ROOT])
        .sudo(sudo)
}

/// Bring the target host to a deployable state. Installs only what is
/// missing; enabling services is issued regardless of prior state.
pub async fn run<T: Transport>(
    transport: &T,
    target: &DeploymentTarget,
    log: &RunLog,
) -> Result<(), PrepareError> {
    let sudo = target.needs_sudo();

    let mut missing = Vec::new();
    for package in REQUIRED_PACKAGES {
        let probe = transport.exec(&package_probe(package)).await?;
        if !probe.success() {
            missing.push(package);
        }
    }

    if missing.is_empty() {
        log.info("required packages already present");
    } else {
        log.info(&format!("installing packages: {}", missing.join(", ")));
        let update = transport.exec(&apt_update(sudo)).await?;
        if !update.success() {
            return Err(PrepareError::PackageInstall(
                update.stderr.trim().to_string(),
            ));
        }
        let install = transport.exec(&package_install(&missing, sudo)).await?;
        if !install.success() {
            return Err(PrepareError::PackageInstall(
                install.stderr.trim().to_string(),
            ));
        }
    }

    let groups = transport.exec(&group_probe(&target.user)).await?;
    let member = groups
        .stdout
        .split_whitespace()
        .any(|group| group == RUNTIME_GROUP);
    if !member {
        log.info(&format!(
            "adding {} to the {} group",
            target.user, RUNTIME_GROUP
        ));
        let add = transport.exec(&group_add(&target.user, sudo)).await?;
        if !add.success() {
            return Err(PrepareError::GroupAdd {
                user: target.user.clone(),
                group: RUNTIME_GROUP.to_string(),
                reason: add.stderr.trim().to_string(),
            });
        }
    }

    let enable = transport.exec(&enable_services(sudo)).await?;
    if !enable.success() {
        return Err(PrepareError::ServiceEnable(
            enable.stderr.trim().to_string(),
        ));
    }

    let root = transport.exec(&create_deploy_root(&target.user, sudo)).await?;
    if !root.success() {
        return Err(PrepareError::DeployRoot(root.stderr.trim().to_string()));
    }

    log.success("remote environment ready");
    Ok(())
}
