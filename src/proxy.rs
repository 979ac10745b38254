// ABOUTME: Reverse proxy configuration: render, install, validate, reload.
// ABOUTME: The proxy is only reloaded after the full config passes nginx -t.

use crate::logging::RunLog;
use crate::transport::{self, RemoteCommand, Transport};
use crate::types::{DeploymentTarget, ReleaseDescriptor, ReleaseName};
use thiserror::Error;

pub const SITES_AVAILABLE: &str = "/etc/nginx/sites-available";
pub const SITES_ENABLED: &str = "/etc/nginx/sites-enabled";

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to install routing rule: {0}")]
    InstallFailed(String),

    #[error("proxy configuration rejected: {0}")]
    ConfigRejected(String),

    #[error("proxy reload failed: {0}")]
    ReloadFailed(String),

    #[error(transparent)]
    Transport(#[from] transport::Error),
}

pub fn site_path(name: &ReleaseName) -> String {
    format!("{SITES_AVAILABLE}/{name}.conf")
}

pub fn enabled_path(name: &ReleaseName) -> String {
    format!("{SITES_ENABLED}/{name}.conf")
}

fn staging_path(name: &ReleaseName) -> String {
    format!("/tmp/slipway-{name}.conf")
}

/// Routing rule: listen on 80 as the host's server identity, forward all
/// paths to the loopback-bound instance. The forwarded headers let the
/// backend see the real client and protocol.
pub fn render_site(host: &str, port: u16) -> String {
    format!(
        r#"server {{
    listen 80;
    server_name {host};

    location / {{
        proxy_pass http://127.0.0.1:{port};
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
    }}
}}
"#
    )
}

// Command builders, exercised directly by tests.

pub fn install_site(name: &ReleaseName, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("install")
        .args(["-m", "0644"])
        .arg(staging_path(name))
        .arg(site_path(name))
        .sudo(sudo)
}

pub fn enable_site(name: &ReleaseName, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("ln")
        .args(["-sfn"])
        .arg(site_path(name))
        .arg(enabled_path(name))
        .sudo(sudo)
}

pub fn check_config(sudo: bool) -> RemoteCommand {
    RemoteCommand::new("nginx").arg("-t").sudo(sudo)
}

pub fn reload_proxy(sudo: bool) -> RemoteCommand {
    RemoteCommand::new("systemctl")
        .args(["reload", "nginx"])
        .sudo(sudo)
}

pub fn remove_site(name: &ReleaseName, sudo: bool) -> RemoteCommand {
    RemoteCommand::new("rm")
        .args(["-f"])
        .arg(site_path(name))
        .arg(enabled_path(name))
        .sudo(sudo)
}

/// Install and activate the release's routing rule. A rule that fails
/// validation is withdrawn before returning, so rules that were working
/// keep working.
pub async fn configure<T: Transport>(
    transport: &T,
    target: &DeploymentTarget,
    release: &ReleaseDescriptor,
    log: &RunLog,
) -> Result<(), ProxyError> {
    let sudo = target.needs_sudo();
    let name = &release.name;

    log.info(&format!("installing proxy rule for {}", target.host));
    let rule = render_site(&target.host, target.port);
    transport
        .write_file(&staging_path(name), rule.as_bytes())
        .await
        .map_err(|e| ProxyError::InstallFailed(e.to_string()))?;

    let installed = transport.exec(&install_site(name, sudo)).await?;
    if !installed.success() {
        return Err(ProxyError::InstallFailed(
            installed.stderr.trim().to_string(),
        ));
    }

    let enabled = transport.exec(&enable_site(name, sudo)).await?;
    if !enabled.success() {
        return Err(ProxyError::InstallFailed(enabled.stderr.trim().to_string()));
    }

    let check = transport.exec(&check_config(sudo)).await?;
    if !check.success() {
        let _ = transport.exec(&remove_site(name, sudo)).await;
        return Err(ProxyError::ConfigRejected(check.stderr.trim().to_string()));
    }

    let reload = transport.exec(&reload_proxy(sudo)).await?;
    if !reload.success() {
        return Err(ProxyError::ReloadFailed(reload.stderr.trim().to_string()));
    }

    log.success("proxy routing active");
    Ok(())
}
