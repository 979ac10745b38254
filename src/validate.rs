// ABOUTME: Two-tier deployment validation: on-host health, then public reachability.
// ABOUTME: The two tiers fail as distinct error kinds so callers can tell them apart.

use crate::logging::RunLog;
use crate::transport::{self, RemoteCommand, Transport};
use crate::types::DeploymentTarget;
use hyper_util::rt::TokioIo;
use std::time::Duration;
use thiserror::Error;

/// Services that must report active before probing.
pub const MANAGED_SERVICES: [&str; 2] = ["docker", "nginx"];

#[derive(Debug, Error)]
pub enum ValidateError {
    /// Internal tier: the host itself is broken.
    #[error("service {service} is not active")]
    ServiceInactive { service: String },

    /// Internal tier: proxy answered locally but not with 200.
    #[error("local probe returned status {status}, expected 200")]
    InternalProbe { status: String },

    /// External tier: healthy on the host but unreachable from outside,
    /// which implicates network reachability rather than the application.
    #[error("external probe of {url} failed: {reason}")]
    ExternalProbe { url: String, reason: String },

    #[error(transparent)]
    Transport(#[from] transport::Error),
}

impl ValidateError {
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalProbe { .. })
    }
}

// Command builders, exercised directly by tests.

pub fn service_probe(service: &str) -> RemoteCommand {
    RemoteCommand::new("systemctl").args(["is-active", service])
}

pub fn local_probe(host: &str) -> RemoteCommand {
    RemoteCommand::new("curl")
        .args(["-s", "-o", "/dev/null", "-w", "%{http_code}", "-H"])
        .arg(format!("Host: {host}"))
        .arg("http://127.0.0.1/")
}

/// Internal tier first, then the external probe from this machine.
pub async fn run<T: Transport>(
    transport: &T,
    target: &DeploymentTarget,
    log: &RunLog,
) -> Result<(), ValidateError> {
    for service in MANAGED_SERVICES {
        let output = transport.exec(&service_probe(service)).await?;
        if !output.success() || output.stdout.trim() != "active" {
            return Err(ValidateError::ServiceInactive {
                service: service.to_string(),
            });
        }
    }
    log.info("runtime and proxy services active");

    let probe = transport.exec(&local_probe(&target.host)).await?;
    let status = probe.stdout.trim().to_string();
    if status != "200" {
        return Err(ValidateError::InternalProbe { status });
    }
    log.info("internal probe returned 200");

    probe_external(&target.host, 80, Duration::from_secs(10)).await?;
    log.success(&format!(
        "http://{}/ reachable from outside",
        target.host
    ));
    Ok(())
}

/// GET / against the public address from the operator machine. Anything
/// other than a 200 within the deadline is an external-tier failure.
pub async fn probe_external(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<(), ValidateError> {
    let url = format!("http://{host}:{port}/");
    match tokio::time::timeout(timeout, external_request(host, port)).await {
        Ok(Ok(200)) => Ok(()),
        Ok(Ok(status)) => Err(ValidateError::ExternalProbe {
            url,
            reason: format!("status {status}, expected 200"),
        }),
        Ok(Err(reason)) => Err(ValidateError::ExternalProbe { url, reason }),
        Err(_) => Err(ValidateError::ExternalProbe {
            url,
            reason: format!("no response within {timeout:?}"),
        }),
    }
}

async fn external_request(host: &str, port: u16) -> Result<u16, String> {
    let stream = tokio::net::TcpStream::connect((host, port))
        .await
        .map_err(|e| e.to_string())?;
    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| format!("HTTP handshake failed: {e}"))?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("probe connection error: {e}");
        }
    });

    let req = hyper::Request::builder()
        .method("GET")
        .uri("/")
        .header("Host", host)
        .body(http_body_util::Empty::<bytes::Bytes>::new())
        .map_err(|e| format!("failed to build request: {e}"))?;

    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| e.to_string())?;

    Ok(resp.status().as_u16())
}
