// ABOUTME: SSH session management using russh.
// ABOUTME: Key-file authentication, command execution, and tar-stream uploads.

use super::Transport;
use super::command::{CommandOutput, RemoteCommand, shell_quote};
use super::error::{Error, Result};
use async_trait::async_trait;
use russh::client::{self, Config, Handle};
use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key, ssh_key};
use russh::{ChannelMsg, Disconnect};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for establishing an SSH session.
///
/// Authentication is by private key file only; there is no password or
/// agent fallback.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remote host to connect to.
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    /// Username for authentication.
    pub user: String,
    /// Path to the private key file.
    pub key_path: PathBuf,
    /// Whether to accept unknown hosts (Trust On First Use).
    pub trust_on_first_use: bool,
    /// Optional path to known_hosts file.
    /// If None, uses the default ~/.ssh/known_hosts.
    pub known_hosts_path: Option<PathBuf>,
    /// Deadline for the initial connectivity check (connect + auth).
    pub connect_timeout: Duration,
    /// Timeout for individual command execution. Generous by default so
    /// image builds are not cut off.
    pub command_timeout: Duration,
}

impl SessionConfig {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            key_path: key_path.into(),
            trust_on_first_use: true,
            known_hosts_path: None,
            connect_timeout: Duration::from_secs(15),
            command_timeout: Duration::from_secs(600),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn trust_on_first_use(mut self, tofu: bool) -> Self {
        self.trust_on_first_use = tofu;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    trust_on_first_use: bool,
    known_hosts_path: Option<PathBuf>,
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let check_result = match &self.known_hosts_path {
            Some(path) => check_known_hosts_path(&self.host, self.port, server_public_key, path),
            None => check_known_hosts(&self.host, self.port, server_public_key),
        };

        match check_result {
            Ok(true) => Ok(true),
            Ok(false) => {
                // Host not in known_hosts
                if self.trust_on_first_use {
                    tracing::warn!(
                        "Trust-On-First-Use: accepting unknown host key for {}:{}",
                        self.host,
                        self.port
                    );
                    let learn_result = match &self.known_hosts_path {
                        Some(path) => {
                            learn_known_hosts_path(&self.host, self.port, server_public_key, path)
                        }
                        None => learn_known_hosts(&self.host, self.port, server_public_key),
                    };
                    if let Err(e) = learn_result {
                        tracing::warn!("Failed to save host key to known_hosts: {}", e);
                    }
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Err(russh::keys::Error::KeyChanged { .. }) => Ok(false),
            Err(_) => {
                // Other errors - treat as unknown host
                Ok(self.trust_on_first_use)
            }
        }
    }
}

/// An established SSH session to the deployment target.
pub struct Session {
    config: SessionConfig,
    handle: Arc<Handle<SshHandler>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

impl Session {
    /// Connect and authenticate within the configured connectivity deadline.
    /// Elapsing the deadline is reported as `Unreachable`.
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        let handle = match tokio::time::timeout(config.connect_timeout, Self::handshake(&config))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::Unreachable {
                    host: config.host.clone(),
                    reason: format!("no response within {:?}", config.connect_timeout),
                });
            }
        };

        Ok(Self {
            config,
            handle: Arc::new(handle),
        })
    }

    async fn handshake(config: &SessionConfig) -> Result<Handle<SshHandler>> {
        let key = load_secret_key(&config.key_path, None).map_err(|e| Error::KeyLoadFailed {
            path: config.key_path.clone(),
            reason: e.to_string(),
        })?;

        let russh_config = Config {
            inactivity_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            trust_on_first_use: config.trust_on_first_use,
            known_hosts_path: config.known_hosts_path.clone(),
        };

        let mut session = client::connect(
            Arc::new(russh_config),
            (config.host.as_str(), config.port),
            handler,
        )
        .await
        .map_err(|e| Error::Unreachable {
            host: config.host.clone(),
            reason: e.to_string(),
        })?;

        let hash_alg = session
            .best_supported_rsa_hash()
            .await
            .map_err(Error::Protocol)?
            .flatten();

        let auth = session
            .authenticate_publickey(
                &config.user,
                PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
            )
            .await
            .map_err(Error::Protocol)?;

        if !auth.success() {
            return Err(Error::AuthenticationFailed {
                user: config.user.clone(),
                host: config.host.clone(),
            });
        }

        Ok(session)
    }

    /// Execute a raw command line on the remote host.
    pub async fn exec_raw(&self, command: &str) -> Result<CommandOutput> {
        self.exec_channel(command, None).await
    }

    /// Execute a raw command line, streaming `input` to its stdin.
    async fn exec_with_input(&self, command: &str, input: &[u8]) -> Result<CommandOutput> {
        self.exec_channel(command, Some(input)).await
    }

    async fn exec_channel(&self, command: &str, input: Option<&[u8]>) -> Result<CommandOutput> {
        match tokio::time::timeout(
            self.config.command_timeout,
            self.exec_inner(command, input),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::CommandTimeout(self.config.command_timeout)),
        }
    }

    async fn exec_inner(&self, command: &str, input: Option<&[u8]>) -> Result<CommandOutput> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to exec command: {}", e)))?;

        if let Some(data) = input {
            channel
                .data(data)
                .await
                .map_err(|e| Error::CommandFailed(format!("failed to send input: {}", e)))?;
            channel
                .eof()
                .await
                .map_err(|e| Error::CommandFailed(format!("failed to close input: {}", e)))?;
        }

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_code = 0u32;

        let mut got_exit_status = false;
        let mut got_eof = false;

        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    stdout.extend_from_slice(&data);
                }
                Some(ChannelMsg::ExtendedData { data, ext }) => {
                    if ext == 1 {
                        // stderr
                        stderr.extend_from_slice(&data);
                    }
                }
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    exit_code = exit_status;
                    got_exit_status = true;
                    if got_eof {
                        break;
                    }
                }
                Some(ChannelMsg::Eof) => {
                    got_eof = true;
                    if got_exit_status {
                        break;
                    }
                }
                Some(ChannelMsg::Close) => {
                    break;
                }
                Some(_) => {}
                None => break,
            }
        }

        // A channel that closes without an exit status indicates abnormal
        // termination (connection loss, remote kill).
        if !got_exit_status {
            return Err(Error::ChannelClosed);
        }

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
        })
    }

    /// Disconnect the session.
    pub async fn disconnect(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)?;
        Ok(())
    }
}

#[async_trait]
impl Transport for Session {
    async fn exec(&self, command: &RemoteCommand) -> Result<CommandOutput> {
        let line = command.render();
        tracing::debug!(command = %line, "executing remote command");
        self.exec_raw(&line).await
    }

    /// Ship a directory tree as a tar stream unpacked on the remote side.
    /// Full-tree overwrite semantics; no exclusions, no incremental diff.
    async fn copy_tree(&self, local: &Path, remote: &str) -> Result<()> {
        let local = local.to_path_buf();
        let archive = tokio::task::spawn_blocking(move || -> std::io::Result<Vec<u8>> {
            let mut builder = tar::Builder::new(Vec::new());
            builder.follow_symlinks(false);
            builder.append_dir_all(".", &local)?;
            builder.into_inner()
        })
        .await
        .map_err(|e| Error::UploadFailed(format!("archive task failed: {e}")))??;

        tracing::debug!(bytes = archive.len(), dest = remote, "uploading working copy");

        let unpack = format!(
            "mkdir -p {dest} && tar -xf - -C {dest}",
            dest = shell_quote(remote)
        );
        let output = self.exec_with_input(&unpack, &archive).await?;
        if !output.success() {
            return Err(Error::UploadFailed(output.stderr.trim().to_string()));
        }
        Ok(())
    }

    /// Write bytes to a remote file by streaming them into `tee`.
    async fn write_file(&self, remote: &str, contents: &[u8]) -> Result<()> {
        let line = format!("tee {} >/dev/null", shell_quote(remote));
        let output = self.exec_with_input(&line, contents).await?;
        if !output.success() {
            return Err(Error::UploadFailed(output.stderr.trim().to_string()));
        }
        Ok(())
    }
}
