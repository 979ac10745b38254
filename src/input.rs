// ABOUTME: Operator input collection and validation.
// ABOUTME: Flags win; anything missing is asked for through the Prompt trait.

use crate::error::Result;
use crate::types::{Credential, DeploymentTarget, ReleaseNameError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("repository URL is required")]
    MissingRepoUrl,

    #[error("invalid repository URL: {0}")]
    InvalidRepoUrl(#[from] ReleaseNameError),

    #[error("access credential is required")]
    MissingCredential,

    #[error("SSH user is required")]
    MissingUser,

    #[error("target host is required")]
    MissingHost,

    #[error("private key not found: {0}")]
    KeyNotFound(PathBuf),

    #[error("exposed port must be a non-zero number, got '{0}'")]
    InvalidPort(String),
}

impl InputError {
    /// Distinct exit code per precondition failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            InputError::MissingRepoUrl | InputError::InvalidRepoUrl(_) => 2,
            InputError::MissingCredential => 3,
            InputError::MissingUser => 4,
            InputError::MissingHost => 5,
            InputError::KeyNotFound(_) => 6,
            InputError::InvalidPort(_) => 7,
        }
    }
}

/// Interactive input collaborator. Production uses dialoguer; tests script
/// answers in memory.
pub trait Prompt {
    fn text(&mut self, label: &str, default: Option<&str>) -> std::io::Result<String>;
    fn secret(&mut self, label: &str) -> std::io::Result<String>;
}

/// Terminal prompter backed by dialoguer.
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn text(&mut self, label: &str, default: Option<&str>) -> std::io::Result<String> {
        let mut input = dialoguer::Input::<String>::new().with_prompt(label);
        if let Some(value) = default {
            input = input.default(value.to_string());
        }
        input.interact_text().map_err(std::io::Error::other)
    }

    fn secret(&mut self, label: &str) -> std::io::Result<String> {
        dialoguer::Password::new()
            .with_prompt(label)
            .interact()
            .map_err(std::io::Error::other)
    }
}

/// Raw deploy-mode values as supplied on the command line.
#[derive(Debug, Default)]
pub struct DeployParams {
    pub repo: Option<String>,
    pub token: Option<String>,
    pub branch: Option<String>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub key: Option<PathBuf>,
    pub port: Option<String>,
}

/// Raw teardown-mode values. Teardown only needs what identifies the
/// target and the release.
#[derive(Debug, Default)]
pub struct TeardownParams {
    pub repo: Option<String>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub key: Option<PathBuf>,
}

/// Validated deploy-mode input, constructed once before the pipeline.
#[derive(Debug)]
pub struct DeployInput {
    pub target: DeploymentTarget,
    pub repo_url: String,
    pub credential: Credential,
    pub branch: String,
}

/// Validated teardown-mode input.
#[derive(Debug)]
pub struct TeardownInput {
    pub host: String,
    pub user: String,
    pub key_path: PathBuf,
    pub repo_url: String,
}

pub fn gather_deploy(params: DeployParams, prompt: &mut dyn Prompt) -> Result<DeployInput> {
    let repo_url = resolve(params.repo, prompt, "Repository URL", None)?;
    if repo_url.is_empty() {
        return Err(InputError::MissingRepoUrl.into());
    }

    let token = match params.token {
        Some(token) => token,
        None => prompt.secret("Access token")?,
    };
    if token.trim().is_empty() {
        return Err(InputError::MissingCredential.into());
    }

    let branch = resolve(params.branch, prompt, "Branch", Some("main"))?;
    let branch = if branch.is_empty() {
        "main".to_string()
    } else {
        branch
    };

    let host = resolve(params.host, prompt, "Target host", None)?;
    if host.is_empty() {
        return Err(InputError::MissingHost.into());
    }

    let user = resolve(params.user, prompt, "SSH user", None)?;
    if user.is_empty() {
        return Err(InputError::MissingUser.into());
    }

    let key_path = resolve_key(params.key, prompt)?;

    let port_raw = resolve(params.port, prompt, "Exposed port", None)?;
    let port = port_raw
        .parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| InputError::InvalidPort(port_raw.clone()))?;

    Ok(DeployInput {
        target: DeploymentTarget {
            host,
            user,
            key_path,
            port,
        },
        repo_url,
        credential: Credential::new(token.trim()),
        branch,
    })
}

pub fn gather_teardown(params: TeardownParams, prompt: &mut dyn Prompt) -> Result<TeardownInput> {
    let repo_url = resolve(params.repo, prompt, "Repository URL", None)?;
    if repo_url.is_empty() {
        return Err(InputError::MissingRepoUrl.into());
    }

    let host = resolve(params.host, prompt, "Target host", None)?;
    if host.is_empty() {
        return Err(InputError::MissingHost.into());
    }

    let user = resolve(params.user, prompt, "SSH user", None)?;
    if user.is_empty() {
        return Err(InputError::MissingUser.into());
    }

    let key_path = resolve_key(params.key, prompt)?;

    Ok(TeardownInput {
        host,
        user,
        key_path,
        repo_url,
    })
}

fn resolve(
    value: Option<String>,
    prompt: &mut dyn Prompt,
    label: &str,
    default: Option<&str>,
) -> std::io::Result<String> {
    match value {
        Some(v) => Ok(v.trim().to_string()),
        None => Ok(prompt.text(label, default)?.trim().to_string()),
    }
}

fn resolve_key(value: Option<PathBuf>, prompt: &mut dyn Prompt) -> Result<PathBuf> {
    let key_path = match value {
        Some(path) => path,
        None => PathBuf::from(resolve(None, prompt, "Private key path", None)?),
    };
    if !key_path.is_file() {
        return Err(InputError::KeyNotFound(key_path).into());
    }
    Ok(key_path)
}
