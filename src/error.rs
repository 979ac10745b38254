// ABOUTME: Application-wide error type and exit code mapping.
// ABOUTME: Every failure class maps to a distinct process exit code.

use crate::input::InputError;
use crate::prepare::PrepareError;
use crate::proxy::ProxyError;
use crate::release::ReleaseError;
use crate::source::SourceError;
use crate::transport;
use crate::validate::ValidateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("source stage failed: {0}")]
    Source(#[from] SourceError),

    #[error("environment preparation failed: {0}")]
    Prepare(#[from] PrepareError),

    #[error("release deployment failed: {0}")]
    Release(#[from] ReleaseError),

    #[error("proxy configuration failed: {0}")]
    Proxy(#[from] ProxyError),

    #[error("validation failed: {0}")]
    Validate(#[from] ValidateError),

    #[error(transparent)]
    Transport(#[from] transport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code communicating the failure class to calling
    /// automation. Stable; exercised by the exit-code tests.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Input(e) => e.exit_code(),
            Error::Source(SourceError::NoDescriptor(_)) => 8,
            Error::Source(_) => 10,
            Error::Transport(transport::Error::Unreachable { .. }) => 11,
            Error::Transport(_) => 1,
            Error::Prepare(_) => 12,
            Error::Release(_) => 13,
            Error::Proxy(_) => 14,
            Error::Validate(ValidateError::ExternalProbe { .. }) => 9,
            Error::Validate(_) => 15,
            Error::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
