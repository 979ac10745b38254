// ABOUTME: State transition methods for the deployment pipeline.
// ABOUTME: Each method consumes self and returns the next state on success.

use std::marker::PhantomData;

use crate::logging::RunLog;
use crate::prepare::{self, PrepareError};
use crate::proxy::{self, ProxyError};
use crate::release::{self, ReleaseError};
use crate::transport::Transport;
use crate::validate::{self, ValidateError};

use super::Rollout;
use super::state::{Prepared, Released, Routed, Staged, Verified};

impl<S> Rollout<S> {
    /// Internal helper to transition to a new state.
    fn transition<T>(self) -> Rollout<T> {
        Rollout {
            target: self.target,
            release: self.release,
            mode: self.mode,
            _state: PhantomData,
        }
    }
}

impl Rollout<Staged> {
    /// Bring the target host to a deployable state.
    ///
    /// # Errors
    ///
    /// Returns `PrepareError` if packages, group membership, services, or
    /// the deployment root cannot be ensured.
    #[must_use = "rollout state must be used"]
    pub async fn prepare<T: Transport>(
        self,
        transport: &T,
        log: &RunLog,
    ) -> Result<Rollout<Prepared>, PrepareError> {
        prepare::run(transport, &self.target, log).await?;
        Ok(self.transition())
    }
}

impl Rollout<Prepared> {
    /// Stop the previous instance, ship the working copy, and start the new
    /// instance.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::Startup` if the instance is not observably
    /// running afterwards; the pipeline must not route traffic at it.
    #[must_use = "rollout state must be used"]
    pub async fn deploy<T: Transport>(
        self,
        transport: &T,
        log: &RunLog,
    ) -> Result<Rollout<Released>, ReleaseError> {
        release::run(transport, &self.target, &self.release, self.mode, log).await?;
        Ok(self.transition())
    }
}

impl Rollout<Released> {
    /// Install and activate the reverse-proxy rule for this release.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError` on install failure or when nginx rejects the
    /// configuration; in the latter case the rule is withdrawn first.
    #[must_use = "rollout state must be used"]
    pub async fn route<T: Transport>(
        self,
        transport: &T,
        log: &RunLog,
    ) -> Result<Rollout<Routed>, ProxyError> {
        proxy::configure(transport, &self.target, &self.release, log).await?;
        Ok(self.transition())
    }
}

impl Rollout<Routed> {
    /// Validate the deployment end to end, internal tier then external.
    ///
    /// # Errors
    ///
    /// Internal failures and external failures return distinct
    /// `ValidateError` kinds.
    #[must_use = "rollout state must be used"]
    pub async fn verify<T: Transport>(
        self,
        transport: &T,
        log: &RunLog,
    ) -> Result<Rollout<Verified>, ValidateError> {
        validate::run(transport, &self.target, log).await?;
        Ok(self.transition())
    }
}
