// ABOUTME: Generic rollout struct parameterized by state marker.
// ABOUTME: Target, release, and mode are fixed at staging and read-only after.

use crate::types::{DeploymentMode, DeploymentTarget, ReleaseDescriptor};
use std::marker::PhantomData;

use super::state::Staged;

/// A deployment run in progress, parameterized by its current state.
///
/// The state parameter `S` makes illegal stage orderings unrepresentable:
/// the proxy cannot be routed at an instance that was never confirmed
/// running, and validation cannot run before the proxy exists.
#[derive(Debug)]
pub struct Rollout<S> {
    pub(crate) target: DeploymentTarget,
    pub(crate) release: ReleaseDescriptor,
    pub(crate) mode: DeploymentMode,
    pub(crate) _state: PhantomData<S>,
}

impl Rollout<Staged> {
    /// A rollout starts staged: constructing one requires a computed
    /// deployment mode, which only the source stage produces.
    pub fn new(target: DeploymentTarget, release: ReleaseDescriptor, mode: DeploymentMode) -> Self {
        Rollout {
            target,
            release,
            mode,
            _state: PhantomData,
        }
    }
}

impl<S> Rollout<S> {
    pub fn target(&self) -> &DeploymentTarget {
        &self.target
    }

    pub fn release(&self) -> &ReleaseDescriptor {
        &self.release
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }
}
