// ABOUTME: Validated domain types shared by every pipeline stage.
// ABOUTME: Release naming, deployment mode, target host, and credentials.

mod credential;
mod descriptor;
mod mode;
mod release_name;
mod target;

pub use credential::Credential;
pub use descriptor::{REMOTE_DEPLOY_ROOT, ReleaseDescriptor};
pub use mode::{COMPOSE_DESCRIPTORS, CONTAINER_DESCRIPTOR, DeploymentMode};
pub use release_name::{ReleaseName, ReleaseNameError};
pub use target::DeploymentTarget;
