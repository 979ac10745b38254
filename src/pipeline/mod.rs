// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports state markers and the Rollout struct for compile-time safe ordering.

mod rollout;
mod state;
mod transitions;

pub use rollout::Rollout;
pub use state::{Prepared, Released, Routed, Staged, Verified};
