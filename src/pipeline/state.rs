// ABOUTME: Rollout state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce the stage order at compile time.

/// Source tree materialized, deployment mode computed.
/// Available actions: `prepare()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Staged;

/// Remote environment ready: packages present, services active.
/// Available actions: `deploy()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Prepared;

/// New instance confirmed running on the target.
/// Available actions: `route()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Released;

/// Proxy rule validated and active.
/// Available actions: `verify()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Routed;

/// Internally and externally validated. Terminal state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verified;
