// ABOUTME: Tests for rollout state types and the type state pattern.
// ABOUTME: Verifies state markers and the Rollout<S> struct.

use slipway::pipeline::{Prepared, Released, Rollout, Routed, Staged, Verified};
use slipway::types::{DeploymentMode, DeploymentTarget, ReleaseDescriptor};
use std::mem::size_of;
use std::path::{Path, PathBuf};

fn fixture() -> Rollout<Staged> {
    let target = DeploymentTarget {
        host: "app.example.com".to_string(),
        user: "deploy".to_string(),
        key_path: PathBuf::from("/tmp/key"),
        port: 8080,
    };
    let release = ReleaseDescriptor::derive(
        "https://github.com/acme/widget.git",
        "main",
        Path::new("/tmp/slipway-tests"),
    )
    .unwrap();
    Rollout::new(target, release, DeploymentMode::SingleContainer)
}

/// Test: State markers are zero-sized; the state lives in the type alone.
#[test]
fn state_markers_are_zero_sized() {
    assert_eq!(size_of::<Staged>(), 0);
    assert_eq!(size_of::<Prepared>(), 0);
    assert_eq!(size_of::<Released>(), 0);
    assert_eq!(size_of::<Routed>(), 0);
    assert_eq!(size_of::<Verified>(), 0);
}

/// Test: All rollout states have the same size - transitions are free.
#[test]
fn rollout_sizes_match_across_states() {
    assert_eq!(
        size_of::<Rollout<Staged>>(),
        size_of::<Rollout<Verified>>()
    );
}

/// Test: A staged rollout exposes what it was constructed from.
#[test]
fn staged_rollout_exposes_inputs() {
    let rollout = fixture();

    assert_eq!(rollout.target().host, "app.example.com");
    assert_eq!(rollout.release().name.as_str(), "widget");
    assert_eq!(rollout.mode(), DeploymentMode::SingleContainer);
}

/// Test: Rollout implements Debug for diagnostics.
#[test]
fn rollout_implements_debug() {
    let debug = format!("{:?}", fixture());
    assert!(debug.contains("Rollout"));
}
