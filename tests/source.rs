// ABOUTME: Tests for the local source stage decisions.
// ABOUTME: Clone-vs-update planning and deployment mode detection.

use slipway::source::{SourcePlan, plan};
use slipway::types::DeploymentMode;
use std::fs;

#[test]
fn fresh_path_plans_a_clone() {
    let dir = tempfile::tempdir().unwrap();
    let checkout = dir.path().join("widget");
    assert_eq!(plan(&checkout), SourcePlan::Clone);
}

#[test]
fn existing_working_copy_plans_an_update() {
    let dir = tempfile::tempdir().unwrap();
    let checkout = dir.path().join("widget");
    fs::create_dir_all(checkout.join(".git")).unwrap();
    assert_eq!(plan(&checkout), SourcePlan::Update);
}

#[test]
fn dockerfile_alone_means_single_container() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Dockerfile"), "FROM scratch\n").unwrap();

    assert_eq!(
        DeploymentMode::detect(dir.path()),
        Some(DeploymentMode::SingleContainer)
    );
}

#[test]
fn compose_descriptor_wins_over_dockerfile() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Dockerfile"), "FROM scratch\n").unwrap();
    fs::write(dir.path().join("docker-compose.yml"), "services: {}\n").unwrap();

    assert_eq!(
        DeploymentMode::detect(dir.path()),
        Some(DeploymentMode::ComposeStack {
            descriptor: "docker-compose.yml"
        })
    );
}

#[test]
fn alternate_compose_filenames_are_recognized() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("compose.yaml"), "services: {}\n").unwrap();

    assert_eq!(
        DeploymentMode::detect(dir.path()),
        Some(DeploymentMode::ComposeStack {
            descriptor: "compose.yaml"
        })
    );
}

#[test]
fn no_descriptor_means_not_deployable() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("README.md"), "# widget\n").unwrap();

    assert_eq!(DeploymentMode::detect(dir.path()), None);
}
