// ABOUTME: Tests for the per-stage remote command builders.
// ABOUTME: Asserts exact rendered command lines and quoting behavior.

use proptest::prelude::*;
use slipway::transport::{RemoteCommand, shell_quote};
use slipway::types::ReleaseDescriptor;
use slipway::{cleanup, prepare, proxy, release, validate};
use std::path::Path;

fn widget() -> ReleaseDescriptor {
    ReleaseDescriptor::derive(
        "https://example.com/acme/widget.git",
        "main",
        Path::new("/tmp/slipway-tests"),
    )
    .unwrap()
}

// =============================================================================
// Environment Preparation
// =============================================================================

#[test]
fn package_commands_render() {
    assert_eq!(
        prepare::package_probe("docker.io").render(),
        "dpkg -s docker.io"
    );
    assert_eq!(prepare::apt_update(true).render(), "sudo apt-get update -y");
    assert_eq!(
        prepare::package_install(&["nginx", "curl"], true).render(),
        "sudo apt-get install -y nginx curl"
    );
}

#[test]
fn group_and_service_commands_render() {
    assert_eq!(prepare::group_probe("deploy").render(), "id -nG deploy");
    assert_eq!(
        prepare::group_add("deploy", true).render(),
        "sudo usermod -aG docker deploy"
    );
    assert_eq!(
        prepare::enable_services(false).render(),
        "systemctl enable --now docker nginx"
    );
    assert_eq!(
        prepare::create_deploy_root("deploy", true).render(),
        "sudo install -d -o deploy -g deploy /opt/deployments"
    );
}

// =============================================================================
// Release Deployment
// =============================================================================

#[test]
fn single_container_commands_render() {
    let release = widget();

    assert_eq!(
        release::stop_container(&release.name, true).render(),
        "sudo docker rm -f widget"
    );
    assert_eq!(
        release::build_image(&release, false).render(),
        "docker build -t widget /opt/deployments/widget"
    );
    assert_eq!(
        release::run_container(&release, 8080, false).render(),
        "docker run -d --name widget --restart unless-stopped -p 127.0.0.1:8080:8080 widget"
    );
    assert_eq!(
        release::container_probe(&release.name, false).render(),
        "docker ps -q --filter 'name=^widget$'"
    );
}

#[test]
fn compose_commands_render() {
    let release = widget();

    assert_eq!(
        release::stop_stack(&release, "docker-compose.yml", true).render(),
        "sudo docker compose -p widget -f /opt/deployments/widget/docker-compose.yml \
         down --remove-orphans"
    );
    assert_eq!(
        release::stack_up(&release, "compose.yaml", false).render(),
        "docker compose -p widget -f /opt/deployments/widget/compose.yaml up -d --build"
    );
    assert_eq!(
        release::stack_probe(&release, "compose.yaml", false).render(),
        "docker compose -p widget -f /opt/deployments/widget/compose.yaml \
         ps --status running -q"
    );
}

// =============================================================================
// Proxy and Validation
// =============================================================================

#[test]
fn proxy_commands_render() {
    let release = widget();

    assert_eq!(
        proxy::install_site(&release.name, true).render(),
        "sudo install -m 0644 /tmp/slipway-widget.conf /etc/nginx/sites-available/widget.conf"
    );
    assert_eq!(
        proxy::enable_site(&release.name, true).render(),
        "sudo ln -sfn /etc/nginx/sites-available/widget.conf /etc/nginx/sites-enabled/widget.conf"
    );
    assert_eq!(proxy::check_config(true).render(), "sudo nginx -t");
    assert_eq!(
        proxy::reload_proxy(true).render(),
        "sudo systemctl reload nginx"
    );
    assert_eq!(
        proxy::remove_site(&release.name, true).render(),
        "sudo rm -f /etc/nginx/sites-available/widget.conf /etc/nginx/sites-enabled/widget.conf"
    );
}

#[test]
fn validation_commands_render() {
    assert_eq!(
        validate::service_probe("docker").render(),
        "systemctl is-active docker"
    );
    assert_eq!(
        validate::local_probe("app.example.com").render(),
        "curl -s -o /dev/null -w '%{http_code}' -H 'Host: app.example.com' http://127.0.0.1/"
    );
}

#[test]
fn cleanup_commands_render() {
    let release = widget();
    assert_eq!(
        cleanup::remove_image(&release.name, true).render(),
        "sudo docker rmi widget"
    );
}

// =============================================================================
// Quoting
// =============================================================================

/// Minimal POSIX single-quote reader used to reverse `shell_quote`.
fn shell_unquote(quoted: &str) -> String {
    let mut out = String::new();
    let mut chars = quoted.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                for inner in chars.by_ref() {
                    if inner == '\'' {
                        break;
                    }
                    out.push(inner);
                }
            }
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            other => out.push(other),
        }
    }
    out
}

proptest! {
    /// Quoting round-trips arbitrary strings, so no operator-supplied value
    /// can escape into shell syntax.
    #[test]
    fn quoting_round_trips(s in "\\PC{0,40}") {
        prop_assert_eq!(shell_unquote(&shell_quote(&s)), s);
    }
}

#[test]
fn injection_attempts_stay_inert() {
    let cmd = RemoteCommand::new("docker")
        .args(["rm", "-f"])
        .arg("app; rm -rf /");
    assert_eq!(cmd.render(), "docker rm -f 'app; rm -rf /'");
}
