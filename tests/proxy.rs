// ABOUTME: Tests for reverse-proxy rule rendering and file placement.
// ABOUTME: The rendered rule must forward real client and protocol info.

use slipway::proxy::{enabled_path, render_site, site_path};
use slipway::types::ReleaseName;

#[test]
fn rendered_rule_routes_to_loopback() {
    let site = render_site("app.example.com", 8080);

    assert!(site.contains("listen 80;"));
    assert!(site.contains("server_name app.example.com;"));
    assert!(site.contains("proxy_pass http://127.0.0.1:8080;"));
}

#[test]
fn rendered_rule_forwards_client_headers() {
    let site = render_site("app.example.com", 3000);

    assert!(site.contains("proxy_set_header Host $host;"));
    assert!(site.contains("proxy_set_header X-Real-IP $remote_addr;"));
    assert!(site.contains("proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;"));
    assert!(site.contains("proxy_set_header X-Forwarded-Proto $scheme;"));
}

#[test]
fn rule_files_are_namespaced_by_release() {
    let name = ReleaseName::from_repo_url("https://host/acme/widget.git").unwrap();

    assert_eq!(
        site_path(&name),
        "/etc/nginx/sites-available/widget.conf"
    );
    assert_eq!(
        enabled_path(&name),
        "/etc/nginx/sites-enabled/widget.conf"
    );
}
