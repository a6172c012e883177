#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::time::Duration;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// `sitescan` with a clean environment suitable for integration tests.
#[allow(dead_code)]
pub fn sitescan_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sitescan"));
    cmd.timeout(CMD_TIMEOUT);
    for var in [
        "SITESCAN_CONFIG",
        "SITESCAN_USER_AGENT",
        "SITESCAN_TIMEOUT_SECS",
        "SITESCAN_MAX_REDIRECTS",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("SITESCAN_TIMEOUT_SECS", "5");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Minimal `urlset` document listing `locs`.
#[allow(dead_code)]
pub fn urlset(locs: &[&str]) -> String {
    let urls: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{loc}</loc><lastmod>2024-03-01</lastmod></url>"))
        .collect();
    format!(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{urls}</urlset>"#)
}
