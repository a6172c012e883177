//! `sitescan robots`: show what a site's robots.txt declares.

use anyhow::Result;
use colored::Colorize;
use sitescan_core::robots::{extract_sitemap_urls, extract_user_agent_lines, robots_url};
use sitescan_core::{ReqwestFetcher, RobotsReader, parse_start_url};
use std::io::Write;
use std::sync::Arc;

use super::load_config;
use crate::cli::RobotsArgs;

pub async fn execute(args: &RobotsArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let origin = parse_start_url(&args.url)?;
    let reader = RobotsReader::new(Arc::new(ReqwestFetcher::new(&config)?));

    let location = robots_url(&origin).map_or_else(|| origin.to_string(), |url| url.to_string());
    let Some(text) = reader.fetch_raw(&origin).await else {
        eprintln!("No robots.txt at {location}");
        return Ok(());
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{} {location}", "robots.txt:".bold())?;
    let sitemaps: Vec<_> = extract_sitemap_urls(&text).collect();
    if sitemaps.is_empty() {
        writeln!(out, "{}", "No Sitemap directives".dimmed())?;
    } else {
        writeln!(out, "{}", "Sitemaps:".bold())?;
        for sitemap in &sitemaps {
            writeln!(out, "  {sitemap}")?;
        }
    }

    if let Some(agent) = &args.agent {
        writeln!(out, "{}", format!("Directives for '{agent}':").bold())?;
        let mut any = false;
        for line in extract_user_agent_lines(&text, agent) {
            any = true;
            writeln!(out, "  {line}")?;
        }
        if !any {
            writeln!(out, "  {}", "(none)".dimmed())?;
        }
    }

    out.flush()?;
    Ok(())
}
