//! # CLI Structure and Argument Parsing
//!
//! ```bash
//! # Every page reachable through the site's sitemaps
//! sitescan pages https://example.com
//!
//! # First 50 pages as newline-delimited JSON
//! sitescan pages https://example.com --limit 50 --format jsonl
//!
//! # What robots.txt declares, and what it says to one crawler
//! sitescan robots https://example.com --agent Googlebot
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Main CLI structure for the `sitescan` command
#[derive(Parser, Clone, Debug)]
#[command(name = "sitescan")]
#[command(version)]
#[command(about = "sitescan - Discover the pages a website publishes through its sitemaps", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logs, including every fallback step and swallowed failure
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also honours `NO_COLOR`)
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Stream every page discovered from a start URL
    Pages(PagesArgs),

    /// Show the sitemaps a site's robots.txt declares
    Robots(RobotsArgs),
}

/// Arguments for `sitescan pages`
#[derive(Args, Clone, Debug)]
pub struct PagesArgs {
    /// Site root, page, or sitemap URL to start from
    pub url: String,

    /// Stop after this many pages
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(short = 'c', long, env = "SITESCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// User-Agent header to send (overrides config)
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Arguments for `sitescan robots`
#[derive(Args, Clone, Debug)]
pub struct RobotsArgs {
    /// Any URL on the site; robots.txt is read from its origin
    pub url: String,

    /// Also print the directive lines scoped to this user agent
    #[arg(short = 'a', long)]
    pub agent: Option<String>,

    /// TOML configuration file
    #[arg(short = 'c', long, env = "SITESCAN_CONFIG")]
    pub config: Option<PathBuf>,
}
