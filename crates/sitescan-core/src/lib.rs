//! # sitescan-core
//!
//! Core functionality for sitescan: find every page a website publishes
//! through its XML sitemaps, starting from nothing more than a URL.
//!
//! ## Architecture
//!
//! - **Resolver**: the discovery fallback chain and recursive index expansion
//! - **Robots**: `robots.txt` retrieval, directive extraction and path rules
//! - **Sitemap**: namespace-tolerant parsing of `urlset` and `sitemapindex`
//! - **Fetcher**: the HTTP seam, with a `reqwest` implementation
//! - **Configuration**: client settings from TOML and the environment
//! - **Error Handling**: categorized error types with recovery hints
//!
//! Discovery itself never fails. Every network or parse problem shrinks the
//! result instead; errors only surface while building a resolver.
//!
//! ## Quick Start
//!
//! ```no_run
//! use futures::StreamExt;
//! use sitescan_core::{Config, SitemapResolver, parse_start_url};
//!
//! # async fn run() -> sitescan_core::Result<()> {
//! let resolver = SitemapResolver::from_config(&Config::default())?;
//! let pages: Vec<_> = resolver
//!     .discover(parse_start_url("https://example.com")?)
//!     .take(100)
//!     .collect()
//!     .await;
//!
//! println!("Found {} pages", pages.len());
//! # Ok(())
//! # }
//! ```

/// Client settings loaded from TOML and environment variables
pub mod config;
/// Error types and result aliases
pub mod error;
/// HTTP collaborator trait and its reqwest implementation
pub mod fetcher;
/// Sitemap discovery fallback chain
pub mod resolver;
/// robots.txt retrieval and directive extraction
pub mod robots;
/// Sitemap XML parsing
pub mod sitemap;
/// Core data types and structures
pub mod types;

// Re-export commonly used types
pub use config::{Config, DEFAULT_SITEMAP_PATHS};
pub use error::{Error, Result};
pub use fetcher::{Fetched, HttpFetch, HttpResponse, Probe, ReqwestFetcher, fetch_text, probe_exists};
pub use resolver::SitemapResolver;
pub use robots::{RobotsReader, RobotsRules};
pub use sitemap::{IMAGE_NAMESPACE, SITEMAP_NAMESPACES, SitemapDocument, parse_document, parse_lastmod};
pub use types::*;
