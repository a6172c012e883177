//! Configuration for sitemap discovery.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. **Defaults**: [`Config::default`]
//! 2. **TOML file**: [`Config::load`] or [`Config::from_toml_str`]
//! 3. **Environment variables**: `SITESCAN_*` prefix, see [`Config::apply_env_overrides`]
//!
//! ## Example Configuration File
//!
//! ```toml
//! user_agent = "examplebot/1.0 (+https://example.com/bot)"
//! timeout_secs = 15
//! max_redirects = 3
//! default_paths = ["/sitemap.xml", "/sitemap_index.xml", "/sitemap-index.xml"]
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`Config::user_agent`].
pub const ENV_USER_AGENT: &str = "SITESCAN_USER_AGENT";
/// Environment variable overriding [`Config::timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "SITESCAN_TIMEOUT_SECS";
/// Environment variable overriding [`Config::max_redirects`].
pub const ENV_MAX_REDIRECTS: &str = "SITESCAN_MAX_REDIRECTS";

/// Conventional sitemap locations probed when nothing is declared.
pub const DEFAULT_SITEMAP_PATHS: [&str; 2] = ["/sitemap.xml", "/sitemap_index.xml"];

/// Settings for the HTTP collaborator and the default-path fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Per-request timeout in seconds. Applies to GET and HEAD alike.
    pub timeout_secs: u64,

    /// Maximum redirects followed before a request is treated as failed.
    pub max_redirects: usize,

    /// Root-relative candidate paths, probed in order when neither the start
    /// URL nor robots.txt yields a sitemap.
    pub default_paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: concat!("sitescan/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            max_redirects: 5,
            default_paths: DEFAULT_SITEMAP_PATHS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text. Missing keys keep their defaults.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sitescan_core::Config;
    ///
    /// let config = Config::from_toml_str("timeout_secs = 10")?;
    /// assert_eq!(config.timeout_secs, 10);
    /// assert_eq!(config.max_redirects, 5);
    /// # Ok::<(), sitescan_core::Error>(())
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist. Environment overrides are applied afterwards.
    ///
    /// An unreadable file is [`Error::Io`]; invalid TOML is
    /// [`Error::Serialization`].
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `SITESCAN_*` environment variables on top of the current values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(agent) = lookup(ENV_USER_AGENT) {
            self.user_agent = agent;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{ENV_TIMEOUT_SECS}={raw}: {e}")))?;
        }
        if let Some(raw) = lookup(ENV_MAX_REDIRECTS) {
            self.max_redirects = raw
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{ENV_MAX_REDIRECTS}={raw}: {e}")))?;
        }
        self.validate()
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("user_agent must not be empty".into()));
        }
        if self.default_paths.is_empty() {
            return Err(Error::Config(
                "default_paths must list at least one candidate".into(),
            ));
        }
        if let Some(bad) = self.default_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(Error::Config(format!(
                "default path '{bad}' must be root-relative (start with '/')"
            )));
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
