//! Command implementations

mod pages;
mod robots;

pub use pages::execute as pages;
pub use robots::execute as robots;

use anyhow::{Context, Result, bail};
use sitescan_core::Config;
use std::path::Path;

/// Config from `--config` (which must exist) or defaults, with `SITESCAN_*`
/// environment overrides applied either way.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            Config::load(path).with_context(|| format!("Failed to load {}", path.display()))
        },
        None => {
            let mut config = Config::default();
            config.apply_env_overrides()?;
            Ok(config)
        },
    }
}
