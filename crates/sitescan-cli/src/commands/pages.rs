//! `sitescan pages`: stream discovered page entries to stdout.

use anyhow::Result;
use futures::StreamExt;
use sitescan_core::{SitemapResolver, parse_start_url};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::load_config;
use crate::cli::PagesArgs;
use crate::output::PageWriter;

pub async fn execute(args: &PagesArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(user_agent) = &args.user_agent {
        config.user_agent.clone_from(user_agent);
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }

    let start = parse_start_url(&args.url)?;
    let resolver = SitemapResolver::from_config(&config)?;

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping discovery");
                cancel.cancel();
            }
        }
    });

    let mut pages = resolver.discover_with_cancel(start, cancel.clone());
    if let Some(limit) = args.limit {
        pages = pages.take(limit).boxed();
    }

    let stdout = std::io::stdout();
    let mut writer = PageWriter::new(stdout.lock(), args.format);
    while let Some(entry) = pages.next().await {
        writer.write(entry)?;
    }
    let count = writer.finish()?;
    interrupt.abort();

    if count == 0 && !cancel.is_cancelled() {
        warn!(url = %args.url, "No sitemap entries found");
    } else {
        info!(count, "Listed pages");
    }
    Ok(())
}
