//! Sitemap discovery for a single start URL.
//!
//! [`SitemapResolver::discover`] turns a URL into a lazy stream of
//! [`PageEntry`] values using this fallback chain:
//!
//! 1. **Direct** - fetch the URL itself and parse it as a sitemap document
//! 2. **robots.txt** - discover every `Sitemap:` URL declared for the origin
//! 3. **Default paths** - probe `/sitemap.xml` then `/sitemap_index.xml`
//!
//! A later stage only runs when the earlier ones produced nothing: a direct
//! hit stops the chain, and a single robots.txt declaration (even a broken
//! one) suppresses default-path probing. Sitemap index documents are expanded
//! depth-first in document order.
//!
//! Requests are only issued while the stream is polled, so dropping it stops
//! all network activity. Each call owns its own traversal state: a visited
//! set that keeps cyclic indexes from recursing forever, and a cancellation
//! token raced against every request.
//!
//! ```no_run
//! use futures::StreamExt;
//! use sitescan_core::{Config, SitemapResolver};
//! use url::Url;
//!
//! # async fn example() -> sitescan_core::Result<()> {
//! let resolver = SitemapResolver::from_config(&Config::default())?;
//! let mut pages = resolver.discover(Url::parse("https://example.com")?);
//!
//! while let Some(page) = pages.next().await {
//!     println!("{} {:?}", page.location, page.lastmod);
//! }
//! # Ok(())
//! # }
//! ```

use crate::fetcher::{Fetched, HttpFetch, Probe, fetch_text, probe_exists};
use crate::robots::RobotsReader;
use crate::sitemap::{SitemapDocument, parse_document};
use crate::types::PageEntry;
use crate::{Config, ReqwestFetcher, Result};
use async_stream::stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Resolves start URLs into streams of page entries.
pub struct SitemapResolver {
    fetcher: Arc<dyn HttpFetch>,
    robots: RobotsReader,
    default_paths: Vec<String>,
}

impl std::fmt::Debug for SitemapResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SitemapResolver")
            .field("default_paths", &self.default_paths)
            .finish_non_exhaustive()
    }
}

impl SitemapResolver {
    /// Resolver over an existing HTTP collaborator, probing the standard
    /// default paths.
    #[must_use]
    pub fn new(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            robots: RobotsReader::new(Arc::clone(&fetcher)),
            fetcher,
            default_paths: Config::default().default_paths,
        }
    }

    /// Resolver with a `reqwest` client built from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = ReqwestFetcher::new(config)?;
        Ok(Self::new(Arc::new(fetcher)).with_default_paths(config.default_paths.iter().cloned()))
    }

    /// Replace the root-relative candidates probed when nothing is declared.
    #[must_use]
    pub fn with_default_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Discover every page reachable from `url` through sitemaps.
    ///
    /// The stream is empty when no sitemap exists; failures never surface.
    /// It is not restartable: calling `discover` again re-fetches everything.
    pub fn discover(&self, url: Url) -> BoxStream<'_, PageEntry> {
        self.discover_with_cancel(url, CancellationToken::new())
    }

    /// Like [`discover`](Self::discover), but stops issuing requests once
    /// `cancel` fires. Entries already parsed from a fetched document may
    /// still be yielded; no further document is fetched.
    pub fn discover_with_cancel(
        &self,
        url: Url,
        cancel: CancellationToken,
    ) -> BoxStream<'_, PageEntry> {
        let traversal = Traversal::new(cancel);
        Box::pin(stream! {
            info!(url = %url, "Starting sitemap discovery");
            let mut entries = self.resolve(url.clone(), traversal.clone());
            let mut count = 0usize;
            while let Some(entry) = entries.next().await {
                count += 1;
                yield entry;
            }
            info!(
                url = %url,
                entries = count,
                cancelled = traversal.cancel.is_cancelled(),
                "Sitemap discovery finished"
            );
        })
    }

    /// Full fallback chain for one URL.
    fn resolve(&self, url: Url, traversal: Traversal) -> BoxStream<'_, PageEntry> {
        Box::pin(stream! {
            if !traversal.visit(&url).await {
                debug!(url = %url, "Already visited, skipping");
                return;
            }

            match self.load(&url, &traversal).await {
                Some(Loaded::Document(document)) => {
                    let mut entries = self.expand(document, traversal.clone());
                    while let Some(entry) = entries.next().await {
                        yield entry;
                    }
                    return;
                },
                Some(Loaded::NotSitemap) => {},
                Some(Loaded::AlreadyVisited) | None => return,
            }

            debug!(url = %url, "Not a sitemap, consulting robots.txt");
            let Some(declared) = traversal.guard(self.robots.discover_sitemaps(&url)).await else {
                return;
            };

            for sitemap in &declared {
                let mut entries = self.resolve(sitemap.clone(), traversal.clone());
                while let Some(entry) = entries.next().await {
                    yield entry;
                }
                if traversal.cancel.is_cancelled() {
                    return;
                }
            }

            if !declared.is_empty() {
                return;
            }

            debug!(url = %url, "No robots.txt sitemaps, probing default paths");
            let mut accepted: HashSet<Url> = HashSet::new();
            for path in &self.default_paths {
                let candidate = match url.join(path) {
                    Ok(candidate) => candidate,
                    Err(e) => {
                        warn!(path = %path, error = %e, "Skipping unusable default path");
                        continue;
                    },
                };

                let Some(probe) = traversal
                    .guard(probe_exists(self.fetcher.as_ref(), &candidate))
                    .await
                else {
                    return;
                };
                let Probe::Exists { final_url } = probe else {
                    continue;
                };
                if !accepted.insert(visit_key(&final_url)) {
                    debug!(candidate = %candidate, final_url = %final_url, "Default path resolves to an accepted sitemap");
                    continue;
                }

                info!(candidate = %candidate, "Found sitemap at default path");
                let mut entries = self.fetch_and_expand(candidate, traversal.clone());
                while let Some(entry) = entries.next().await {
                    yield entry;
                }
            }
        })
    }

    /// Fetch one sitemap and expand it, without any fallback.
    fn fetch_and_expand(&self, url: Url, traversal: Traversal) -> BoxStream<'_, PageEntry> {
        Box::pin(stream! {
            if !traversal.visit(&url).await {
                debug!(url = %url, "Already visited, skipping");
                return;
            }

            if let Some(Loaded::Document(document)) = self.load(&url, &traversal).await {
                let mut entries = self.expand(document, traversal.clone());
                while let Some(entry) = entries.next().await {
                    yield entry;
                }
            }
        })
    }

    /// Yield a urlset's entries, or recurse depth-first into an index.
    fn expand(&self, document: SitemapDocument, traversal: Traversal) -> BoxStream<'_, PageEntry> {
        Box::pin(stream! {
            match document {
                SitemapDocument::UrlSet(entries) => {
                    for entry in entries {
                        yield entry;
                    }
                },
                SitemapDocument::Index(children) => {
                    for child in children {
                        if traversal.cancel.is_cancelled() {
                            return;
                        }
                        let mut entries = self.fetch_and_expand(child, traversal.clone());
                        while let Some(entry) = entries.next().await {
                            yield entry;
                        }
                    }
                },
                SitemapDocument::Unrecognized => {},
            }
        })
    }

    /// Fetch and parse `url`, which the caller has already marked visited.
    ///
    /// Returns `None` when cancelled.
    async fn load(&self, url: &Url, traversal: &Traversal) -> Option<Loaded> {
        let fetched = traversal.guard(fetch_text(self.fetcher.as_ref(), url)).await?;
        let Fetched::Found { final_url, body } = fetched else {
            return Some(Loaded::NotSitemap);
        };

        if visit_key(&final_url) != visit_key(url) && !traversal.visit(&final_url).await {
            debug!(url = %url, final_url = %final_url, "Redirected to an already visited sitemap");
            return Some(Loaded::AlreadyVisited);
        }

        Some(match parse_document(&body) {
            Ok(SitemapDocument::Unrecognized) => {
                debug!(url = %final_url, "XML root is neither urlset nor sitemapindex");
                Loaded::NotSitemap
            },
            Ok(document) => Loaded::Document(document),
            Err(e) => {
                debug!(url = %final_url, error = %e, "Response is not a sitemap document");
                Loaded::NotSitemap
            },
        })
    }
}

/// Result of fetching a candidate sitemap.
#[derive(Debug)]
enum Loaded {
    Document(SitemapDocument),
    NotSitemap,
    AlreadyVisited,
}

/// Per-call traversal state shared by every nested stream of one discovery.
#[derive(Clone)]
struct Traversal {
    visited: Arc<Mutex<HashSet<Url>>>,
    cancel: CancellationToken,
}

impl Traversal {
    fn new(cancel: CancellationToken) -> Self {
        Self {
            visited: Arc::new(Mutex::new(HashSet::new())),
            cancel,
        }
    }

    /// Record `url`; `false` if it was already seen in this traversal.
    async fn visit(&self, url: &Url) -> bool {
        self.visited.lock().await.insert(visit_key(url))
    }

    /// Run `fut` unless cancellation fires first.
    async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            output = fut => Some(output),
        }
    }
}

/// Fragments never reach the server, so they don't distinguish documents.
fn visit_key(url: &Url) -> Url {
    let mut key = url.clone();
    key.set_fragment(None);
    key
}
