//! HTTP collaborator used by discovery.
//!
//! Discovery only needs two verbs: a GET that returns text and a cheap
//! existence check. Both report the final URL after redirects, which the
//! default-path prober uses to spot candidates that collapse onto the same
//! document.
//!
//! [`HttpFetch`] is the seam; [`ReqwestFetcher`] is the production
//! implementation. Transport failures are turned into explicit
//! [`Fetched::NotFound`] / [`Probe::Missing`] values by [`fetch_text`] and
//! [`probe_exists`] so callers never branch on errors.

use crate::{Config, Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Response returned by an [`HttpFetch`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code of the final response in the redirect chain.
    pub status: u16,
    /// URL the response was actually served from.
    pub final_url: Url,
    /// Decoded body text; empty for HEAD requests.
    pub body: String,
}

impl HttpResponse {
    /// `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Minimal HTTP capability required by the resolver and robots reader.
///
/// Implementations must follow redirects and report the final URL.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Issue a GET and read the body as text.
    async fn get(&self, url: &Url) -> Result<HttpResponse>;

    /// Issue a HEAD request.
    async fn head(&self, url: &Url) -> Result<HttpResponse>;
}

/// [`HttpFetch`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Build a fetcher from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one owned by the surrounding application.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &Url) -> Result<HttpResponse> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            final_url,
            body,
        })
    }

    async fn head(&self, url: &Url) -> Result<HttpResponse> {
        let response = self.client.head(url.clone()).send().await?;

        Ok(HttpResponse {
            status: response.status().as_u16(),
            final_url: response.url().clone(),
            body: String::new(),
        })
    }
}

/// Outcome of a GET where failure means "absent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// A 2xx response with its body.
    Found {
        /// URL after redirects.
        final_url: Url,
        /// Body text.
        body: String,
    },
    /// Transport error or non-2xx status.
    NotFound,
}

/// Outcome of an existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The resource answered HEAD with a 2xx status.
    Exists {
        /// URL after redirects.
        final_url: Url,
    },
    /// Transport error or non-2xx status.
    Missing,
}

/// GET `url`, folding every failure into [`Fetched::NotFound`].
pub async fn fetch_text(fetcher: &dyn HttpFetch, url: &Url) -> Fetched {
    match fetcher.get(url).await {
        Ok(response) if response.is_success() => Fetched::Found {
            final_url: response.final_url,
            body: response.body,
        },
        Ok(response) => {
            debug!(url = %url, status = response.status, "GET returned non-success status");
            Fetched::NotFound
        },
        Err(e) => {
            debug!(url = %url, error = %e, "GET failed");
            Fetched::NotFound
        },
    }
}

/// HEAD `url`, folding every failure into [`Probe::Missing`].
pub async fn probe_exists(fetcher: &dyn HttpFetch, url: &Url) -> Probe {
    match fetcher.head(url).await {
        Ok(response) if response.is_success() => Probe::Exists {
            final_url: response.final_url,
        },
        Ok(response) => {
            debug!(url = %url, status = response.status, "HEAD returned non-success status");
            Probe::Missing
        },
        Err(e) => {
            debug!(url = %url, error = %e, "HEAD failed");
            Probe::Missing
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> ReqwestFetcher {
        ReqwestFetcher::new(&Config::default()).unwrap()
    }

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{p}", server.uri())).unwrap()
    }

    #[test]
    fn test_fetcher_rejects_invalid_config() {
        let config = Config {
            timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(ReqwestFetcher::new(&config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_fetch_text_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *"))
            .mount(&server)
            .await;

        let target = url(&server, "/robots.txt");
        match fetch_text(&fetcher(), &target).await {
            Fetched::Found { final_url, body } => {
                assert_eq!(final_url, target);
                assert_eq!(body, "User-agent: *");
            },
            Fetched::NotFound => panic!("expected body"),
        }
    }

    #[tokio::test]
    async fn test_fetch_text_maps_error_status_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let result = fetch_text(&fetcher(), &url(&server, "/sitemap.xml")).await;
        assert_eq!(result, Fetched::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_text_maps_connection_error_to_not_found() {
        // Port 9 (discard) on loopback is not expected to accept HTTP.
        let target = Url::parse("http://127.0.0.1:9/sitemap.xml").unwrap();
        assert_eq!(fetch_text(&fetcher(), &target).await, Fetched::NotFound);
    }

    #[tokio::test]
    async fn test_probe_reports_final_url_after_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/sitemap_index.xml"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/sitemap.xml"))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        match probe_exists(&fetcher(), &url(&server, "/sitemap_index.xml")).await {
            Probe::Exists { final_url } => assert_eq!(final_url.path(), "/sitemap.xml"),
            Probe::Missing => panic!("redirect chain ending in 200 should exist"),
        }
    }

    #[tokio::test]
    async fn test_probe_missing_on_404() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert_eq!(
            probe_exists(&fetcher(), &url(&server, "/sitemap.xml")).await,
            Probe::Missing
        );
    }
}
