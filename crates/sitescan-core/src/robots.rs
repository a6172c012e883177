//! robots.txt reading.
//!
//! [`RobotsReader`] fetches `{origin}/robots.txt`; the free functions
//! interpret its text. Sitemap discovery only consumes the global
//! `Sitemap:` directives, while [`extract_user_agent_lines`] and
//! [`RobotsRules`] expose agent-scoped directives for callers that need them.
//!
//! ```
//! use sitescan_core::robots::{extract_sitemap_urls, extract_user_agent_lines};
//!
//! let txt = "User-agent: examplebot\nDisallow: /private\n\nSitemap: https://example.com/sitemap.xml\n";
//!
//! let sitemaps: Vec<_> = extract_sitemap_urls(txt).collect();
//! assert_eq!(sitemaps[0].as_str(), "https://example.com/sitemap.xml");
//!
//! let scoped: Vec<_> = extract_user_agent_lines(txt, "ExampleBot").collect();
//! assert_eq!(scoped, vec!["Disallow: /private", "Sitemap: https://example.com/sitemap.xml"]);
//! ```

use crate::fetcher::{Fetched, HttpFetch, fetch_text};
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

const USER_AGENT_PREFIX: &str = "user-agent:";
const SITEMAP_PREFIX: &str = "sitemap:";

/// Fetches robots.txt and extracts sitemap declarations.
#[derive(Clone)]
pub struct RobotsReader {
    fetcher: Arc<dyn HttpFetch>,
}

impl std::fmt::Debug for RobotsReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotsReader").finish_non_exhaustive()
    }
}

impl RobotsReader {
    /// Create a reader over the given HTTP collaborator.
    #[must_use]
    pub fn new(fetcher: Arc<dyn HttpFetch>) -> Self {
        Self { fetcher }
    }

    /// GET `{origin}/robots.txt`. Any failure yields `None`.
    #[instrument(skip(self), fields(origin = %origin))]
    pub async fn fetch_raw(&self, origin: &Url) -> Option<String> {
        let robots_url = robots_url(origin)?;
        match fetch_text(self.fetcher.as_ref(), &robots_url).await {
            Fetched::Found { body, .. } => Some(body),
            Fetched::NotFound => None,
        }
    }

    /// Sitemap URLs declared in the origin's robots.txt, in file order.
    ///
    /// A missing or unreadable robots.txt yields an empty list.
    pub async fn discover_sitemaps(&self, origin: &Url) -> Vec<Url> {
        let Some(text) = self.fetch_raw(origin).await else {
            return Vec::new();
        };
        let sitemaps: Vec<Url> = extract_sitemap_urls(&text).collect();
        debug!(origin = %origin, count = sitemaps.len(), "robots.txt sitemap directives");
        sitemaps
    }
}

/// `robots.txt` at the root of `url`'s origin.
pub fn robots_url(url: &Url) -> Option<Url> {
    url.join("/robots.txt").ok()
}

/// Non-blank, non-comment lines, trimmed, in order.
pub fn extract_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Lines inside `User-agent:` sections whose agent matches `agent`
/// case-insensitively. The `User-agent:` lines themselves are not yielded.
///
/// Every `User-agent:` line closes the previous section, so consecutive
/// agent lines only keep the last one active. Repeated sections for the same
/// agent are each yielded in file order.
pub fn extract_user_agent_lines<'a>(text: &'a str, agent: &'a str) -> impl Iterator<Item = &'a str> {
    let mut active = false;
    extract_lines(text).filter(move |line| match directive_value(line, USER_AGENT_PREFIX) {
        Some(value) => {
            active = value.eq_ignore_ascii_case(agent.trim());
            false
        },
        None => active,
    })
}

/// Absolute URLs of every `Sitemap:` directive, regardless of section.
/// Values that do not parse as absolute URLs are skipped.
pub fn extract_sitemap_urls(text: &str) -> impl Iterator<Item = Url> + '_ {
    extract_lines(text)
        .filter_map(|line| directive_value(line, SITEMAP_PREFIX))
        .filter_map(|value| match Url::parse(value) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!(value = %value, error = %e, "Skipping invalid Sitemap directive");
                None
            },
        })
}

/// Value after a case-insensitive `prefix`, trimmed.
fn directive_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| line[prefix.len()..].trim())
}

/// Allow/disallow rules that apply to a single user agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotsRules {
    /// `Allow:` path patterns.
    pub allowed: Vec<String>,
    /// `Disallow:` path patterns.
    pub disallowed: Vec<String>,
    /// `Crawl-delay:` in seconds.
    pub crawl_delay: Option<f32>,
}

impl RobotsRules {
    /// Interpret the directive lines scoped to `agent`.
    #[must_use]
    pub fn for_agent(text: &str, agent: &str) -> Self {
        let mut rules = Self::default();

        for line in extract_user_agent_lines(text, agent) {
            // Inline comments
            let line = line.split('#').next().unwrap_or_default().trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_ascii_lowercase().as_str() {
                "allow" if !value.is_empty() => rules.allowed.push(value.to_string()),
                "disallow" if !value.is_empty() => rules.disallowed.push(value.to_string()),
                "crawl-delay" => rules.crawl_delay = value.parse().ok(),
                _ => {},
            }
        }

        rules
    }

    /// Whether `path` may be crawled. The longest matching pattern wins;
    /// allow wins a tie.
    #[must_use]
    pub fn is_allowed(&self, path: &str) -> bool {
        let longest = |patterns: &[String]| {
            patterns
                .iter()
                .filter(|p| path_matches(path, p))
                .map(String::len)
                .max()
        };

        match (longest(&self.allowed), longest(&self.disallowed)) {
            (Some(allow), Some(disallow)) => allow >= disallow,
            (_, Some(_)) => false,
            _ => true,
        }
    }
}

/// Prefix match where `*` spans any run of characters and a trailing `$`
/// anchors the pattern at the end of the path.
fn path_matches(path: &str, pattern: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(body) => (body, true),
        None => (pattern, false),
    };

    let mut pieces = pattern.split('*');
    let Some(mut rest) = pieces.next().and_then(|head| path.strip_prefix(head)) else {
        return false;
    };
    let pieces: Vec<&str> = pieces.collect();
    let Some((last, middle)) = pieces.split_last() else {
        return !anchored || rest.is_empty();
    };

    for piece in middle {
        match rest.find(piece) {
            Some(at) => rest = &rest[at + piece.len()..],
            None => return false,
        }
    }

    if anchored {
        rest.ends_with(last)
    } else {
        rest.contains(last)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::{Config, ReqwestFetcher};
    use proptest::prelude::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE: &str = "\
# robots for example.com
User-agent: *
Disallow: /admin

User-agent: examplebot
Disallow: /private/
Allow: /private/public/
Crawl-delay: 2.5

User-agent: otherbot
Disallow: /

  # trailing section
User-agent: ExampleBot
Disallow: /drafts

Sitemap: https://example.com/sitemap.xml
sitemap:   https://example.com/news.xml
Sitemap: /relative.xml
";

    fn reader() -> RobotsReader {
        RobotsReader::new(Arc::new(ReqwestFetcher::new(&Config::default()).unwrap()))
    }

    #[test]
    fn test_extract_lines_drops_comments_and_blanks() {
        let lines: Vec<_> = extract_lines("  # comment\n\n  User-agent: *  \n\t\nDisallow: /x\n").collect();
        assert_eq!(lines, vec!["User-agent: *", "Disallow: /x"]);
    }

    #[test]
    fn test_user_agent_sections_are_scoped() {
        let lines: Vec<_> = extract_user_agent_lines(SAMPLE, "examplebot").collect();
        assert_eq!(
            lines,
            vec![
                "Disallow: /private/",
                "Allow: /private/public/",
                "Crawl-delay: 2.5",
                "Disallow: /drafts",
                "Sitemap: https://example.com/sitemap.xml",
                "sitemap:   https://example.com/news.xml",
                "Sitemap: /relative.xml",
            ]
        );
    }

    #[test]
    fn test_user_agent_match_is_case_insensitive() {
        let upper: Vec<_> = extract_user_agent_lines(SAMPLE, "EXAMPLEBOT").collect();
        let lower: Vec<_> = extract_user_agent_lines(SAMPLE, "examplebot").collect();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_unknown_agent_yields_nothing() {
        let text = "User-agent: a\nDisallow: /a\nUser-agent: b\nDisallow: /b\n";
        assert_eq!(extract_user_agent_lines(text, "c").count(), 0);
    }

    #[test]
    fn test_wildcard_agent_is_matched_literally() {
        let lines: Vec<_> = extract_user_agent_lines(SAMPLE, "*").collect();
        assert_eq!(lines, vec!["Disallow: /admin"]);
    }

    #[test]
    fn test_extract_sitemap_urls_skips_relative_values() {
        let urls: Vec<_> = extract_sitemap_urls(SAMPLE).map(String::from).collect();
        assert_eq!(
            urls,
            vec!["https://example.com/sitemap.xml", "https://example.com/news.xml"]
        );
    }

    #[test]
    fn test_rules_for_agent() {
        let rules = RobotsRules::for_agent(SAMPLE, "examplebot");

        assert_eq!(rules.disallowed, vec!["/private/", "/drafts"]);
        assert_eq!(rules.allowed, vec!["/private/public/"]);
        assert_eq!(rules.crawl_delay, Some(2.5));

        assert!(rules.is_allowed("/"));
        assert!(!rules.is_allowed("/private/secret"));
        assert!(rules.is_allowed("/private/public/page"));
        assert!(!rules.is_allowed("/drafts/2024"));
    }

    #[test]
    fn test_path_pattern_anchors() {
        let rules = RobotsRules {
            disallowed: vec![
                "/*.pdf$".to_string(),
                "/tmp*".to_string(),
                "/exact$".to_string(),
                "/private*/x".to_string(),
            ],
            ..RobotsRules::default()
        };

        assert!(!rules.is_allowed("/tmpfiles"));
        assert!(!rules.is_allowed("/exact"));
        assert!(rules.is_allowed("/exact/child"));

        assert!(!rules.is_allowed("/doc.pdf"));
        assert!(!rules.is_allowed("/reports/2024/q1.pdf"));
        assert!(rules.is_allowed("/doc.pdf?download=1"));
        assert!(rules.is_allowed("/pdfs/index.html"));

        assert!(!rules.is_allowed("/private1/x"));
        assert!(!rules.is_allowed("/private/a/b/x/y"));
        assert!(rules.is_allowed("/private1/y"));
    }

    #[test]
    fn test_longest_wildcard_match_wins() {
        let rules = RobotsRules {
            allowed: vec!["/shop/*/public".to_string()],
            disallowed: vec!["/shop/".to_string()],
            ..RobotsRules::default()
        };

        assert!(rules.is_allowed("/shop/items/public"));
        assert!(!rules.is_allowed("/shop/items/cart"));
    }

    #[test]
    fn test_robots_url_is_origin_rooted() {
        let url = Url::parse("https://example.com:8443/docs/guide?q=1").unwrap();
        assert_eq!(
            robots_url(&url).unwrap().as_str(),
            "https://example.com:8443/robots.txt"
        );
    }

    #[tokio::test]
    async fn test_discover_sitemaps_from_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE))
            .mount(&server)
            .await;

        let origin = Url::parse(&format!("{}/some/page", server.uri())).unwrap();
        let sitemaps = reader().discover_sitemaps(&origin).await;

        assert_eq!(sitemaps.len(), 2);
        assert_eq!(sitemaps[1].path(), "/news.xml");
    }

    #[tokio::test]
    async fn test_missing_robots_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let origin = Url::parse(&server.uri()).unwrap();
        assert!(reader().fetch_raw(&origin).await.is_none());
        assert!(reader().discover_sitemaps(&origin).await.is_empty());
    }

    proptest! {
        #[test]
        fn test_extracted_lines_are_trimmed_and_never_comments(text in r"[ \t#a-zA-Z:/\n]{0,200}") {
            for line in extract_lines(&text) {
                prop_assert!(!line.is_empty());
                prop_assert!(!line.starts_with('#'));
                prop_assert_eq!(line, line.trim());
            }
        }

        #[test]
        fn test_scoped_lines_never_include_agent_lines(text in r"(User-agent: [ab]\n|Disallow: /[a-z]{0,3}\n){0,12}") {
            for line in extract_user_agent_lines(&text, "a") {
                prop_assert!(!line.to_ascii_lowercase().starts_with("user-agent:"));
            }
        }
    }
}
