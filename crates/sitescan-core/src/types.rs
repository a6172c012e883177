//! Core data types produced by discovery.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A page discovered through a sitemap.
///
/// Entries are only produced from `urlset` documents. Two sitemaps listing
/// the same page yield two entries; there is no deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    /// Absolute location of the page.
    pub location: Url,
    /// Last modification time, when the sitemap declares a parseable one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<DateTime<Utc>>,
    /// How frequently the page changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<ChangeFrequency>,
    /// Priority of this URL relative to others on the site (0.0 to 1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f32>,
    /// First image attached through the image sitemap extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageEntry>,
}

impl PageEntry {
    /// Entry with only a location.
    #[must_use]
    pub const fn new(location: Url) -> Self {
        Self {
            location,
            lastmod: None,
            changefreq: None,
            priority: None,
            image: None,
        }
    }
}

/// Image reference from `<image:image>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    /// Absolute location of the image.
    pub location: Url,
    /// `<image:title>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `<image:caption>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Change frequency hints from sitemap.
///
/// Crawlers treat these as hints only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    /// Changes every time it is accessed.
    Always,
    /// Changes hourly.
    Hourly,
    /// Changes daily.
    Daily,
    /// Changes weekly.
    Weekly,
    /// Changes monthly.
    Monthly,
    /// Changes yearly.
    Yearly,
    /// Archived.
    Never,
}

impl std::str::FromStr for ChangeFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            _ => Err(Error::Parse(format!("Invalid changefreq value: {s}"))),
        }
    }
}

/// Parse a start URL, rejecting relative input.
///
/// # Examples
///
/// ```rust
/// use sitescan_core::parse_start_url;
///
/// assert!(parse_start_url("https://example.com").is_ok());
/// assert!(parse_start_url("example.com/sitemap.xml").is_err());
/// ```
pub fn parse_start_url(input: &str) -> Result<Url> {
    let url = Url::parse(input.trim())?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::InvalidUrl(format!(
            "'{input}' has no host to discover sitemaps on"
        )));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_changefreq_parsing_is_case_insensitive() {
        let cases = [
            ("always", ChangeFrequency::Always),
            ("Hourly", ChangeFrequency::Hourly),
            ("DAILY", ChangeFrequency::Daily),
            (" weekly ", ChangeFrequency::Weekly),
            ("monthly", ChangeFrequency::Monthly),
            ("yearly", ChangeFrequency::Yearly),
            ("never", ChangeFrequency::Never),
        ];

        for (value, expected) in cases {
            assert_eq!(value.parse::<ChangeFrequency>().unwrap(), expected, "{value}");
        }
    }

    #[test]
    fn test_changefreq_invalid_value() {
        assert!("fortnightly".parse::<ChangeFrequency>().is_err());
    }

    #[test]
    fn test_page_entry_serializes_camel_case_and_skips_absent_fields() {
        let entry = PageEntry {
            lastmod: Some(
                DateTime::parse_from_rfc3339("2024-01-15T10:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            ),
            changefreq: Some(ChangeFrequency::Weekly),
            ..PageEntry::new(Url::parse("https://example.com/a").unwrap())
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"location\":\"https://example.com/a\""));
        assert!(json.contains("\"changefreq\":\"weekly\""));
        assert!(!json.contains("priority"));
        assert!(!json.contains("image"));

        let parsed: PageEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_parse_start_url() {
        assert_eq!(
            parse_start_url("  https://example.com/docs ").unwrap().as_str(),
            "https://example.com/docs"
        );
        assert!(matches!(
            parse_start_url("/sitemap.xml"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_start_url("mailto:someone@example.com"),
            Err(Error::InvalidUrl(_))
        ));
    }
}
