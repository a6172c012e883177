//! Sitemap XML parsing.
//!
//! Turns one fetched document into either the child sitemap references of a
//! `<sitemapindex>` or the page entries of a `<urlset>`. Recursion over
//! child references is the resolver's job; this module never touches the
//! network.
//!
//! ## Namespace tolerance
//!
//! The Sitemaps protocol namespace is `http://www.sitemaps.org/schemas/sitemap/0.9`,
//! but plenty of sites publish the `https://` spelling or omit the namespace
//! entirely. Elements are matched by local name when their resolved namespace
//! is any of [`SITEMAP_NAMESPACES`] or no namespace at all. Image extension
//! elements are matched under [`IMAGE_NAMESPACE`]. Everything else is ignored.
//!
//! ```
//! use sitescan_core::{SitemapDocument, parse_document};
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="https://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url><loc>https://example.com/page1</loc></url>
//! </urlset>"#;
//!
//! let SitemapDocument::UrlSet(entries) = parse_document(xml)? else {
//!     panic!("expected a urlset");
//! };
//! assert_eq!(entries[0].location.as_str(), "https://example.com/page1");
//! # Ok::<(), sitescan_core::Error>(())
//! ```

use crate::types::{ImageEntry, PageEntry};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use tracing::{debug, instrument};
use url::Url;

/// Accepted spellings of the Sitemaps schema namespace, in lookup order.
pub const SITEMAP_NAMESPACES: [&str; 2] = [
    "http://www.sitemaps.org/schemas/sitemap/0.9",
    "https://www.sitemaps.org/schemas/sitemap/0.9",
];

/// Google image sitemap extension namespace.
pub const IMAGE_NAMESPACE: &str = "http://www.google.com/schemas/sitemap-image/1.1";

/// A parsed sitemap document.
#[derive(Debug, Clone, PartialEq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: absolute URLs of child sitemaps in document order.
    Index(Vec<Url>),
    /// `<urlset>`: page entries in document order.
    UrlSet(Vec<PageEntry>),
    /// Well-formed XML whose root is neither structure.
    Unrecognized,
}

/// Parse sitemap XML.
///
/// `<loc>` values that are not absolute URLs are skipped, as is a `<url>`
/// without `<loc>`. An unparseable `<lastmod>` leaves the timestamp absent
/// but keeps the entry.
///
/// # Errors
///
/// Returns [`Error::Parse`] when the XML is not well-formed.
#[instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_document(xml: &str) -> Result<SitemapDocument> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Tag> = Vec::new();
    let mut root: Option<Tag> = None;
    let mut text = String::new();

    let mut page = PageDraft::default();
    let mut image = ImageDraft::default();
    let mut sitemap_loc: Option<String> = None;

    let mut children = Vec::new();
    let mut pages = Vec::new();

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                let parent = stack.last().copied();
                let tag = Tag::classify(&ns, e.local_name().as_ref()).within(parent);
                if root.is_none() {
                    root = Some(tag);
                }

                match tag {
                    Tag::Url => page = PageDraft::default(),
                    Tag::Sitemap => sitemap_loc = None,
                    Tag::Image => image = ImageDraft::default(),
                    t if t.captures_text() => text.clear(),
                    _ => {},
                }
                stack.push(tag);
            },
            Ok((ns, Event::Empty(e))) => {
                // Only matters for an empty root like `<urlset/>`.
                if root.is_none() {
                    root = Some(Tag::classify(&ns, e.local_name().as_ref()).within(None));
                }
            },
            Ok((_, Event::Text(e))) => {
                if stack.last().is_some_and(|t| t.captures_text()) {
                    let unescaped = e.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                    text.push_str(&unescaped);
                }
            },
            Ok((_, Event::CData(e))) => {
                if stack.last().is_some_and(|t| t.captures_text()) {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            },
            Ok((_, Event::End(_))) => {
                let tag = stack.pop().unwrap_or(Tag::Other);
                let parent = stack.last().copied();
                let value = || text.trim().to_string();

                match (tag, parent) {
                    (Tag::Loc, Some(Tag::Url)) => page.loc = Some(value()),
                    (Tag::Loc, Some(Tag::Sitemap)) => sitemap_loc = Some(value()),
                    (Tag::LastMod, Some(Tag::Url)) => page.lastmod = Some(value()),
                    (Tag::ChangeFreq, _) => page.changefreq = Some(value()),
                    (Tag::Priority, _) => page.priority = Some(value()),
                    (Tag::ImageLoc, _) => image.loc = Some(value()),
                    (Tag::ImageTitle, _) => image.title = Some(value()),
                    (Tag::ImageCaption, _) => image.caption = Some(value()),
                    (Tag::Image, _) => {
                        if page.image.is_none() {
                            page.image = std::mem::take(&mut image).into_image();
                        }
                    },
                    (Tag::Url, _) => {
                        if let Some(entry) = std::mem::take(&mut page).into_entry() {
                            pages.push(entry);
                        }
                    },
                    (Tag::Sitemap, _) => {
                        if let Some(url) = sitemap_loc.take().and_then(|loc| absolute_url(&loc)) {
                            children.push(url);
                        }
                    },
                    _ => {},
                }
            },
            Ok((_, Event::Eof)) => {
                if !stack.is_empty() {
                    return Err(Error::Parse(format!(
                        "XML parse error: document ended with {} unclosed element(s)",
                        stack.len()
                    )));
                }
                break;
            },
            Err(e) => return Err(Error::Parse(format!("XML parse error: {e}"))),
            _ => {},
        }
        buf.clear();
    }

    Ok(match root {
        Some(Tag::SitemapIndex) => SitemapDocument::Index(children),
        Some(Tag::UrlSet) => SitemapDocument::UrlSet(pages),
        _ => SitemapDocument::Unrecognized,
    })
}

/// Elements the parser cares about. Anything else, including known names in
/// the wrong place or namespace, is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    UrlSet,
    SitemapIndex,
    Url,
    Sitemap,
    Loc,
    LastMod,
    ChangeFreq,
    Priority,
    Image,
    ImageLoc,
    ImageTitle,
    ImageCaption,
    Other,
}

impl Tag {
    fn classify(ns: &ResolveResult<'_>, local: &[u8]) -> Self {
        if is_sitemap_namespace(ns) {
            match local {
                b"urlset" => Self::UrlSet,
                b"sitemapindex" => Self::SitemapIndex,
                b"url" => Self::Url,
                b"sitemap" => Self::Sitemap,
                b"loc" => Self::Loc,
                b"lastmod" => Self::LastMod,
                b"changefreq" => Self::ChangeFreq,
                b"priority" => Self::Priority,
                _ => Self::Other,
            }
        } else if is_image_namespace(ns) {
            match local {
                b"image" => Self::Image,
                b"loc" => Self::ImageLoc,
                b"title" => Self::ImageTitle,
                b"caption" => Self::ImageCaption,
                _ => Self::Other,
            }
        } else {
            Self::Other
        }
    }

    /// Demote a tag to `Other` unless it appears under its expected parent.
    fn within(self, parent: Option<Self>) -> Self {
        let allowed = match self {
            Self::UrlSet | Self::SitemapIndex => parent.is_none(),
            Self::Url => parent == Some(Self::UrlSet),
            Self::Sitemap => parent == Some(Self::SitemapIndex),
            Self::Loc | Self::LastMod => matches!(parent, Some(Self::Url | Self::Sitemap)),
            Self::ChangeFreq | Self::Priority | Self::Image => parent == Some(Self::Url),
            Self::ImageLoc | Self::ImageTitle | Self::ImageCaption => parent == Some(Self::Image),
            Self::Other => true,
        };
        if allowed { self } else { Self::Other }
    }

    const fn captures_text(self) -> bool {
        matches!(
            self,
            Self::Loc
                | Self::LastMod
                | Self::ChangeFreq
                | Self::Priority
                | Self::ImageLoc
                | Self::ImageTitle
                | Self::ImageCaption
        )
    }
}

fn is_sitemap_namespace(ns: &ResolveResult<'_>) -> bool {
    match ns {
        ResolveResult::Unbound => true,
        ResolveResult::Bound(Namespace(uri)) => SITEMAP_NAMESPACES
            .iter()
            .any(|candidate| candidate.as_bytes() == *uri),
        ResolveResult::Unknown(_) => false,
    }
}

fn is_image_namespace(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == IMAGE_NAMESPACE.as_bytes())
}

#[derive(Debug, Default)]
struct PageDraft {
    loc: Option<String>,
    lastmod: Option<String>,
    changefreq: Option<String>,
    priority: Option<String>,
    image: Option<ImageEntry>,
}

impl PageDraft {
    fn into_entry(self) -> Option<PageEntry> {
        let location = absolute_url(self.loc.as_deref()?)?;
        Some(PageEntry {
            location,
            lastmod: self.lastmod.as_deref().and_then(parse_lastmod),
            changefreq: self.changefreq.and_then(|s| s.parse().ok()),
            priority: self.priority.as_deref().and_then(parse_priority),
            image: self.image,
        })
    }
}

#[derive(Debug, Default)]
struct ImageDraft {
    loc: Option<String>,
    title: Option<String>,
    caption: Option<String>,
}

impl ImageDraft {
    fn into_image(self) -> Option<ImageEntry> {
        Some(ImageEntry {
            location: absolute_url(self.loc.as_deref()?)?,
            title: self.title.filter(|t| !t.is_empty()),
            caption: self.caption.filter(|c| !c.is_empty()),
        })
    }
}

/// Parse `loc` text, dropping anything that is not an absolute URL.
fn absolute_url(loc: &str) -> Option<Url> {
    match Url::parse(loc) {
        Ok(url) => Some(url),
        Err(e) => {
            debug!(loc = %loc, error = %e, "Skipping non-absolute sitemap location");
            None
        },
    }
}

/// Parse a lastmod date string into a `DateTime<Utc>`.
///
/// Supports multiple date formats:
/// - `2024-01-15` (date only)
/// - `2024-01-15T10:30:00Z` (ISO 8601 with Z)
/// - `2024-01-15T10:30:00+00:00` (ISO 8601 with offset)
/// - `2024-01-15T10:30:00.000Z` (with milliseconds)
pub fn parse_lastmod(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    // No timezone: assume UTC
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }

    debug!(date_str = %s, "Could not parse lastmod date");
    None
}

/// Parse a priority value, clamping to 0.0-1.0 range.
fn parse_priority(s: &str) -> Option<f32> {
    s.parse::<f32>()
        .ok()
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 1.0))
}
