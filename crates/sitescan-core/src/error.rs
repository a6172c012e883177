//! Error types for sitescan-core.
//!
//! Discovery itself never fails: a site without sitemaps is an ordinary
//! outcome and shows up as an empty stream. The error type here covers the
//! places where a caller can actually get something wrong:
//!
//! - **Construction**: building the HTTP client from a [`Config`](crate::Config)
//! - **Configuration**: reading or validating TOML settings
//! - **Parsing**: the standalone sitemap document parser
//! - **Input**: a start URL that is not absolute
//!
//! ```rust
//! use sitescan_core::{Error, parse_start_url};
//!
//! match parse_start_url("not a url") {
//!     Err(Error::InvalidUrl(msg)) => eprintln!("bad input: {msg}"),
//!     Err(e) => eprintln!("{} error: {e}", e.category()),
//!     Ok(url) => println!("discovering {url}"),
//! }
//! ```

use thiserror::Error;

/// The main error type for sitescan-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed, typically while reading a config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction or a request failed.
    ///
    /// Inside discovery these are swallowed and logged; they only reach the
    /// caller when building a [`ReqwestFetcher`](crate::ReqwestFetcher).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Document content could not be parsed.
    ///
    /// Raised for malformed sitemap XML by [`parse_document`](crate::parse_document).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration values are out of range or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL is malformed or not absolute.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A config file is not valid TOML for [`Config`](crate::Config).
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Discovery never retries on its own; this is for callers that wrap
    /// client construction or config loading in their own policy.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Useful as a structured logging field:
    ///
    /// ```rust
    /// use sitescan_core::Error;
    ///
    /// let err = Error::Config("timeout_secs must be greater than zero".into());
    /// tracing::warn!(category = err.category(), error = %err, "config rejected");
    /// ```
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::disallowed_macros,
    clippy::unwrap_used,
    clippy::unnecessary_wraps
)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        let cases = vec![
            (Error::Parse("bad xml".to_string()), "Parse error"),
            (Error::Config("missing field".to_string()), "Configuration error"),
            (Error::InvalidUrl("relative".to_string()), "Invalid URL"),
            (
                Error::Serialization("unexpected key".to_string()),
                "Serialization error",
            ),
        ];

        for (error, prefix) in cases {
            let rendered = error.to_string();
            assert!(rendered.starts_with(prefix), "{rendered} lacks {prefix}");
        }
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "missing config");
        let error: Error = io_error.into();

        match error {
            Error::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::NotFound),
            other => panic!("expected Io variant, got {other:?}"),
        }
    }

    #[test]
    fn test_error_from_url_parse_error() {
        let parse_err = url::Url::parse("/relative/path").unwrap_err();
        let error: Error = parse_err.into();

        assert_eq!(error.category(), "invalid_url");
        assert!(error.to_string().contains("relative URL without a base"));
    }

    #[test]
    fn test_error_from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let error: Error = toml_err.into();

        assert_eq!(error.category(), "serialization");
    }

    #[test]
    fn test_error_recoverability() {
        assert!(Error::Io(io::Error::new(io::ErrorKind::TimedOut, "slow")).is_recoverable());
        assert!(Error::Io(io::Error::new(io::ErrorKind::Interrupted, "eintr")).is_recoverable());

        assert!(!Error::Io(io::Error::new(io::ErrorKind::PermissionDenied, "no")).is_recoverable());
        assert!(!Error::Parse("bad".to_string()).is_recoverable());
        assert!(!Error::Config("bad".to_string()).is_recoverable());
        assert!(!Error::InvalidUrl("bad".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(Error::Parse(String::new()).category(), "parse");
        assert_eq!(Error::Config(String::new()).category(), "config");
        assert_eq!(Error::InvalidUrl(String::new()).category(), "invalid_url");
        assert_eq!(Error::Serialization(String::new()).category(), "serialization");
    }

    proptest! {
        #[test]
        fn test_parse_error_keeps_arbitrary_messages(msg in r".{0,200}") {
            let error = Error::Parse(msg.clone());
            prop_assert!(error.to_string().contains(&msg));
            prop_assert!(!error.is_recoverable());
        }
    }
}
