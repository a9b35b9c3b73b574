//! Error types for the listing stage.

use thiserror::Error;

use crate::download::DownloadError;

/// Errors that end a run before any file is downloaded.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The source URI is malformed or uses an unsupported scheme.
    #[error("invalid source URI '{uri}': {reason}\n  Suggestion: {suggestion}")]
    InvalidUri {
        /// The URI as given.
        uri: String,
        /// Why the URI was rejected.
        reason: String,
        /// How to fix the issue.
        suggestion: &'static str,
    },

    /// The listing page could not be fetched.
    #[error("failed to fetch listing: {source}")]
    Fetch {
        /// The underlying transfer error.
        #[source]
        source: DownloadError,
    },
}

impl ListingError {
    /// Creates an `InvalidUri` error for a URI that does not parse.
    #[must_use]
    pub fn malformed(uri: &str, parse_error: &str) -> Self {
        Self::InvalidUri {
            uri: uri.to_string(),
            reason: parse_error.to_string(),
            suggestion: "Pass a full URL such as http://example.com/pub/",
        }
    }

    /// Creates an `InvalidUri` error for a non-web scheme.
    #[must_use]
    pub fn unsupported_scheme(uri: &str, scheme: &str) -> Self {
        Self::InvalidUri {
            uri: uri.to_string(),
            reason: format!("scheme '{scheme}' is not supported"),
            suggestion: "Use http:// or https:// URLs",
        }
    }
}
