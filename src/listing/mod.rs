//! Directory listing location, fetch, and link selection.
//!
//! The listing stage turns a user-supplied URI into an ordered list of
//! [`DownloadTask`]s:
//!
//! 1. [`SourceLocation::parse`] normalizes the URI (trailing `/` for directories)
//! 2. [`fetch_listing`] performs the single blocking GET for the index page
//! 3. [`ListingPage::parse`] collects every anchor in document order
//! 4. [`plan_downloads`] applies the filename-shape and filetype rules
//!
//! # Example
//!
//! ```no_run
//! use dirget_core::download::HttpClient;
//! use dirget_core::listing::{FiletypeFilter, ListingPage, SourceLocation, fetch_listing, plan_downloads};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let location = SourceLocation::parse("http://example.com/pub")?;
//! let client = HttpClient::new();
//! let html = fetch_listing(&client, &location).await?;
//! let page = ListingPage::parse(&html);
//! let filter: FiletypeFilter = "pdf,txt".parse()?;
//! let plan = plan_downloads(page.links(&location), &filter);
//! println!("{} files to download", plan.tasks.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod extract;
mod filter;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument};
use url::Url;

use crate::download::HttpClient;

pub use error::ListingError;
pub use extract::{LinkCandidate, ListingPage};
pub use filter::{
    DownloadPlan, DownloadTask, FilterError, FiletypeFilter, SkipReason, SkippedLink,
    plan_downloads,
};

/// Matches a URI that already names a resource (`.../list.htm`) or a directory (`.../`).
#[allow(clippy::expect_used)]
static RESOURCE_OR_DIRECTORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\.\w+?$|/$)").expect("resource regex is valid") // Static pattern, safe to panic
});

/// The directory listing (or specific index page) a run scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    url: Url,
}

impl SourceLocation {
    /// Parses and normalizes a source URI.
    ///
    /// A `/` is appended unless the URI already ends in `/` or in a file
    /// extension, so `http://host/pub` and `http://host/pub/` scan the same
    /// directory while `http://host/pub/list.htm` is fetched as-is.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::InvalidUri`] if the URI does not parse or does
    /// not use `http`/`https`.
    pub fn parse(raw: &str) -> Result<Self, ListingError> {
        let trimmed = raw.trim();
        let normalized = if RESOURCE_OR_DIRECTORY.is_match(trimmed) {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };

        let url =
            Url::parse(&normalized).map_err(|e| ListingError::malformed(trimmed, &e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ListingError::unsupported_scheme(trimmed, other)),
        }

        debug!(source = %url, "normalized source location");
        Ok(Self { url })
    }

    /// Returns the normalized URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the normalized URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Fetches the raw listing page.
///
/// Any failure here is fatal to the run: without a listing there is nothing
/// to download.
///
/// # Errors
///
/// Returns [`ListingError::Fetch`] on transport errors or non-success status.
#[instrument(skip(client), fields(source = %location))]
pub async fn fetch_listing(
    client: &HttpClient,
    location: &SourceLocation,
) -> Result<String, ListingError> {
    let body = client
        .fetch_text(location.url())
        .await
        .map_err(|source| ListingError::Fetch { source })?;
    info!(bytes = body.len(), "fetched listing page");
    Ok(body)
}
