//! User-Agent string for listing and download requests.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/dirget";

/// Default User-Agent for every request (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("dirget/{version} (directory-listing-downloader; +{PROJECT_UA_URL})")
}
