//! Anchor extraction from a fetched listing page.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};
use url::Url;

use super::SourceLocation;

#[allow(clippy::expect_used)]
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("anchor selector is valid")); // Static pattern, safe to panic

/// One anchor found on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Raw `href` attribute, if present.
    pub href: Option<String>,
    /// Rendered anchor text, used as the presumed filename.
    pub display_text: String,
    /// `href` resolved against the source location, when resolvable.
    pub resolved_url: Option<Url>,
}

impl LinkCandidate {
    /// Builds a candidate from raw anchor parts, resolving `href` against `base`.
    #[must_use]
    pub fn new(href: Option<&str>, display_text: &str, base: &SourceLocation) -> Self {
        let resolved_url = href.and_then(|raw| resolve_href(raw, base));
        Self {
            href: href.map(str::to_string),
            display_text: display_text.trim().to_string(),
            resolved_url,
        }
    }
}

/// A parsed listing page.
///
/// Holds the parse tree of a single fetch; [`links`](Self::links) walks it
/// once per call in document order.
pub struct ListingPage {
    document: Html,
}

impl ListingPage {
    /// Parses raw HTML. Parsing is lenient and never fails.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Returns every anchor on the page as a [`LinkCandidate`], in document order.
    pub fn links<'a>(
        &'a self,
        base: &'a SourceLocation,
    ) -> impl Iterator<Item = LinkCandidate> + 'a {
        self.document
            .select(&ANCHOR_SELECTOR)
            .map(move |element| candidate_from_element(element, base))
    }

    /// Returns the number of anchors on the page.
    #[must_use]
    pub fn anchor_count(&self) -> usize {
        self.document.select(&ANCHOR_SELECTOR).count()
    }
}

fn candidate_from_element(element: ElementRef<'_>, base: &SourceLocation) -> LinkCandidate {
    let href = element.value().attr("href");
    let text = element.text().collect::<String>();
    let candidate = LinkCandidate::new(href, &text, base);
    trace!(
        href = ?candidate.href,
        label = %candidate.display_text,
        "found anchor"
    );
    candidate
}

/// Resolves an anchor `href` to an absolute download URL.
///
/// Absolute `http`/`https` hrefs are used as-is; relative hrefs are joined
/// onto the source location. Empty hrefs, fragments-only links and other
/// schemes (`mailto:`, `javascript:`) are unresolvable.
fn resolve_href(raw: &str, base: &SourceLocation) -> Option<Url> {
    let href = raw.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match Url::parse(href) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            debug!(href, scheme = url.scheme(), "ignoring non-web link");
            None
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let joined = base.url().join(href).ok();
            if let Some(url) = &joined {
                debug!(download_link = %url, "resolved relative link");
            }
            joined
        }
        Err(e) => {
            debug!(href, error = %e, "unparseable link");
            None
        }
    }
}
