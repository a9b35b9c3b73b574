//! Filename-shape and filetype rules that turn anchors into download tasks.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use super::LinkCandidate;
use crate::download::{FilenameRegistry, sanitize_filename};

/// Filter value meaning "every filetype".
pub const ALL_FILETYPES: &str = "all";

/// Errors produced while parsing a filetype filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The filter contained no usable extension.
    #[error("filetype filter '{raw}' contains no extensions\n  Suggestion: use 'all' or a list such as 'pdf,txt'")]
    Empty {
        /// The filter as given.
        raw: String,
    },
}

/// Which file extensions a run accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FiletypeFilter {
    /// Accept every filename.
    #[default]
    All,
    /// Accept filenames ending in one of these lower-cased extensions.
    Extensions(Vec<String>),
}

impl FiletypeFilter {
    /// Builds a filter from individual extensions (`"pdf"`, `".TXT"`, `"tar.gz"`).
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Empty`] when no non-empty extension remains.
    pub fn from_extensions<I, S>(extensions: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<String> = extensions
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        if raw.len() == 1 && raw[0].trim().eq_ignore_ascii_case(ALL_FILETYPES) {
            return Ok(Self::All);
        }

        let mut normalized: Vec<String> = Vec::new();
        for ext in &raw {
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }

        if normalized.is_empty() {
            return Err(FilterError::Empty { raw: raw.join(",") });
        }
        Ok(Self::Extensions(normalized))
    }

    /// Returns true if `filename` ends with one of the accepted extensions.
    ///
    /// Matching is case-insensitive and anchored at the end of the name, so a
    /// `pdf` filter accepts `Report.PDF` but not `report.pdfx` or `my.pdf.bak`.
    #[must_use]
    pub fn accepts(&self, filename: &str) -> bool {
        match self {
            Self::All => true,
            Self::Extensions(extensions) => {
                let lower = filename.to_lowercase();
                extensions.iter().any(|ext| {
                    lower
                        .strip_suffix(ext.as_str())
                        .is_some_and(|stem| stem.ends_with('.') && stem.len() > 1)
                })
            }
        }
    }
}

impl FromStr for FiletypeFilter {
    type Err = FilterError;

    /// Parses `"all"` or a comma-separated extension list such as `"pdf,TXT"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extensions(s.split(','))
    }
}

impl fmt::Display for FiletypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_FILETYPES),
            Self::Extensions(extensions) => f.write_str(&extensions.join(",")),
        }
    }
}

/// Why an anchor was not turned into a download task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The label does not look like a filename (no `.`), e.g. `Parent Directory`.
    NotAFile,
    /// The filename's extension is not in the filter.
    FiletypeExcluded,
    /// The `href` is missing or cannot be resolved to a web URL.
    InvalidHref,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotAFile => "does not look like filename",
            Self::FiletypeExcluded => "type is not selected",
            Self::InvalidHref => "link cannot be resolved",
        };
        f.write_str(text)
    }
}

/// An anchor rejected by the filter, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLink {
    /// The anchor label.
    pub label: String,
    /// The rule that rejected it.
    pub reason: SkipReason,
}

/// One file to fetch: an accepted anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Absolute URL of the file.
    pub url: Url,
    /// Name of the file written inside the target directory.
    pub filename: String,
}

/// Result of filtering a listing: accepted tasks and skipped anchors, both in
/// document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadPlan {
    /// Accepted download tasks.
    pub tasks: Vec<DownloadTask>,
    /// Anchors that were rejected.
    pub skipped: Vec<SkippedLink>,
}

/// Applies the shape and filetype rules to `candidates`.
///
/// Rules, in order:
/// 1. a label without `.` is [`SkipReason::NotAFile`]
/// 2. a filename outside `filter` is [`SkipReason::FiletypeExcluded`]
/// 3. an unresolvable `href` is [`SkipReason::InvalidHref`]
///
/// Accepted filenames repeated within the listing get a numeric suffix.
/// Skips are logged at info level; none of them fail the run.
pub fn plan_downloads<I>(candidates: I, filter: &FiletypeFilter) -> DownloadPlan
where
    I: IntoIterator<Item = LinkCandidate>,
{
    let mut plan = DownloadPlan::default();
    let mut registry = FilenameRegistry::new();

    for candidate in candidates {
        match evaluate(&candidate, filter) {
            Ok((url, filename)) => {
                let claimed = registry.claim(&filename);
                if claimed != filename {
                    warn!(
                        label = %candidate.display_text,
                        filename = %claimed,
                        "duplicate filename in listing, renaming"
                    );
                }
                plan.tasks.push(DownloadTask {
                    url,
                    filename: claimed,
                });
            }
            Err(reason) => {
                info!(label = %candidate.display_text, %reason, "skipping link");
                plan.skipped.push(SkippedLink {
                    label: candidate.display_text,
                    reason,
                });
            }
        }
    }

    plan
}

fn evaluate(
    candidate: &LinkCandidate,
    filter: &FiletypeFilter,
) -> Result<(Url, String), SkipReason> {
    let label = candidate.display_text.as_str();
    if !label.contains('.') {
        return Err(SkipReason::NotAFile);
    }
    let filename = sanitize_filename(label).ok_or(SkipReason::NotAFile)?;
    if !filter.accepts(&filename) {
        return Err(SkipReason::FiletypeExcluded);
    }
    let url = candidate
        .resolved_url
        .clone()
        .ok_or(SkipReason::InvalidHref)?;
    Ok((url, filename))
}
