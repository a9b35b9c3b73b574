//! Target filename derivation for listing anchors.
//!
//! Anchor labels come straight from a remote page, so they are sanitized
//! before being joined onto the download directory, and names repeated within
//! one run get a numeric suffix instead of silently overwriting each other.

use std::collections::HashSet;
use std::path::{Component, Path};

/// First numeric suffix used for a repeated filename (`file.pdf`, `file_2.pdf`, ...).
const DUPLICATE_SUFFIX_START: usize = 2;

/// Sanitizes an anchor label into a single safe path segment.
///
/// Replaces characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |` and control characters) with `_`. Returns `None`
/// when nothing usable remains or the label is a `.`/`..` segment.
#[must_use]
pub fn sanitize_filename(label: &str) -> Option<String> {
    let sanitized: String = label
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() || !is_safe_filename_segment(&sanitized) {
        return None;
    }
    Some(sanitized)
}

fn is_safe_filename_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Hands out filenames that are unique within a single run.
///
/// Only names claimed through this registry are considered; files already on
/// disk are overwritten so that re-running the same listing is idempotent.
#[derive(Debug, Default)]
pub struct FilenameRegistry {
    claimed: HashSet<String>,
}

impl FilenameRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `filename`, or the first free `stem_N.ext` variant if it is taken.
    ///
    /// Names are compared case-insensitively so that case-insensitive
    /// filesystems do not merge two downloads into one file.
    pub fn claim(&mut self, filename: &str) -> String {
        if self.claimed.insert(filename.to_lowercase()) {
            return filename.to_string();
        }

        let (stem, ext) = split_extension(filename);
        let mut suffix = DUPLICATE_SUFFIX_START;
        loop {
            let candidate = format!("{stem}_{suffix}{ext}");
            if self.claimed.insert(candidate.to_lowercase()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Returns the number of distinct names claimed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Returns true if no name has been claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

/// Splits `name` into stem and extension (including the dot).
///
/// A leading dot (hidden file) is part of the stem.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_removes_invalid_chars() {
        assert_eq!(sanitize_filename("file/name.pdf").unwrap(), "file_name.pdf");
        assert_eq!(sanitize_filename("file\\name.pdf").unwrap(), "file_name.pdf");
        assert_eq!(sanitize_filename("file:name.pdf").unwrap(), "file_name.pdf");
        assert_eq!(sanitize_filename("file*name.pdf").unwrap(), "file_name.pdf");
        assert_eq!(sanitize_filename("file?name.pdf").unwrap(), "file_name.pdf");
        assert_eq!(sanitize_filename("file\"name.pdf").unwrap(), "file_name.pdf");
        assert_eq!(sanitize_filename("file<name>.pdf").unwrap(), "file_name_.pdf");
        assert_eq!(sanitize_filename("file|name.pdf").unwrap(), "file_name.pdf");
    }

    #[test]
    fn test_sanitize_filename_rejects_dot_segments() {
        assert_eq!(sanitize_filename("."), None);
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("  "), None);
        assert_eq!(sanitize_filename("/"), None);
    }

    #[test]
    fn test_sanitize_filename_neutralizes_traversal() {
        let name = sanitize_filename("../../etc/passwd.txt").unwrap();
        assert!(!name.contains('/'));
        assert_eq!(name, ".._.._etc_passwd.txt");
    }

    #[test]
    fn test_sanitize_filename_preserves_valid_chars() {
        assert_eq!(
            sanitize_filename("valid-file_name.pdf").unwrap(),
            "valid-file_name.pdf"
        );
        assert_eq!(sanitize_filename("file (1).pdf").unwrap(), "file (1).pdf");
        assert_eq!(sanitize_filename("日本語.pdf").unwrap(), "日本語.pdf");
        assert_eq!(sanitize_filename("  padded.txt \n").unwrap(), "padded.txt");
    }

    #[test]
    fn test_registry_renames_repeated_names() {
        let mut registry = FilenameRegistry::new();
        assert_eq!(registry.claim("a.pdf"), "a.pdf");
        assert_eq!(registry.claim("a.pdf"), "a_2.pdf");
        assert_eq!(registry.claim("a.pdf"), "a_3.pdf");
        assert_eq!(registry.claim("b.pdf"), "b.pdf");
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_registry_is_case_insensitive() {
        let mut registry = FilenameRegistry::new();
        assert_eq!(registry.claim("Report.PDF"), "Report.PDF");
        assert_eq!(registry.claim("report.pdf"), "report_2.pdf");
    }

    #[test]
    fn test_registry_does_not_reuse_suffixed_name() {
        let mut registry = FilenameRegistry::new();
        assert_eq!(registry.claim("a_2.pdf"), "a_2.pdf");
        assert_eq!(registry.claim("a.pdf"), "a.pdf");
        assert_eq!(registry.claim("a.pdf"), "a_3.pdf");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.tar.gz"), ("a.tar", ".gz"));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("noext"), ("noext", ""));
    }
}
