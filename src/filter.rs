//! Filtering options and the wildcard content matcher.
//!
//! [`FilteringOptions`] is a plain value type compared structurally; an empty
//! value means "no filtering, read from the start of the file". The content
//! pattern uses glob-like wildcards (`*`, `?`) and is compiled into a
//! [`ContentFilter`] when a parser is built.

use crate::entry::{LogEntry, Severity};
use crate::error::{PagerError, Result};
use regex::Regex;
use std::collections::BTreeSet;

/// The combination of a resume offset, disabled severity levels, and a
/// content pattern that determines which entries are visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteringOptions {
    /// Byte offset to start reading from. `None` means the file start.
    pub start_offset: Option<u64>,

    /// Severity levels to drop entirely.
    pub disabled_levels: BTreeSet<Severity>,

    /// Glob-like content pattern. Empty or `None` means no content filter.
    pub content_pattern: Option<String>,
}

impl FilteringOptions {
    /// Returns true when no filtering is active and reading starts at the
    /// beginning of the file.
    pub fn is_empty(&self) -> bool {
        self.start_offset.is_none()
            && self.disabled_levels.is_empty()
            && !self.has_content_pattern()
    }

    /// True when a non-empty content pattern is configured.
    pub fn has_content_pattern(&self) -> bool {
        self.content_pattern
            .as_deref()
            .is_some_and(|p| !p.is_empty())
    }

    /// Effective first read offset.
    pub fn effective_start(&self) -> u64 {
        self.start_offset.unwrap_or(0)
    }

    /// Compile the content pattern, if any.
    pub fn compile_content_filter(&self) -> Result<Option<ContentFilter>> {
        match self.content_pattern.as_deref() {
            Some(pattern) if !pattern.is_empty() => Ok(Some(ContentFilter::compile(pattern)?)),
            _ => Ok(None),
        }
    }
}

/// Translate a glob-like pattern to an anchored regex.
///
/// `(?s)` makes `.` cross newlines: entry messages carry embedded newlines
/// from continuation lines and a `*` must be able to span them.
fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?s)^");
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(&ch.to_string())),
        }
    }
    out.push('$');
    out
}

/// A compiled content filter.
///
/// An entry survives when its message, formatted timestamp, or source file
/// name matches the pattern.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    pattern: String,
    regex: Regex,
}

impl ContentFilter {
    /// Compile a glob-like pattern into a matcher.
    pub fn compile(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&wildcard_to_regex(pattern)).map_err(|source| {
            PagerError::FilterError {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The original wildcard pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Entry-level match: message, timestamp text, or source file.
    pub fn matches_entry(&self, entry: &LogEntry) -> bool {
        self.matches(&entry.message)
            || self.matches(&entry.timestamp_text())
            || self.matches(&entry.source_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            zone: None,
            source_file: "a.go".to_string(),
            source_line: 1,
            component: None,
            level: Severity::Info,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_empty_options() {
        let options = FilteringOptions::default();
        assert!(options.is_empty());
        assert_eq!(options.effective_start(), 0);
        assert!(options.compile_content_filter().unwrap().is_none());

        let resumed = FilteringOptions {
            start_offset: Some(10),
            ..Default::default()
        };
        assert!(!resumed.is_empty());
        assert_eq!(resumed.effective_start(), 10);
    }

    #[test]
    fn test_empty_pattern_means_no_filter() {
        let options = FilteringOptions {
            content_pattern: Some(String::new()),
            ..Default::default()
        };
        assert!(!options.has_content_pattern());
        assert!(options.is_empty());
    }

    #[test]
    fn test_wildcard_star_and_question() {
        let filter = ContentFilter::compile("*conn?cted*").unwrap();
        assert!(filter.matches("peer connected ok"));
        assert!(filter.matches("connacted"));
        assert!(!filter.matches("connection"));
    }

    #[test]
    fn test_wildcard_escapes_regex_metacharacters() {
        let filter = ContentFilter::compile("*[net]*").unwrap();
        assert!(filter.matches("error in [net] layer"));
        assert!(!filter.matches("error in net layer"));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let filter = ContentFilter::compile("secret").unwrap();
        assert!(filter.matches("secret"));
        assert!(!filter.matches("the secret place"));
    }

    #[test]
    fn test_star_spans_embedded_newlines() {
        let filter = ContentFilter::compile("*hello*world*").unwrap();
        assert!(filter.matches("hello\nworld"));
        assert!(filter.matches("ah hello there\nwide world"));
    }

    #[test]
    fn test_matches_entry_consults_timestamp_and_source() {
        let filter = ContentFilter::compile("*2024-01-01*").unwrap();
        assert!(filter.matches_entry(&entry("no date in message")));

        let filter = ContentFilter::compile("*.go").unwrap();
        assert!(filter.matches_entry(&entry("plain")));

        let filter = ContentFilter::compile("*secret*").unwrap();
        assert!(!filter.matches_entry(&entry("hello\nworld")));
    }
}
