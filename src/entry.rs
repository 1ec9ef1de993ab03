//! Core data model: severity levels and parsed log entries.
//!
//! A [`LogEntry`] is the normalized unit that flows through filtering, the
//! chunk cache, and export. Entries are immutable once a chunk read commits
//! them; during a read the parser may still grow the last entry's message
//! with continuation lines.

use chrono::{FixedOffset, NaiveDateTime};
use std::fmt;

/// Severity levels, ordered from least to most severe.
///
/// The ordering matters for level comparisons; the discriminant order is the
/// severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    /// All variants in severity order.
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Trace,
            Severity::Debug,
            Severity::Info,
            Severity::Warn,
            Severity::Error,
        ]
    }

    /// Map a header token to a severity. Unrecognized tokens are an error
    /// for the caller to escalate; the log dialect has exactly these five.
    pub fn from_token(token: &str) -> Option<Severity> {
        match token {
            "Trace" => Some(Severity::Trace),
            "Debug" => Some(Severity::Debug),
            "Info" => Some(Severity::Info),
            "Warn" => Some(Severity::Warn),
            "Error" => Some(Severity::Error),
            _ => None,
        }
    }

    /// Header token for display and export.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Trace => "Trace",
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Warn => "Warn",
            Severity::Error => "Error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Severity::from_token(s)
            .or_else(|| {
                // CLI convenience: accept lowercase spellings too.
                let mut cased = s.to_lowercase();
                if let Some(first) = cased.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                Severity::from_token(&cased)
            })
            .ok_or_else(|| format!("unknown severity level: {s}"))
    }
}

/// A single parsed log event.
///
/// `message` may contain embedded newlines accumulated from continuation
/// lines. `zone` is the best-effort parsed time-zone suffix; `None` when the
/// header had no zone token or the token was unrecognized.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Timestamp exactly as written in the header (no zone conversion).
    pub timestamp: NaiveDateTime,

    /// Best-effort parsed time-zone suffix.
    pub zone: Option<FixedOffset>,

    /// Source file path from the `path:line` header field.
    pub source_file: String,

    /// Source line number from the `path:line` header field.
    pub source_line: u64,

    /// Optional bracketed component label.
    pub component: Option<String>,

    /// Severity level.
    pub level: Severity,

    /// Message body, including continuation lines joined with `\n`.
    pub message: String,
}

impl LogEntry {
    /// Timestamp formatted the way it appears in the log.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}

/// Reconstructs the canonical log-line form, used by the export pass and the
/// CLI print mode. Continuation lines come out as the embedded newlines of
/// `message`, which round-trips them as continuation lines again.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.timestamp_text())?;
        if let Some(zone) = &self.zone {
            write!(f, " {}", zone)?;
        }
        write!(
            f,
            " {}:{} [{}]",
            self.source_file, self.source_line, self.level
        )?;
        if let Some(component) = &self.component {
            write!(f, " [{}]", component)?;
        }
        write!(f, " {}", self.message)
    }
}
