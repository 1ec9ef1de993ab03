//! Stateful line parsing: raw text lines in, structured entries out.
//!
//! The parser is stateless per call; multi-line continuation is handled by
//! threading the previous [`ParseStatus`] through the caller (the chunk
//! reader). Level and content filtering happen here, during parsing, so a
//! filtered entry never reaches the accumulator, and a continuation line can
//! retroactively remove the entry it extends once the grown message stops
//! matching the content filter.

use crate::entry::{LogEntry, Severity};
use crate::error::{PagerError, Result};
use crate::filter::{ContentFilter, FilteringOptions};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

/// Outcome of feeding one raw line to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// The line was a structured header and produced a new entry.
    CreatedNewEntry,
    /// The line was merged into the last accumulated entry's message.
    AppendedToLastEntry,
    /// The line belongs to an entry that filtering dropped (or is a stray
    /// continuation with no owner); nothing was accumulated.
    FilteredEntry,
}

impl ParseStatus {
    /// State for the first line of a chunk read. A read may resume at an
    /// arbitrary committed boundary; continuation lines whose header lives in
    /// an earlier chunk are dropped rather than orphaned.
    pub fn initial() -> ParseStatus {
        ParseStatus::FilteredEntry
    }
}

/// Structured header: timestamp, optional zone token, `path:line`,
/// `[Level]`, optional `[component]`, optional colon, message.
fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(
            r"^(?P<date>\d{4}-\d{2}-\d{2}) (?P<time>\d{2}:\d{2}:\d{2}\.\d{1,17})(?: (?P<zone>Z|[A-Z]{2,5}|[+-]\d{2}:?\d{2}))? (?P<src>\S+):(?P<line>[^\s:]+) \[(?P<level>[^\]\s]+)\](?: \[(?P<component>[^\]]+)\])?:? ?(?P<message>.*)$",
        )
        .expect("header pattern is valid")
    })
}

/// Converts raw lines into [`LogEntry`] values, applying the level and
/// content filters from a [`FilteringOptions`] snapshot.
#[derive(Debug, Clone)]
pub struct LineParser {
    disabled_levels: std::collections::BTreeSet<Severity>,
    content_filter: Option<ContentFilter>,
}

impl LineParser {
    pub fn new(options: &FilteringOptions) -> Result<Self> {
        Ok(Self {
            disabled_levels: options.disabled_levels.clone(),
            content_filter: options.compile_content_filter()?,
        })
    }

    /// True when the line matches the structured header pattern. Used by the
    /// chunk reader to find entry boundaries without committing to a parse.
    pub fn is_header(&self, line: &str) -> bool {
        header_regex().is_match(line)
    }

    /// Feed one raw line. `previous` must be the status returned for the
    /// preceding line of the same read (or [`ParseStatus::initial`] at the
    /// start). New and updated entries land in `entries`; a retroactively
    /// filtered entry is removed from it.
    ///
    /// Errors are fatal to the whole chunk read; the caller must not attempt
    /// to resynchronize mid-stream.
    pub fn parse_line(
        &self,
        raw_line: &str,
        previous: ParseStatus,
        entries: &mut Vec<LogEntry>,
    ) -> Result<ParseStatus> {
        let Some(caps) = header_regex().captures(raw_line) else {
            return Ok(self.append_continuation(raw_line, previous, entries));
        };

        let field = |name: &str| caps.name(name).map(|m| m.as_str());
        let (Some(date), Some(time), Some(src), Some(line_no), Some(level_token)) = (
            field("date"),
            field("time"),
            field("src"),
            field("line"),
            field("level"),
        ) else {
            return Err(PagerError::parse("unexpected capture groups", raw_line));
        };

        let timestamp = parse_timestamp(date, time)
            .ok_or_else(|| PagerError::parse("invalid timestamp", raw_line))?;
        // Best-effort: an unrecognized zone token is ignored, not fatal.
        let zone = field("zone").and_then(parse_zone);
        let source_line: u64 = line_no
            .parse()
            .map_err(|_| PagerError::parse("source line number is not numeric", raw_line))?;
        let level = Severity::from_token(level_token).ok_or_else(|| {
            PagerError::parse(format!("unrecognized level token {level_token:?}"), raw_line)
        })?;

        if self.disabled_levels.contains(&level) {
            return Ok(ParseStatus::FilteredEntry);
        }

        let entry = LogEntry {
            timestamp,
            zone,
            source_file: src.to_string(),
            source_line,
            component: field("component").map(str::to_string),
            level,
            message: field("message").unwrap_or_default().to_string(),
        };

        if let Some(filter) = &self.content_filter {
            if !filter.matches_entry(&entry) {
                return Ok(ParseStatus::FilteredEntry);
            }
        }

        entries.push(entry);
        Ok(ParseStatus::CreatedNewEntry)
    }

    /// Merge a non-header line into the last accumulated entry, re-checking
    /// the content filter against the grown message. Inside an already
    /// filtered entry, continuation lines keep dropping as one unit.
    fn append_continuation(
        &self,
        raw_line: &str,
        previous: ParseStatus,
        entries: &mut Vec<LogEntry>,
    ) -> ParseStatus {
        if previous == ParseStatus::FilteredEntry {
            return ParseStatus::FilteredEntry;
        }
        match entries.last_mut() {
            None => ParseStatus::FilteredEntry,
            Some(last) => {
                last.message.push('\n');
                last.message.push_str(raw_line);
                let keep = self
                    .content_filter
                    .as_ref()
                    .map_or(true, |filter| filter.matches_entry(last));
                if keep {
                    ParseStatus::AppendedToLastEntry
                } else {
                    entries.pop();
                    ParseStatus::FilteredEntry
                }
            }
        }
    }
}

/// Parse `YYYY-MM-DD` + `HH:MM:SS.fraction`. Fractions longer than nine
/// digits truncate to nanosecond precision.
fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = match time.split_once('.') {
        Some((hms, frac)) if frac.len() > 9 => {
            let truncated = format!("{hms}.{}", &frac[..9]);
            NaiveTime::parse_from_str(&truncated, "%H:%M:%S%.f").ok()?
        }
        _ => NaiveTime::parse_from_str(time, "%H:%M:%S%.f").ok()?,
    };
    Some(date.and_time(time))
}

/// Best-effort zone token parsing: `Z`/`UTC`/`GMT` and numeric `±HH[:]MM`
/// offsets resolve; anything else is unknown.
fn parse_zone(token: &str) -> Option<FixedOffset> {
    match token {
        "Z" | "UTC" | "GMT" => FixedOffset::east_opt(0),
        _ if token.starts_with('+') || token.starts_with('-') => {
            let digits: String = token[1..].chars().filter(|c| *c != ':').collect();
            if digits.len() != 4 {
                return None;
            }
            let hours: i32 = digits[..2].parse().ok()?;
            let minutes: i32 = digits[2..].parse().ok()?;
            let seconds = hours * 3600 + minutes * 60;
            FixedOffset::east_opt(if token.starts_with('-') {
                -seconds
            } else {
                seconds
            })
        }
        _ => None,
    }
}
