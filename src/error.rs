//! Error types and handling infrastructure for logpager.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types and `anyhow` for application-level error handling with context.
//!
//! Errors fall into a few deliberate classes: I/O errors are reported per
//! request and never poison the coordinator (the file may reappear); parse
//! errors are fatal to the chunk read that produced them but never to chunks
//! already committed; filter errors surface at option-change time.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for logpager operations.
#[derive(Error, Debug)]
pub enum PagerError {
    /// File system related errors (file not found, permission denied, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File not found specifically (common case for user feedback)
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// A read was requested at a byte offset the file does not contain
    #[error("Invalid offset {offset} for file of {file_size} bytes")]
    InvalidOffset { offset: u64, file_size: u64 },

    /// A structured header line carried a field the parser could not accept.
    /// Fatal to the containing chunk read; previously committed chunks are
    /// never affected.
    #[error("Parse error: {reason} in line: {line}")]
    ParseError { reason: String, line: String },

    /// Content filter pattern failed to compile
    #[error("Invalid content filter {pattern:?}")]
    FilterError {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The background worker or its channels are gone
    #[error("Worker unavailable: {message}")]
    WorkerError { message: String },

    /// An export pass is already running for this view
    #[error("A save operation is already in progress")]
    SaveInProgress,

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for logpager operations.
pub type Result<T> = std::result::Result<T, PagerError>;

impl PagerError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create a ParseError naming the offending line
    pub fn parse(reason: impl Into<String>, line: impl Into<String>) -> Self {
        Self::ParseError {
            reason: reason.into(),
            line: line.into(),
        }
    }

    /// Create a WorkerError with a descriptive message
    pub fn worker(message: impl Into<String>) -> Self {
        Self::WorkerError {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// True for errors that abort a chunk read without invalidating
    /// anything already committed.
    pub fn is_chunk_fatal(&self) -> bool {
        matches!(
            self,
            Self::ParseError { .. } | Self::InvalidOffset { .. } | Self::FileError { .. }
        )
    }
}

// Automatic conversion from io::Error to PagerError
impl From<std::io::Error> for PagerError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileError {
                message: "File not found".to_string(),
                source: err,
            },
            std::io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}
