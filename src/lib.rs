//! # logpager - Windowed Log Indexing and Caching Engine
//!
//! A memory-bounded engine for random access into huge, continuously growing,
//! line-oriented structured log files. The file is never loaded whole:
//! previously read byte ranges become addressable "chunks" of parsed entries,
//! correlated across three coordinate systems (chunk number, model row, file
//! byte offset) and served through an incremental, asynchronous paging
//! protocol.
//!
//! ## Features
//!
//! - **Random row access**: any row reachable through a bounded chunk read
//! - **Level and content filtering**: applied during parsing, including
//!   multi-line entries whose continuation lines change the filter verdict
//! - **Growth aware**: appended data becomes requestable without
//!   invalidation; truncation and removal reset the view safely
//! - **Bounded memory**: parsed payloads live in an LRU cache; evicted
//!   chunks are re-readable from their recorded byte offsets
//! - **Bulk export**: save all matching entries to a file with progress
//!   reporting and cooperative cancellation
//!
//! ## Architecture
//!
//! The library is organized into focused modules, leaves first:
//!
//! - [`error`] - Centralized error types and handling
//! - [`entry`] - Severity levels and the parsed entry model
//! - [`filter`] - Filtering options and the wildcard content matcher
//! - [`parser`] - Stateful line parsing with continuation handling
//! - [`reader`] - Bounded, resumable chunk reads
//! - [`index`] - Chunk metadata correlated by number, row, and offset
//! - [`cache`] - Bounded LRU cache of chunk payloads
//! - [`view`] - The coordinator, its read worker, and the save pass

// Core modules
pub mod error;

// Parsing pipeline
pub mod entry;
pub mod filter;
pub mod parser;
pub mod reader;

// Indexing and caching
pub mod cache;
pub mod index;

// Coordination
pub mod view;

// Re-export commonly used types for convenience
pub use error::{PagerError, Result};

// Public API surface for external usage
pub use entry::{LogEntry, Severity};
pub use filter::FilteringOptions;
pub use view::{LogView, RowSource, SaveOutcome, ViewConfig, ViewEvent};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
