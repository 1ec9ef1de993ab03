//! Protocol definitions shared between the viewer coordinator and the read
//! worker, plus the notifications surfaced to the embedding layer.

use crate::entry::LogEntry;
use crate::error::PagerError;
use crate::filter::FilteringOptions;
use std::ops::BitOr;

/// Identifier attached to cross-thread requests so responses can be correlated.
pub type RequestId = u64;

/// Why a chunk read was issued. Reasons are independent concerns and
/// combine: a single request can be, for example, both an initial read and
/// part of a save pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadReasons(u8);

impl ReadReasons {
    /// First read after opening or after a filter change.
    pub const INITIAL_READ: ReadReasons = ReadReasons(1 << 0);
    /// Re-read of a known chunk whose payload was evicted.
    pub const CACHE_MISS: ReadReasons = ReadReasons(1 << 1);
    /// Read past everything known so far.
    pub const FETCH_MORE: ReadReasons = ReadReasons(1 << 2);
    /// Read on behalf of an export pass.
    pub const SAVE_TO_FILE: ReadReasons = ReadReasons(1 << 3);

    pub fn contains(self, other: ReadReasons) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ReadReasons {
    type Output = ReadReasons;

    fn bitor(self, rhs: ReadReasons) -> ReadReasons {
        ReadReasons(self.0 | rhs.0)
    }
}

/// A chunk read the coordinator has issued or queued. Destroyed when the
/// matching response arrives or a reset supersedes it.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub request_id: RequestId,
    pub offset: u64,
    pub max_entries: usize,
    pub reasons: ReadReasons,
    /// For cache-miss re-reads: the chunk whose payload is being restored.
    /// `None` for reads that will commit a new chunk.
    pub target_chunk: Option<u64>,
}

/// Commands sent from the coordinator to the read worker.
#[derive(Debug, Clone)]
pub enum WorkerCommand {
    ReadChunk {
        request_id: RequestId,
        from_offset: u64,
        max_entries: usize,
        options: FilteringOptions,
    },
    /// Report the file's current size (or absence).
    Stat,
    Shutdown,
}

/// Responses emitted by the read worker back to the coordinator. Errors
/// cross the channel as values; the worker never panics on a bad file.
#[derive(Debug)]
pub enum WorkerResponse {
    ChunkRead {
        request_id: RequestId,
        from_offset: u64,
        end_offset: u64,
        entries: Vec<LogEntry>,
        /// File size observed during the read; lets the coordinator detect
        /// end-of-file and shrinkage without a separate stat round-trip.
        file_size: u64,
    },
    Stat {
        /// `None` when the file does not currently exist.
        size: Option<u64>,
    },
    Error {
        request_id: RequestId,
        error: PagerError,
    },
}

/// Why the index and cache were fully invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    FilterChanged,
    FileTruncated,
    FileRemoved,
}

/// Terminal outcome of a save pass. Cancellation is a distinguishable
/// outcome, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Completed { entries_written: u64 },
    Cancelled,
    Failed { message: String },
}

/// Notifications delivered to the embedding/rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Rows `[first_row, end_row)` are parsed and available.
    RowsCached { first_row: u64, end_row: u64 },
    /// A read consumed up to the file's current size.
    EndOfFileReached,
    /// The file grew; rows past the previous end are requestable.
    MoreRowsAvailable { file_size: u64 },
    /// Index and cache were reset; row numbering starts over.
    Invalidated { reason: InvalidationReason },
    /// A chunk read failed. Non-fatal: previously cached rows stay usable.
    ReadFailed { message: String },
    /// Export progress as a monotonically increasing percentage.
    SaveProgress { percent: f64 },
    SaveFinished { outcome: SaveOutcome },
}
