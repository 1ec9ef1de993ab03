//! Bounded LRU cache of parsed chunk payloads.
//!
//! Maps chunk number to the chunk's ordered entries. Capacity counts chunks,
//! not bytes. Eviction only ever frees payload memory; the metadata index is
//! a separate structure and keeps describing evicted chunks, so a miss is
//! always recoverable by re-reading at the chunk's recorded start offset.

use crate::entry::LogEntry;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub const DEFAULT_CACHE_CHUNKS: usize = 16;

#[derive(Debug)]
pub struct EntryCache {
    chunks: LruCache<u64, Arc<Vec<LogEntry>>>,
}

impl EntryCache {
    /// Create a cache holding at most `capacity` chunks. A zero capacity is
    /// clamped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            chunks: LruCache::new(capacity),
        }
    }

    /// Fetch a chunk's entries, marking it most recently used.
    pub fn get(&mut self, chunk_number: u64) -> Option<Arc<Vec<LogEntry>>> {
        self.chunks.get(&chunk_number).cloned()
    }

    /// True when the chunk's payload is resident, without touching recency.
    pub fn contains(&self, chunk_number: u64) -> bool {
        self.chunks.contains(&chunk_number)
    }

    /// Insert a chunk's entries, evicting the least recently used chunk when
    /// over capacity.
    pub fn put(&mut self, chunk_number: u64, entries: Vec<LogEntry>) {
        self.chunks.put(chunk_number, Arc::new(entries));
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }
}

impl Default for EntryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CHUNKS)
    }
}
