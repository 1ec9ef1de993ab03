//! Viewer coordination subsystem.
//!
//! The coordinator ([`LogView`]) runs on the embedder's task and owns the
//! index, cache, and request bookkeeping; the read worker owns all file I/O.
//! They talk exclusively through the message types in [`protocol`].

pub mod coordinator;
pub mod protocol;
pub mod save;
pub mod worker;

// Public re-exports for convenience. Modules outside this crate should prefer
// importing from `crate::view` rather than reaching into submodules.
pub use coordinator::{LogView, RowSource, ViewConfig, DEFAULT_CHUNK_ENTRIES};
pub use protocol::{
    InvalidationReason, PendingRequest, ReadReasons, RequestId, SaveOutcome, ViewEvent,
    WorkerCommand, WorkerResponse,
};
pub use save::SaveHandle;
pub use worker::read_worker_loop;
