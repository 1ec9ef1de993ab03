//! Bulk export of all matching entries to a file.
//!
//! A save pass is a long-running operation that re-scans the log from its
//! start with its own file handle and its own parser, so it never contends
//! with interactive paging and never depends on the live cache. Progress is
//! reported as a monotonically increasing percentage of bytes consumed out
//! of the file size observed when the pass started. Cancellation is
//! cooperative: a shared flag checked once per chunk batch, so the pass
//! stops at the next batch boundary rather than instantly.

use crate::error::Result;
use crate::filter::FilteringOptions;
use crate::parser::LineParser;
use crate::reader::read_chunk;
use crate::view::protocol::{SaveOutcome, ViewEvent};
use log::debug;
use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Handle to a running save pass.
#[derive(Debug)]
pub struct SaveHandle {
    cancel: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl SaveHandle {
    /// Request cancellation. Takes effect at the next batch boundary.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a save pass over `source`, writing matching entries to `target`.
/// Filter compilation happens up front so an invalid pattern fails here
/// instead of inside the task.
pub(crate) fn spawn_save(
    source: PathBuf,
    target: PathBuf,
    options: FilteringOptions,
    batch_entries: usize,
    events: UnboundedSender<ViewEvent>,
) -> Result<SaveHandle> {
    let parser = LineParser::new(&options)?;
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);

    let task = tokio::spawn(async move {
        let progress = events.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            run_save(&source, &target, &parser, batch_entries, &progress, &flag)
        })
        .await
        .unwrap_or_else(|join_error| SaveOutcome::Failed {
            message: format!("save task panicked: {join_error}"),
        });
        let _ = events.send(ViewEvent::SaveFinished { outcome });
    });

    Ok(SaveHandle { cancel, task })
}

fn run_save(
    source: &Path,
    target: &Path,
    parser: &LineParser,
    batch_entries: usize,
    events: &UnboundedSender<ViewEvent>,
    cancel: &AtomicBool,
) -> SaveOutcome {
    match save_pass(source, target, parser, batch_entries, events, cancel) {
        Ok(Some(entries_written)) => {
            debug!("save completed: {entries_written} entries");
            SaveOutcome::Completed { entries_written }
        }
        Ok(None) => SaveOutcome::Cancelled,
        Err(error) => SaveOutcome::Failed {
            message: error.to_string(),
        },
    }
}

/// Returns `Ok(Some(written))` on completion, `Ok(None)` on cancellation.
fn save_pass(
    source: &Path,
    target: &Path,
    parser: &LineParser,
    batch_entries: usize,
    events: &UnboundedSender<ViewEvent>,
    cancel: &AtomicBool,
) -> Result<Option<u64>> {
    let file = File::open(source)?;
    let total = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let mut out = BufWriter::new(File::create(target)?);

    let mut offset = 0u64;
    let mut written = 0u64;
    let mut last_percent = 0.0f64;

    loop {
        if cancel.load(Ordering::Relaxed) {
            return Ok(None);
        }

        // Re-seek every batch: a bounded read may probe one line past the
        // chunk boundary to find it, leaving the reader ahead of the
        // returned end offset.
        reader.seek(SeekFrom::Start(offset))?;
        let payload = read_chunk(&mut reader, offset, batch_entries, parser)?;
        for entry in &payload.entries {
            writeln!(out, "{entry}")?;
        }
        written += payload.entries.len() as u64;

        let consumed_nothing = payload.end_offset == offset;
        offset = payload.end_offset;

        let percent = if total == 0 {
            100.0
        } else {
            (offset.min(total) as f64 / total as f64) * 100.0
        };
        if percent > last_percent {
            last_percent = percent;
            let _ = events.send(ViewEvent::SaveProgress { percent });
        }

        if consumed_nothing || offset >= total {
            break;
        }
    }

    out.flush()?;
    Ok(Some(written))
}
