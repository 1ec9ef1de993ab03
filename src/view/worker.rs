//! The background read worker.
//!
//! Exactly one worker task runs per view. It owns all file I/O (open, stat,
//! seek, read) and all parser invocation, so the coordinator side never
//! blocks and never shares parser or file state across threads. Commands
//! arrive over a channel and are processed strictly in order; with the
//! coordinator's single-in-flight discipline, responses come back in request
//! order by construction.

use crate::error::{PagerError, Result};
use crate::filter::FilteringOptions;
use crate::parser::LineParser;
use crate::reader::{read_chunk, ChunkPayload};
use crate::view::protocol::{WorkerCommand, WorkerResponse};
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::PathBuf;
use tokio::sync::mpsc::{Receiver, Sender};

/// Run the read worker, processing commands from the coordinator until
/// shutdown or channel closure.
pub async fn read_worker_loop(
    mut rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    path: PathBuf,
) {
    let worker = ReadWorker { path };

    while let Some(cmd) = rx.recv().await {
        let outcome = worker.handle_command(cmd);
        if let Some(response) = outcome.response {
            if tx.send(response).await.is_err() {
                break;
            }
        }

        if outcome.done {
            break;
        }
    }
}

struct ReadWorker {
    path: PathBuf,
}

impl ReadWorker {
    fn handle_command(&self, cmd: WorkerCommand) -> HandlerOutcome {
        match cmd {
            WorkerCommand::ReadChunk {
                request_id,
                from_offset,
                max_entries,
                options,
            } => match self.read_chunk_at(from_offset, max_entries, &options) {
                Ok((payload, file_size)) => {
                    debug!(
                        "chunk read at {from_offset}: {} entries, end offset {}",
                        payload.entries.len(),
                        payload.end_offset
                    );
                    HandlerOutcome::respond(WorkerResponse::ChunkRead {
                        request_id,
                        from_offset,
                        end_offset: payload.end_offset,
                        entries: payload.entries,
                        file_size,
                    })
                }
                Err(error) => {
                    warn!("chunk read at {from_offset} failed: {error}");
                    HandlerOutcome::respond(WorkerResponse::Error { request_id, error })
                }
            },
            WorkerCommand::Stat => HandlerOutcome::respond(WorkerResponse::Stat {
                size: self.stat_size(),
            }),
            WorkerCommand::Shutdown => HandlerOutcome::exit(),
        }
    }

    /// Open fresh for every read. The file grows and may be replaced
    /// underneath us; a persistent handle would pin a deleted inode and hide
    /// truncation.
    fn read_chunk_at(
        &self,
        from_offset: u64,
        max_entries: usize,
        options: &FilteringOptions,
    ) -> Result<(ChunkPayload, u64)> {
        let file = File::open(&self.path)?;
        let file_size = file.metadata()?.len();
        if from_offset > file_size {
            return Err(PagerError::InvalidOffset {
                offset: from_offset,
                file_size,
            });
        }

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(from_offset))?;
        let parser = LineParser::new(options)?;
        let payload = read_chunk(&mut reader, from_offset, max_entries, &parser)?;
        Ok((payload, file_size))
    }

    fn stat_size(&self) -> Option<u64> {
        std::fs::metadata(&self.path).ok().map(|meta| meta.len())
    }
}

struct HandlerOutcome {
    response: Option<WorkerResponse>,
    done: bool,
}

impl HandlerOutcome {
    fn respond(response: WorkerResponse) -> Self {
        Self {
            response: Some(response),
            done: false,
        }
    }

    fn exit() -> Self {
        Self {
            response: None,
            done: true,
        }
    }
}
