//! Chunk reading: bounded, resumable parses of a byte range into entries.
//!
//! A chunk read consumes whole lines starting at a known byte offset and
//! stops after a bounded number of new entries. The returned end offset is
//! the position immediately after the last consumed line, so the next read
//! resumes exactly where this one stopped. The reader itself never touches
//! the filesystem; it operates on any [`BufRead`], which keeps it testable
//! against in-memory buffers.

use crate::entry::LogEntry;
use crate::error::Result;
use crate::parser::{LineParser, ParseStatus};
use bstr::ByteSlice;
use std::io::BufRead;

/// A completed chunk read: the surviving entries and the byte offset to
/// resume from.
#[derive(Debug)]
pub struct ChunkPayload {
    pub entries: Vec<LogEntry>,
    pub end_offset: u64,
}

/// Read up to `max_entries` entries from `reader`, which must already be
/// positioned at `from_offset`.
///
/// Once the entry budget is reached the read keeps consuming continuation
/// lines belonging to the last entry, and stops, without consuming, at the
/// next header line. Chunk boundaries therefore always fall between whole
/// entries, and `end_offset` of one chunk is the exact `from_offset` of the
/// next. The final line of the file counts even without a trailing newline,
/// so a read that exhausts the input always reports the true end of file.
pub fn read_chunk<R: BufRead>(
    reader: &mut R,
    from_offset: u64,
    max_entries: usize,
    parser: &LineParser,
) -> Result<ChunkPayload> {
    let mut entries = Vec::new();
    let mut status = ParseStatus::initial();
    let mut consumed: u64 = 0;
    let mut created: usize = 0;
    let mut buf: Vec<u8> = Vec::new();

    loop {
        buf.clear();
        let bytes_read = reader.read_until(b'\n', &mut buf)?;
        if bytes_read == 0 {
            break;
        }
        let line = trim_line_ending(&buf).to_str_lossy();

        if created >= max_entries && parser.is_header(&line) {
            // Next entry starts here; leave it for the following chunk.
            break;
        }

        status = parser.parse_line(&line, status, &mut entries)?;
        consumed += bytes_read as u64;
        if status == ParseStatus::CreatedNewEntry {
            created += 1;
        }
    }

    Ok(ChunkPayload {
        entries,
        end_offset: from_offset + consumed,
    })
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
