//! Streaming JSON array writer.
//!
//! Appends serialized records to a growing array without holding the whole
//! document in memory. Separator placement is driven by explicit state, never
//! inferred from the file's tail, so an interrupted run can leave at most one
//! dangling separator for the repair pass to clean up.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Writer state: whether at least one record has been appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Prologue written, no records yet.
    Empty,
    /// At least one record written; the next append needs a separator.
    HasItems,
}

/// Append-only writer for a JSON array document.
///
/// The prologue `[` is written on construction; [`ArrayWriter::close`]
/// appends the closing `]`. Records are written one per line. Every append
/// flushes, so a crash mid-run loses at most the record being written.
pub struct ArrayWriter<W: Write> {
    out: W,
    state: State,
}

impl ArrayWriter<BufWriter<File>> {
    /// Create the output document at `path` and write the array prologue.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> ArrayWriter<W> {
    /// Wrap an output sink and write the array prologue.
    pub fn new(mut out: W) -> Result<Self> {
        out.write_all(b"[")?;
        out.flush()?;
        Ok(Self {
            out,
            state: State::Empty,
        })
    }

    /// Append one already-serialized record.
    ///
    /// A `,` separator is written strictly between two records: never before
    /// the first, never after the last.
    pub fn append(&mut self, record_json: &str) -> Result<()> {
        match self.state {
            State::Empty => self.out.write_all(b"\n")?,
            State::HasItems => self.out.write_all(b",\n")?,
        }
        self.out.write_all(record_json.as_bytes())?;
        self.out.flush()?;
        self.state = State::HasItems;
        Ok(())
    }

    /// Terminate the array. Valid from either state; `close` on an empty
    /// writer produces `[]`.
    pub fn close(mut self) -> Result<()> {
        match self.state {
            State::Empty => self.out.write_all(b"]\n")?,
            State::HasItems => self.out.write_all(b"\n]\n")?,
        }
        self.out.flush()?;
        Ok(())
    }

    /// Whether no records have been appended yet.
    pub fn is_empty(&self) -> bool {
        self.state == State::Empty
    }
}
