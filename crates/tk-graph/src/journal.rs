//! Append-only write-ahead log backing the graph store's durability.
//!
//! Every mutation is appended to `graph.journal` as one JSON line before it
//! is applied in memory. `graph.snapshot.json` holds a compacted view of
//! the state as of the last `compact()` call. On open, the store loads the
//! snapshot (if any) and replays every journal line after it — so a crash
//! between an append and the next snapshot loses nothing, and a half
//! written final line (the only way a crash can corrupt this format) is
//! simply skipped.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tk_domain::error::{Error, Result};
use tk_domain::{Noun, Relation};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JournalOp {
    UpsertNoun(Noun),
    UpsertRelation(Relation),
    DeleteNoun(String),
    DeleteRelations(Vec<String>),
}

pub struct Journal {
    path: PathBuf,
    file: File,
}

impl Journal {
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join("graph.journal");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(Error::Io)?;
        Ok(Self { path, file })
    }

    /// Read every well-formed line in the journal, in order. A trailing
    /// partial line (the only artifact a mid-write crash can leave) is
    /// silently dropped.
    pub fn replay(dir: &Path) -> Result<Vec<JournalOp>> {
        let path = dir.join("graph.journal");
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&path).map_err(Error::Io)?;
        let reader = BufReader::new(file);
        let mut ops = Vec::new();
        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(op) => ops.push(op),
                Err(_) => break, // truncated tail line, stop replaying
            }
        }
        Ok(ops)
    }

    pub fn append(&mut self, op: &JournalOp) -> Result<()> {
        let line = serde_json::to_string(op).map_err(Error::Json)?;
        self.file.write_all(line.as_bytes()).map_err(Error::Io)?;
        self.file.write_all(b"\n").map_err(Error::Io)?;
        self.file.flush().map_err(Error::Io)?;
        Ok(())
    }

    /// Truncate the journal to empty. Callers must have already durably
    /// written an equivalent snapshot before calling this.
    pub fn truncate(&mut self) -> Result<()> {
        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(Error::Io)?;
        Ok(())
    }
}
