//! Position ledger
//!
//! Append-only text file with one line per session:
//!
//! ```text
//! <corpus> <index> <tag> <output>  accept:  1  reject:  1  auto:  0  total:  2
//! ```
//!
//! optionally followed by `  autoFilename:<rule file>`. An index of `-1`
//! marks a corpus that was coded to the end. The file is always read in
//! full and the last entry for a corpus wins.

use crate::error::{Error, Result};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ledger value marking a fully coded corpus
pub const COMPLETED_SENTINEL: i64 = -1;

/// Where the next session on a corpus should start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePoint {
    /// Start at this record index
    At(usize),
    /// Every record has already been coded
    Completed,
}

impl ResumePoint {
    /// Value stored in the ledger's index column
    pub fn as_ledger_value(&self) -> i64 {
        match self {
            ResumePoint::At(index) => *index as i64,
            ResumePoint::Completed => COMPLETED_SENTINEL,
        }
    }

    /// Inverse of [`as_ledger_value`](Self::as_ledger_value); any negative value is the sentinel
    pub fn from_ledger_value(value: i64) -> Self {
        if value < 0 {
            ResumePoint::Completed
        } else {
            ResumePoint::At(value as usize)
        }
    }
}

impl fmt::Display for ResumePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ledger_value())
    }
}

/// Per-session decision counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounters {
    pub accepted: usize,
    pub skipped: usize,
    pub autocoded: usize,
}

impl SessionCounters {
    pub fn total(&self) -> usize {
        self.accepted + self.skipped + self.autocoded
    }
}

/// One ledger line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub corpus: String,
    pub position: ResumePoint,
    pub tag: String,
    pub output: String,
    pub counters: SessionCounters,
    pub autocode_file: Option<String>,
}

impl LedgerEntry {
    /// Serialise as a single ledger line (no trailing newline)
    pub fn to_line(&self) -> String {
        let c = &self.counters;
        let mut line = format!(
            "{} {} {} {}  accept:{:3}  reject:{:3}  auto:{:3}  total:{:3}",
            self.corpus,
            self.position,
            self.tag,
            self.output,
            c.accepted,
            c.skipped,
            c.autocoded,
            c.total()
        );
        if let Some(file) = &self.autocode_file {
            line.push_str("  autoFilename:");
            line.push_str(file);
        }
        line
    }
}

/// Handle on the ledger file
#[derive(Debug, Clone)]
pub struct PositionLedger {
    path: PathBuf,
}

impl PositionLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resume point recorded by the most recent entry for `corpus`
    ///
    /// A ledger that does not exist yet means "start at 0". A ledger that
    /// exists but cannot be read, or whose entry for `corpus` has a bad
    /// index, is `LedgerUnreadable`.
    pub fn resume_index(&self, corpus: &str) -> Result<ResumePoint> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(ledger = %self.path.display(), "No ledger yet, starting at 0");
                return Ok(ResumePoint::At(0));
            }
            Err(e) => return Err(self.unreadable(e.to_string())),
        };

        let mut point = ResumePoint::At(0);
        for (n, line) in contents.lines().enumerate() {
            let mut fields = line.split_whitespace();
            if fields.next() != Some(corpus) {
                continue;
            }
            let value = fields
                .next()
                .and_then(|v| v.parse::<i64>().ok())
                .ok_or_else(|| {
                    self.unreadable(format!("line {} has no valid record index", n + 1))
                })?;
            point = ResumePoint::from_ledger_value(value);
        }

        debug!(corpus, resume = %point, "Resolved resume point from ledger");
        Ok(point)
    }

    /// Append one entry and flush it to disk
    ///
    /// Earlier entries are never rewritten.
    pub fn append(&self, entry: &LedgerEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", entry.to_line())?;
        file.sync_all()?;

        debug!(ledger = %self.path.display(), entry = %entry.to_line(), "Appended ledger entry");
        Ok(())
    }

    fn unreadable(&self, message: String) -> Error {
        Error::LedgerUnreadable {
            path: self.path.clone(),
            message,
        }
    }
}
