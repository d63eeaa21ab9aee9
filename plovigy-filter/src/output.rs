//! Labelled output sink
//!
//! Each coded record is written as pretty-printed JSON (2-space indent,
//! sorted keys) and flushed immediately, so a crash loses at most the record
//! in flight.

use crate::corpus::Record;
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Marker in regular story file names
const STORIES_MARKER: &str = "-stories.";

/// Output file name for a corpus file name and session tag
///
/// `x-stories.jsonl` becomes `x-labelled-<tag>.jsonl`; any other name `n`
/// becomes `null-labelled-<tag>-n`.
pub fn output_file_name(corpus_file_name: &str, tag: &str) -> String {
    if corpus_file_name.contains(STORIES_MARKER) {
        corpus_file_name.replace(STORIES_MARKER, &format!("-labelled-{}.", tag))
    } else {
        format!("null-labelled-{}-{}", tag, corpus_file_name)
    }
}

/// Output path next to the corpus
pub fn output_path_for(corpus: &Path, tag: &str) -> Result<PathBuf> {
    let name = corpus
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            Error::StartupConfig(format!("Corpus path {} has no file name", corpus.display()))
        })?;
    Ok(corpus.with_file_name(output_file_name(name, tag)))
}

/// `path` with `-<n>` inserted before the extension
fn numbered(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}-{}", stem, n),
    };
    path.with_file_name(name)
}

/// Open output file for one session
pub struct LabelledOutput {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl LabelledOutput {
    /// Create the output file, never replacing an existing one
    ///
    /// If `path` is taken, `-1`, `-2`, ... is inserted before the extension
    /// until a free name is found.
    pub fn create(path: &Path) -> Result<Self> {
        let mut candidate = path.to_path_buf();
        let mut n = 0;
        let file = loop {
            match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(file) => break file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    n += 1;
                    candidate = numbered(path, n);
                }
                Err(e) => {
                    return Err(Error::Output(format!(
                        "Cannot create {}: {}",
                        candidate.display(),
                        e
                    )))
                }
            }
        };

        info!("Writing labelled records to {}", candidate.display());
        Ok(Self {
            path: candidate,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Append one record and flush it
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let text = serde_json::to_string_pretty(record.as_map())?;
        self.writer
            .write_all(text.as_bytes())
            .and_then(|_| self.writer.write_all(b"\n"))
            .and_then(|_| self.writer.flush())
            .map_err(|e| Error::Output(format!("Write to {} failed: {}", self.path.display(), e)))?;
        self.written += 1;
        Ok(())
    }

    /// Flush and sync; consumes the sink
    pub fn close(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .and_then(|_| self.writer.get_ref().sync_all())
            .map_err(|e| Error::Output(format!("Closing {} failed: {}", self.path.display(), e)))?;
        Ok(self.path)
    }
}
