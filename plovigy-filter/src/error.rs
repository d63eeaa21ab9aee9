//! Error types for plovigy-filter
//!
//! Every variant is fatal for the session. Once a session is running, the
//! controller records its position in the ledger before propagating.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for plovigy-filter
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing startup input (corpus path, rule file, identity)
    #[error("Startup configuration error: {0}")]
    StartupConfig(String),

    /// A logical record in the corpus did not decode
    #[error("Corpus format error at record {index}: {message}")]
    CorpusFormat { index: usize, message: String },

    /// The position ledger exists but cannot be read or parsed
    #[error("Position ledger {path} is unreadable: {message}")]
    LedgerUnreadable { path: PathBuf, message: String },

    /// Malformed line in an autocode rule file
    #[error("Autocode rule file {path}, line {line}: {message}")]
    RuleFormat {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Labelled output could not be created or written
    #[error("Output error: {0}")]
    Output(String),

    /// Terminal could not be drawn to or read from
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type using plovigy-filter Error
pub type Result<T> = std::result::Result<T, Error>;
