//! # PLOVIGY discard-mode filter (plovigy-filter)
//!
//! Interactive coding of PLOVIGY line-delimited JSON story files into ten
//! discard-mode categories.
//!
//! **Purpose:** Stream records from a corpus, autocode the ones whose
//! opening text contains a listed phrase, ask the operator about the rest
//! one keystroke at a time, and write the labelled records to a new file.
//!
//! **Resumability:** Every session appends its stopping point to a position
//! ledger; the next session on the same corpus picks up from the most
//! recent entry.

pub mod autocode;
pub mod categories;
pub mod classifier;
pub mod corpus;
pub mod error;
pub mod ledger;
pub mod output;
pub mod session;
pub mod terminal;
pub mod view;

pub use error::{Error, Result};
pub use session::{FilterConfig, SessionController, SessionSummary};
