//! # PLOVIGY Common Library
//!
//! Shared code for the PLOVIGY record-coding tools including:
//! - Error types
//! - Configuration loading (TOML + environment + command line)
//! - Logging bootstrap
//! - Wall-clock timestamp formatting

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use error::{Error, Result};
