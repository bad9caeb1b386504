//! Error types for Earthfile translation.
//!
//! This module provides the main error type [`TranslateError`] for all
//! translation operations.

use std::io;

use thiserror::Error;

use earthly2dagger_parser::ParseError;

use crate::format;

/// The main error type for translation operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the Earthfile source next to the diagnostics so
/// that callers can render labelled snippets.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Format error: {0}")]
    Format(#[from] format::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl TranslateError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
