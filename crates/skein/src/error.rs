//! Error types for Skein operations.
//!
//! This module provides the main error type [`SkeinError`] which wraps the
//! error conditions of every stage: reading the export, parsing it,
//! compiling the graph and writing the output.

use std::io;

use thiserror::Error;

use skein_parser::error::ParseError;

use crate::{compile, output};

/// The main error type for Skein operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the export source next to the structured
/// diagnostics so reporters can show labelled snippets.
#[derive(Debug, Error)]
pub enum SkeinError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Compile error: {0}")]
    Compile(#[from] compile::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::Error),
}

impl SkeinError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
