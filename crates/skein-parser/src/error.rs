//! Error and diagnostic system for the Skein parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Labeled spans pointing into the export source
//! - Severity levels
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, source labels,
//! and help text. Multiple diagnostics are wrapped in [`ParseError`] for
//! returning from export loading. Directive parsing never fails; it hands its
//! warnings back as plain [`Diagnostic`]s.
//!
//! # Example
//!
//! ```
//! # use skein_parser::error::{Diagnostic, ErrorCode};
//! # use skein_parser::Span;
//!
//! let diag = Diagnostic::error("node `0x10` is defined more than once")
//!     .with_code(ErrorCode::E003)
//!     .with_label(Span::new(120..140), "duplicate definition")
//!     .with_help("re-export the project; node ids must be unique");
//! ```

mod collector;
mod diagnostic;
mod error_code;

use std::fmt;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;

/// The export could not be loaded.
///
/// Holds every diagnostic collected before loading gave up, errors and
/// warnings alike, in the order they were found.
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of error-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity().is_error())
            .count()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(first) = self.diagnostics.first() else {
            return f.write_str("export could not be loaded");
        };
        write!(f, "{first}")?;
        match self.diagnostics.len() - 1 {
            0 => Ok(()),
            1 => f.write_str(" (and 1 more problem)"),
            more => write!(f, " (and {more} more problems)"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self::new(diagnostics)
    }
}
