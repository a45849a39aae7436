//! Error codes for the Skein diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Export loading errors
//! - `E1xx` - Directive warnings

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Export Errors (E0xx)
    // =========================================================================
    /// Invalid JSON.
    ///
    /// The export file is not syntactically valid JSON.
    E001,

    /// Unexpected export structure.
    ///
    /// The JSON is valid but a required field is missing or has the wrong type.
    E002,

    /// Duplicate node id.
    ///
    /// Two models in the export share the same id.
    E003,

    /// Duplicate pin id.
    ///
    /// Two pins in the export share the same id.
    E004,

    /// Missing flow hierarchy.
    ///
    /// The export hierarchy has no `Flow` element, so there is nothing to compile.
    E005,

    // =========================================================================
    // Directive Warnings (E1xx)
    // =========================================================================
    /// Malformed directive.
    ///
    /// A directive item looks like `key=value` but the value is not quoted,
    /// or the key is missing.
    E100,

    /// Unterminated directive value.
    ///
    /// A quoted directive value is missing its closing quote.
    E101,

    /// Duplicate directive key.
    ///
    /// The same key appears twice; the last value wins.
    E102,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "invalid JSON",
            ErrorCode::E002 => "unexpected export structure",
            ErrorCode::E003 => "duplicate node id",
            ErrorCode::E004 => "duplicate pin id",
            ErrorCode::E005 => "missing flow hierarchy",
            ErrorCode::E100 => "malformed directive",
            ErrorCode::E101 => "unterminated directive value",
            ErrorCode::E102 => "duplicate directive key",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
