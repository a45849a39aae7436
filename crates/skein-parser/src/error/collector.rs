//! Accumulates diagnostics so validation can report every problem of an
//! export in one run.

use crate::error::{Diagnostic, ParseError};

#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Fails with everything collected once any error-severity diagnostic
    /// was emitted; otherwise hands the warnings back.
    pub fn finish(self) -> Result<Vec<Diagnostic>, ParseError> {
        if self
            .diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity().is_error())
        {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}
