//! Accumulates diagnostics for phases that recover from errors.

use crate::error::{Diagnostic, ParseError};

/// Collects the diagnostics of one phase.
///
/// The lexer and the parser keep going after an error so that a single run
/// reports every problem they can find. [`finish`](Self::finish) turns the
/// collection into a result.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// `Err` with every diagnostic if at least one error was emitted.
    ///
    /// Warnings alone do not fail the phase and are dropped.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_empty_collector_is_ok() {
        assert!(DiagnosticCollector::new().finish().is_ok());
    }

    #[test]
    fn test_warnings_only_is_ok() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("warning 1"));
        collector.emit(Diagnostic::warning("warning 2"));
        assert!(collector.finish().is_ok());
    }

    #[test]
    fn test_errors_keep_all_diagnostics() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(
            Diagnostic::error("unexpected character")
                .with_code(ErrorCode::E002)
                .with_label(Span::new(10..11), "here"),
        );
        collector.emit(Diagnostic::warning("test warning"));
        collector.emit(Diagnostic::error("unterminated string literal"));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 3);
        assert_eq!(err.diagnostics()[0].message(), "unexpected character");
    }
}
