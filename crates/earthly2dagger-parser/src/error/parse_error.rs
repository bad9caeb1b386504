//! The error returned when an Earthfile cannot be read.

use std::fmt;

use crate::error::Diagnostic;

/// One or more diagnostics from lexing, parsing or resolving an Earthfile.
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Diagnostics in the order they were reported.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.diagnostics.first() {
            write!(f, "{first}")?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_error_display_single() {
        let err: ParseError = Diagnostic::error("missing base image")
            .with_code(ErrorCode::E202)
            .into();
        assert_eq!(err.to_string(), "error[E202]: missing base image");
    }

    #[test]
    fn test_parse_error_display_multiple() {
        let err = ParseError::new(vec![
            Diagnostic::error("first error"),
            Diagnostic::error("second error"),
            Diagnostic::error("third error"),
        ]);
        assert_eq!(err.diagnostics().len(), 3);
        assert_eq!(err.to_string(), "error: first error (+2 more)");
    }
}
