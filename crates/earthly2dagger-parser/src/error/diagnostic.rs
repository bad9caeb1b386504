//! A single reportable problem with its source locations.

use std::fmt;

use crate::{
    error::{ErrorCode, Label, Severity},
    span::Span,
};

/// A diagnostic message with source location information.
///
/// Rendered by the command line front end roughly as:
///
/// ```text
/// error[E201]: target `build` has more than one FROM
///   --> Earthfile:4:5
///    |
///  4 |     FROM debian
///    |     ^^^^^^^^^^^ second base image
///    |
///  2 |     FROM alpine
///    |     ----------- first base image
///    |
///    = help: split the target or remove one FROM
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use earthly2dagger_parser::error::{Diagnostic, ErrorCode};
    /// # use earthly2dagger_parser::Span;
    ///
    /// let diag = Diagnostic::error("undeclared variable `TAG`")
    ///     .with_code(ErrorCode::E200)
    ///     .with_label(Span::new(20..24), "not declared")
    ///     .with_help("declare it with `ARG TAG` before this statement");
    /// assert_eq!(diag.to_string(), "error[E200]: undeclared variable `TAG`");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Primary labels first as they were added, then secondary ones.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The span of the first primary label, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::span)
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_defaults() {
        let diag = Diagnostic::error("missing base image");

        assert!(diag.severity().is_error());
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
        assert!(diag.primary_span().is_none());
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::error("target `build` has more than one FROM")
            .with_code(ErrorCode::E201)
            .with_secondary_label(Span::new(10..21), "first base image")
            .with_label(Span::new(30..41), "second base image")
            .with_help("split the target or remove one FROM");

        assert_eq!(diag.code(), Some(ErrorCode::E201));
        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_secondary());
        assert_eq!(diag.primary_span(), Some(Span::new(30..41)));
        assert_eq!(diag.help(), Some("split the target or remove one FROM"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error("unknown directive `COPY`").with_code(ErrorCode::E102);
        assert_eq!(diag.to_string(), "error[E102]: unknown directive `COPY`");

        let diag = Diagnostic::warning("argument passed literally");
        assert_eq!(diag.to_string(), "warning: argument passed literally");
    }
}
