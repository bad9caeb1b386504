//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a span of the Earthfile.
///
/// A primary label marks where the problem is. Secondary labels point at
/// related places, such as the first `FROM` of a target that has two.
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_kinds() {
        let primary = Label::primary(Span::new(10..20), "second base image");
        assert!(primary.is_primary());
        assert_eq!(primary.span(), Span::new(10..20));
        assert_eq!(primary.message(), "second base image");

        let secondary = Label::secondary(Span::new(5..15), "first base image");
        assert!(secondary.is_secondary());
        assert!(!secondary.is_primary());
    }
}
