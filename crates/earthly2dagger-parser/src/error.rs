//! Diagnostics reported while reading an Earthfile.
//!
//! Every phase of [`parse`](crate::parse) reports problems as [`Diagnostic`]s:
//! a severity, an error code, labeled source spans and optional help text.
//! The lexer and parser recover and report everything they find, the
//! resolver stops at the first error. Either way the caller receives a
//! [`ParseError`] wrapping the diagnostics.
//!
//! # Example
//!
//! ```
//! # use earthly2dagger_parser::error::{Diagnostic, ErrorCode};
//! # use earthly2dagger_parser::Span;
//!
//! let span = Span::new(40..52);
//! let first = Span::new(10..22);
//!
//! let diag = Diagnostic::error("target `build` has more than one FROM")
//!     .with_code(ErrorCode::E201)
//!     .with_label(span, "second base image")
//!     .with_secondary_label(first, "first base image")
//!     .with_help("split the target or remove one FROM");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
