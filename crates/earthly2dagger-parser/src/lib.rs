//! # earthly2dagger Parser
//!
//! Front end of the Earthfile translator. This crate turns Earthfile source
//! text into the resolved [`earthly2dagger_core::semantic::Document`] that the
//! code generator consumes.
//!
//! ## Usage
//!
//! ```
//! # use earthly2dagger_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "VERSION 0.7\n\ntest-expose-port:\n    FROM alpine\n    EXPOSE 8080\n";
//!
//!     let document = parse(source)?;
//!     assert_eq!(document.targets()[0].name(), "test-expose-port");
//!     Ok(())
//! }
//! ```

pub mod error;
mod lexer;
mod parser;
mod parser_types;
mod resolve;
mod span;
mod tokens;

pub use error::ParseError;
pub use span::{Location, Span, Spanned};

use log::{debug, info, trace};

use earthly2dagger_core::semantic::Document;

/// Parse Earthfile source text into the resolved build model.
///
/// This orchestrates the complete front-end pipeline:
///
/// 1. **Tokenize** - Convert source text to tokens
/// 2. **Parse** - Build the syntax tree from tokens
/// 3. **Resolve** - Check names and scopes, producing the semantic model
///
/// # Errors
///
/// Returns a [`ParseError`] carrying every lexer diagnostic, or the first
/// parser or resolver diagnostic.
///
/// ```
/// # use earthly2dagger_parser::{parse, error::ErrorCode};
///
/// let err = parse("build:\n    FROM alpine\n    FROM ubuntu\n").unwrap_err();
/// assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E201));
/// ```
pub fn parse(source: &str) -> Result<Document, ParseError> {
    info!(bytes = source.len(); "Parsing Earthfile");

    // Step 1: Tokenize
    let tokens = lexer::tokenize(source)?;
    debug!(tokens = tokens.len(); "Tokenized");

    // Step 2: Parse
    let ast = parser::build_document(&tokens)?;
    if let Some(version) = &ast.version {
        debug!(version = version.as_str(); "Earthfile version");
    }
    trace!(ast:?; "Parsed syntax tree");

    // Step 3: Resolve
    let document = resolve::resolve(&ast).map_err(error::Diagnostic::from)?;
    info!(targets = document.len(); "Resolved Earthfile");

    Ok(document)
}
