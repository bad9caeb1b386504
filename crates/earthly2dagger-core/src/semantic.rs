//! Resolved build model types.
//!
//! This module contains the semantic representation of an Earthfile after
//! parsing and resolution. These types are immutable once produced by the
//! resolver and are the only input of the code generator.
//!
//! # Pipeline Position
//!
//! ```text
//! Source Text
//!     ↓ lexer
//! Tokens
//!     ↓ parser
//! Parser AST (parser_types) - syntactic structure with spans
//!     ↓ resolve
//! Semantic Model (these types) - scopes, parameters, dependency indices
//!     ↓ codegen
//! Go functions
//!     ↓ emit
//! Go source unit
//! ```
//!
//! # Organization
//!
//! - [`document`] - [`Document`], [`Target`], [`TargetIndex`], [`Param`], [`Scope`]
//! - [`statement`] - [`Statement`] and its payload types

pub mod document;
pub mod statement;

pub use document::*;
pub use statement::*;
