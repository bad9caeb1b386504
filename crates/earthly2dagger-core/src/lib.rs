//! earthly2dagger Core Types and Definitions
//!
//! This crate provides the foundational types shared by the parser and the
//! code generator. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Semantic**: The resolved build model ([`semantic`] module)
//! - **Expansion**: Lexical detection of `$NAME` / `${NAME}` references ([`expansion`] module)
//! - **Naming**: Identifier conventions of the generated Go code ([`naming`] module)

pub mod expansion;
pub mod identifier;
pub mod naming;
pub mod semantic;
