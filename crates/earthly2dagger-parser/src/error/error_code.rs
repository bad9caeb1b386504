//! Error codes for Earthfile diagnostics.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Resolver errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but not closed on the same line.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that is not valid in this context.
    E002,

    /// Invalid escape sequence.
    ///
    /// An unrecognized escape sequence was used in a double-quoted string.
    /// Valid escapes are: `\"`, `\\`, `\'`, `\n`, `\t`, `\r`, `\$`.
    E003,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended unexpectedly before a complete statement was parsed.
    E101,

    /// Unknown directive.
    ///
    /// A statement starts with a word that is not a supported directive.
    E102,

    /// Unsupported syntax.
    ///
    /// The construct is valid Earthfile syntax but cannot be translated,
    /// for example `FROM +target` or a `BUILD` of a remote target.
    E103,

    /// Invalid port.
    ///
    /// An `EXPOSE` port is not a number in `1..=65535` or has an unknown protocol.
    E104,

    /// Statement outside a target.
    ///
    /// Only `VERSION` may appear before the first target header.
    E105,

    // =========================================================================
    // Resolver Errors (E2xx)
    // =========================================================================
    /// Undeclared variable.
    ///
    /// A `$NAME` reference does not name an `ARG` or `ENV` declared earlier
    /// in the same target.
    E200,

    /// Duplicate base image.
    ///
    /// A target contains more than one `FROM`.
    E201,

    /// Missing base image.
    ///
    /// A target that builds a container has no `FROM`.
    E202,

    /// Cyclic dependency.
    ///
    /// Targets invoke each other through `BUILD` in a cycle.
    E203,

    /// Unknown target reference.
    ///
    /// A `BUILD` names a target that is not defined in the Earthfile.
    E204,

    /// Duplicate target.
    ///
    /// Two targets have the same name.
    E205,

    /// Empty target.
    ///
    /// A target header is followed by no statements.
    E206,

    /// Statement before base image.
    ///
    /// A statement that needs a container appears before `FROM`.
    E207,

    /// Unknown build argument.
    ///
    /// A `BUILD` passes an argument the target does not declare.
    E208,

    /// Missing build argument.
    ///
    /// A `BUILD` does not pass a required argument of the target.
    E209,

    /// Conflicting function name.
    ///
    /// Two target names map to the same generated function name, or a
    /// target name maps to a name the generated module already uses.
    E210,

    /// Conflicting parameter name.
    ///
    /// Two build arguments of one target map to the same generated parameter.
    E211,
}

impl ErrorCode {
    /// Returns the string representation of the error code (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            // Parser errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            // Resolver errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            ErrorCode::E207 => "E207",
            ErrorCode::E208 => "E208",
            ErrorCode::E209 => "E209",
            ErrorCode::E210 => "E210",
            ErrorCode::E211 => "E211",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid escape sequence",
            // Parser errors
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "unknown directive",
            ErrorCode::E103 => "unsupported syntax",
            ErrorCode::E104 => "invalid port",
            ErrorCode::E105 => "statement outside a target",
            // Resolver errors
            ErrorCode::E200 => "undeclared variable",
            ErrorCode::E201 => "duplicate base image",
            ErrorCode::E202 => "missing base image",
            ErrorCode::E203 => "cyclic dependency",
            ErrorCode::E204 => "unknown target",
            ErrorCode::E205 => "duplicate target",
            ErrorCode::E206 => "empty target",
            ErrorCode::E207 => "statement before base image",
            ErrorCode::E208 => "unknown build argument",
            ErrorCode::E209 => "missing build argument",
            ErrorCode::E210 => "conflicting function name",
            ErrorCode::E211 => "conflicting parameter name",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E105.to_string(), "E105");
        assert_eq!(ErrorCode::E210.to_string(), "E210");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "unterminated string literal");
        assert_eq!(ErrorCode::E102.description(), "unknown directive");
        assert_eq!(ErrorCode::E203.description(), "cyclic dependency");
    }
}
