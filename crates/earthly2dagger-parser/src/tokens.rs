//! Token definitions produced by the [`lexer`](crate::lexer).

use std::fmt;

use winnow::stream::Location;

use crate::span::Span;

/// Directive keywords that open a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    From,
    Arg,
    Env,
    Workdir,
    Run,
    Cmd,
    Entrypoint,
    User,
    Expose,
    SaveArtifact,
    Build,
    Version,
}

impl Directive {
    /// Directives whose payload is a command (shell text or exec array).
    pub fn takes_command(self) -> bool {
        matches!(self, Directive::Run | Directive::Cmd | Directive::Entrypoint)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Directive::From => "FROM",
            Directive::Arg => "ARG",
            Directive::Env => "ENV",
            Directive::Workdir => "WORKDIR",
            Directive::Run => "RUN",
            Directive::Cmd => "CMD",
            Directive::Entrypoint => "ENTRYPOINT",
            Directive::User => "USER",
            Directive::Expose => "EXPOSE",
            Directive::SaveArtifact => "SAVE ARTIFACT",
            Directive::Build => "BUILD",
            Directive::Version => "VERSION",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token types for Earthfiles
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    /// `name:` at column zero.
    TargetHeader(&'src str),
    /// Directive keyword at the start of a statement.
    Directive(Directive),

    // Payload
    Word(&'src str),
    StringLiteral(String),
    /// Raw shell-form command text, continuations removed.
    ShellText(String),

    // Exec-form arrays and assignments
    Equals,       // =
    LeftBracket,  // [
    RightBracket, // ]
    Comma,        // ,

    // Trivia
    Comment(&'src str), // # comment
    /// `\` at the end of a line.
    Continuation,
    Whitespace,
    Newline,
}

impl Token<'_> {
    /// Tokens that separate words on a line but carry no meaning.
    pub fn is_inline_space(&self) -> bool {
        matches!(self, Token::Whitespace | Token::Continuation)
    }
}

/// A token with position information for winnow integration
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<'src> fmt::Display for PositionedToken<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl<'src> Location for PositionedToken<'src> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::TargetHeader(name) => write!(f, "{name}:"),
            Token::Directive(directive) => write!(f, "{directive}"),

            Token::Word(word) => write!(f, "{word}"),
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::ShellText(text) => write!(f, "{text}"),

            Token::Equals => write!(f, "="),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),

            Token::Comment(comment) => write!(f, "#{comment}"),
            Token::Continuation => write!(f, "\\"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => write!(f, "\\n"),
        }
    }
}
