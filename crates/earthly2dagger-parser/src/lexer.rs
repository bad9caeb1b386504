//! Lexical analyzer for Earthfile source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! Earthfiles are line oriented, so the lexer tracks where it is on the
//! current logical line:
//!
//! - at column zero a `name:` line is a target header;
//! - the first word of a statement is a directive keyword;
//! - after `RUN`, `CMD` and `ENTRYPOINT` the payload is either an exec-form
//!   array (`["a", "b"]`) or raw shell text kept byte for byte;
//! - other payloads are words, quoted strings and `=`.
//!
//! A `\` at the end of a line continues the logical line. Inside shell text
//! the continuation is removed; elsewhere it behaves like whitespace.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, eof, not, peek, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, one_of, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{Directive, PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()` to provide detailed error
/// messages with codes, help text, and precise span information.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    pub code: ErrorCode,
    pub message: &'static str,
    pub help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    pub start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Where the lexer is on the current logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Column zero.
    LineStart,
    /// After leading indentation, before the directive.
    Indented,
    /// After a target header or a closed exec-form array; only a comment
    /// may follow.
    Trailing,
    /// Words, strings and `=`.
    Payload,
    /// Payload of a command directive, before the command itself.
    Command,
    /// Inside an exec-form array.
    Array,
}

fn is_inline_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

fn backtrack<O>() -> IResult<O> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

/// Byte length of a `\` line continuation at the start of `text`, if any.
fn continuation_len(text: &str) -> Option<usize> {
    let after = text.strip_prefix('\\')?;
    let trimmed = after.trim_start_matches(is_inline_space);
    trimmed
        .starts_with('\n')
        .then(|| text.len() - trimmed.len() + 1)
}

/// Parse a `\` escape inside a double-quoted string.
///
/// `\$` is kept verbatim so that expansion detection still sees the escape.
fn string_escape<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    let escape_start = input.current_token_start();

    preceded(
        '\\',
        cut_err(alt((
            '"'.value("\""),
            '\\'.value("\\"),
            '\''.value("'"),
            'n'.value("\n"),
            't'.value("\t"),
            'r'.value("\r"),
            '$'.value("\\$"),
            (take_while(0.., is_inline_space), '\n').value(""),
        ))),
    )
    .context(LexerDiagnostic {
        code: ErrorCode::E003,
        message: "invalid escape sequence",
        help: Some("valid escapes: `\\\"`, `\\\\`, `\\'`, `\\n`, `\\t`, `\\r`, `\\$`"),
        start: escape_start,
    })
    .parse_next(input)
}

/// Parse a double-quoted string literal with escapes.
fn double_quoted<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    '"'.parse_next(input)?;

    let content = repeat(
        0..,
        alt((
            take_while(1.., |c: char| !matches!(c, '"' | '\\' | '\n')),
            string_escape,
        )),
    )
    .fold(String::new, |mut acc, piece: &str| {
        acc.push_str(piece);
        acc
    });

    cut_err(terminated(content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start,
        })
        .parse_next(input)
        .map(Token::StringLiteral)
}

/// Parse a single-quoted string literal. No escapes are recognized.
fn single_quoted<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    '\''.parse_next(input)?;

    cut_err(terminated(
        take_while(0.., |c: char| !matches!(c, '\'' | '\n')),
        '\'',
    ))
    .context(LexerDiagnostic {
        code: ErrorCode::E001,
        message: "unterminated string literal",
        help: Some("add closing `'`"),
        start,
    })
    .parse_next(input)
    .map(|content: &str| Token::StringLiteral(content.to_string()))
}

/// Parse a `#` comment up to the end of the line.
fn comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded('#', take_while(0.., |c| c != '\n'))
        .map(Token::Comment)
        .parse_next(input)
}

/// Parse a target header: `name:` followed by nothing but an optional comment.
fn target_header<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let name = (
        one_of(|c: char| c.is_ascii_alphabetic()),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
        }),
    )
        .take()
        .parse_next(input)?;

    ':'.parse_next(input)?;

    peek((
        take_while(0.., is_inline_space),
        alt(('\n'.void(), '#'.void(), eof.void())),
    ))
    .parse_next(input)?;

    Ok(Token::TargetHeader(name))
}

/// Parse a directive keyword with word boundary checking
fn directive<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    terminated(
        alt((
            (
                literal("SAVE"),
                take_while(1.., [' ', '\t']),
                literal("ARTIFACT"),
            )
                .value(Directive::SaveArtifact),
            literal("ENTRYPOINT").value(Directive::Entrypoint),
            literal("WORKDIR").value(Directive::Workdir),
            literal("VERSION").value(Directive::Version),
            literal("EXPOSE").value(Directive::Expose),
            literal("BUILD").value(Directive::Build),
            literal("FROM").value(Directive::From),
            literal("USER").value(Directive::User),
            literal("ARG").value(Directive::Arg),
            literal("ENV").value(Directive::Env),
            literal("RUN").value(Directive::Run),
            literal("CMD").value(Directive::Cmd),
        )),
        // Ensure keyword is followed by whitespace or end of input
        peek(not(one_of(|c: char| !c.is_whitespace()))),
    )
    .map(Token::Directive)
    .parse_next(input)
}

/// Parse a bare word: anything up to whitespace, `=`, a quote or a line continuation.
fn word<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let rest: &'a str = **input;

    let len = rest
        .char_indices()
        .find(|&(idx, c)| {
            c.is_whitespace()
                || matches!(c, '=' | '"' | '\'')
                || (c == '\\' && continuation_len(&rest[idx..]).is_some())
        })
        .map_or(rest.len(), |(idx, _)| idx);

    if len == 0 {
        return backtrack();
    }

    Ok(Token::Word(input.next_slice(len)))
}

/// Parse a `--flag` word in front of a command.
fn flag<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        literal("--"),
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-'),
    )
        .take()
        .map(Token::Word)
        .parse_next(input)
}

/// Parse the `[` that opens an exec-form array.
///
/// Only a `[` followed by a string or by `]` opens an array, so that shell
/// commands such as `[ -f file ] && ...` stay shell text.
fn array_open<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    terminated(
        '[',
        peek((take_while(0.., [' ', '\t']), one_of(['"', ']']))),
    )
    .value(Token::LeftBracket)
    .parse_next(input)
}

/// Parse the rest of a logical line as shell text.
///
/// Line continuations are removed, everything else is kept byte for byte
/// apart from trailing whitespace.
fn shell_text<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let rest: &'a str = **input;

    let mut text = String::new();
    let mut consumed = rest.len();
    let mut skip_until = 0;

    for (idx, c) in rest.char_indices() {
        if idx < skip_until {
            continue;
        }
        match c {
            '\n' => {
                consumed = idx;
                break;
            }
            '\\' => match continuation_len(&rest[idx..]) {
                Some(len) => skip_until = idx + len,
                None => text.push(c),
            },
            _ => text.push(c),
        }
    }

    let text = text.trim_end();
    if text.is_empty() {
        return backtrack();
    }
    let text = text.to_string();

    input.next_slice(consumed);
    Ok(Token::ShellText(text))
}

/// Parse a `\` line continuation, including the newline it escapes.
fn continuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    ('\\', take_while(0.., is_inline_space), '\n')
        .value(Token::Continuation)
        .parse_next(input)
}

/// Parse whitespace (spaces, tabs, carriage returns but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., is_inline_space)
        .value(Token::Whitespace)
        .parse_next(input)
}

/// Parse newline
fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse single character punctuation used by assignments and arrays
fn punctuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        ','.value(Token::Comma),
    ))
    .parse_next(input)
}

fn equals<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '='.value(Token::Equals).parse_next(input)
}

/// Parse a single token according to the current line mode.
fn mode_token<'a>(mode: Mode, input: &mut Input<'a>) -> IResult<Token<'a>> {
    match mode {
        Mode::LineStart => alt((
            newline,
            target_header, // Must come before directive and word
            whitespace,
            comment,
            directive, // Must come before word
            word,
        ))
        .parse_next(input),
        Mode::Indented => alt((newline, comment, directive, word)).parse_next(input),
        Mode::Trailing => alt((newline, whitespace, comment)).parse_next(input),
        Mode::Payload => alt((
            newline,
            continuation, // Must come before word
            whitespace,
            double_quoted,
            single_quoted,
            equals,
            word,
        ))
        .parse_next(input),
        Mode::Command => alt((
            newline,
            continuation,
            whitespace,
            flag,
            array_open, // Must come before shell_text
            shell_text,
        ))
        .parse_next(input),
        Mode::Array => alt((
            newline,
            continuation,
            whitespace,
            punctuation,
            double_quoted,
        ))
        .parse_next(input),
    }
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
    mode: Mode,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer.
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
            mode: Mode::LineStart,
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            let start_pos = input.current_token_start();
            match mode_token(self.mode, &mut input) {
                Ok(token) => {
                    self.mode = self.next_mode(&token);
                    let span = Span::new(start_pos..input.current_token_start());
                    self.tokens.push(PositionedToken::new(token, span));
                }
                Err(e) => {
                    // Get position before recovery
                    let error_pos = input.current_token_start();

                    let diagnostic = Self::convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    /// Mode transition after `token` was produced.
    fn next_mode(&self, token: &Token<'a>) -> Mode {
        match (self.mode, token) {
            (_, Token::Newline) => Mode::LineStart,
            (Mode::LineStart, Token::Whitespace) => Mode::Indented,
            (_, Token::TargetHeader(_)) => Mode::Trailing,
            (_, Token::Directive(directive)) if directive.takes_command() => Mode::Command,
            (_, Token::Directive(_)) => Mode::Payload,
            (Mode::LineStart | Mode::Indented, Token::Word(_)) => Mode::Payload,
            (Mode::Command, Token::LeftBracket) => Mode::Array,
            (Mode::Array, Token::RightBracket) => Mode::Trailing,
            (Mode::Command, Token::ShellText(_)) => Mode::Payload,
            (mode, _) => mode,
        }
    }

    /// Finish lexing and return tokens or collected errors.
    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Extracts `LexerDiagnostic` from the error context for rich error info
    /// with code, message, and help. Falls back to E002 (unexpected character)
    /// if no diagnostic context is found.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        // Use the first diagnostic context if available
        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos);

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        // Fallback when no context is present
        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Parse tokens from a string input, collecting multiple errors.
///
/// Attempts to recover from errors and continue tokenizing, collecting
/// all errors encountered.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens successfully parsed
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let located_input = LocatingSlice::new(input);
    let mut lexer = Lexer::new();
    lexer.tokenize(located_input);
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tokens without trivia.
    fn significant(input: &str) -> Vec<Token<'_>> {
        tokenize(input)
            .expect("Should tokenize")
            .into_iter()
            .map(|t| t.token)
            .filter(|t| {
                !matches!(
                    t,
                    Token::Whitespace | Token::Newline | Token::Continuation | Token::Comment(_)
                )
            })
            .collect()
    }

    fn first_error_code(input: &str) -> ErrorCode {
        let err = tokenize(input).expect_err("Should fail");
        err.diagnostics()[0].code().expect("diagnostic has a code")
    }

    #[test]
    fn test_target_header_and_directive() {
        let tokens = significant("build:\n    FROM alpine\n");
        assert_eq!(
            tokens,
            vec![
                Token::TargetHeader("build"),
                Token::Directive(Directive::From),
                Token::Word("alpine"),
            ]
        );
    }

    #[test]
    fn test_header_requires_column_zero() {
        let tokens = significant("  build:\n");
        assert_eq!(tokens, vec![Token::Word("build:")]);
    }

    #[test]
    fn test_header_allows_trailing_comment() {
        let tokens = tokenize("test-expose-port: # exposes\n").unwrap();
        assert_eq!(tokens[0].token, Token::TargetHeader("test-expose-port"));
        assert!(matches!(tokens[2].token, Token::Comment(" exposes")));
    }

    #[test]
    fn test_image_reference_is_not_a_header() {
        let tokens = significant("FROM alpine:3.19\n");
        assert_eq!(
            tokens,
            vec![
                Token::Directive(Directive::From),
                Token::Word("alpine:3.19")
            ]
        );
    }

    #[test]
    fn test_all_directives() {
        let cases = [
            ("FROM", Directive::From),
            ("ARG", Directive::Arg),
            ("ENV", Directive::Env),
            ("WORKDIR", Directive::Workdir),
            ("RUN", Directive::Run),
            ("CMD", Directive::Cmd),
            ("ENTRYPOINT", Directive::Entrypoint),
            ("USER", Directive::User),
            ("EXPOSE", Directive::Expose),
            ("SAVE ARTIFACT", Directive::SaveArtifact),
            ("SAVE   ARTIFACT", Directive::SaveArtifact),
            ("BUILD", Directive::Build),
            ("VERSION", Directive::Version),
        ];
        for (source, expected) in cases {
            let line = format!("  {source} x\n");
            let tokens = significant(&line);
            assert_eq!(tokens[0], Token::Directive(expected), "source: {source}");
        }
    }

    #[test]
    fn test_directive_word_boundaries() {
        let tokens = significant("  RUNNER x\n");
        assert_eq!(tokens[0], Token::Word("RUNNER"));

        let tokens = significant("  run x\n");
        assert_eq!(tokens[0], Token::Word("run"));
    }

    #[test]
    fn test_shell_text_is_verbatim() {
        let tokens = significant("  RUN echo 'hello, world'   \n");
        assert_eq!(
            tokens,
            vec![
                Token::Directive(Directive::Run),
                Token::ShellText("echo 'hello, world'".to_string()),
            ]
        );

        let tokens = significant("  RUN echo \"Hello, World ${NAME}\" # not a comment\n");
        assert_eq!(
            tokens[1],
            Token::ShellText("echo \"Hello, World ${NAME}\" # not a comment".to_string())
        );
    }

    #[test]
    fn test_shell_text_continuation() {
        let tokens = significant("  RUN apk add \\\n      curl && \\\n    echo done\n  EXPOSE 80\n");
        assert_eq!(
            tokens[1],
            Token::ShellText("apk add       curl &&     echo done".to_string())
        );
        assert_eq!(tokens[2], Token::Directive(Directive::Expose));
    }

    #[test]
    fn test_shell_text_span_covers_continuation() {
        let source = "RUN a \\\n  b\n";
        let tokens = tokenize(source).unwrap();
        let text = tokens
            .iter()
            .find(|t| matches!(t.token, Token::ShellText(_)))
            .unwrap();
        assert_eq!(&source[text.span.start()..text.span.end()], "a \\\n  b");
    }

    #[test]
    fn test_exec_array() {
        let tokens = significant("  RUN [\"echo\", \"hi there\"]\n");
        assert_eq!(
            tokens,
            vec![
                Token::Directive(Directive::Run),
                Token::LeftBracket,
                Token::StringLiteral("echo".to_string()),
                Token::Comma,
                Token::StringLiteral("hi there".to_string()),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn test_exec_array_trailing_comment() {
        let tokens = tokenize("  RUN [\"a\"] # build\n").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.token).collect();
        assert_eq!(
            kinds[kinds.len() - 3..],
            [
                Token::Whitespace,
                Token::Comment(" build"),
                Token::Newline,
            ]
        );
        assert_eq!(first_error_code("  RUN [\"a\"] b\n"), ErrorCode::E002);
    }

    #[test]
    fn test_bracket_shell_command_is_shell_text() {
        let tokens = significant("  RUN [ -f go.mod ] && go build\n");
        assert_eq!(
            tokens[1],
            Token::ShellText("[ -f go.mod ] && go build".to_string())
        );
    }

    #[test]
    fn test_run_flags() {
        let tokens = significant("  RUN --privileged dockerd &\n");
        assert_eq!(
            tokens,
            vec![
                Token::Directive(Directive::Run),
                Token::Word("--privileged"),
                Token::ShellText("dockerd &".to_string()),
            ]
        );
    }

    #[test]
    fn test_assignments() {
        let tokens = significant("  ARG tag=\"\"\n  ENV NAME=$name\n");
        assert_eq!(
            tokens,
            vec![
                Token::Directive(Directive::Arg),
                Token::Word("tag"),
                Token::Equals,
                Token::StringLiteral(String::new()),
                Token::Directive(Directive::Env),
                Token::Word("NAME"),
                Token::Equals,
                Token::Word("$name"),
            ]
        );
    }

    #[test]
    fn test_build_arguments() {
        let tokens = significant("  BUILD +test --name=world --greeting='hi there'\n");
        assert_eq!(
            tokens,
            vec![
                Token::Directive(Directive::Build),
                Token::Word("+test"),
                Token::Word("--name"),
                Token::Equals,
                Token::Word("world"),
                Token::Word("--greeting"),
                Token::Equals,
                Token::StringLiteral("hi there".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = significant("  ENV A=\"quote: \\\" tab:\\t dollar: \\$HOME\"\n");
        assert_eq!(
            tokens[3],
            Token::StringLiteral("quote: \" tab:\t dollar: \\$HOME".to_string())
        );
    }

    #[test]
    fn test_payload_continuation_is_whitespace() {
        let tokens = significant("  EXPOSE 80 \\\n    443\n");
        assert_eq!(
            tokens,
            vec![
                Token::Directive(Directive::Expose),
                Token::Word("80"),
                Token::Word("443"),
            ]
        );
    }

    #[test]
    fn test_comments() {
        let tokens = tokenize("# top\nbuild:\n    # inside\n    FROM alpine\n").unwrap();
        let comments: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t.token {
                Token::Comment(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(comments, [" top", " inside"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let tokens = significant("build:\r\n    FROM alpine\r\n");
        assert_eq!(
            tokens,
            vec![
                Token::TargetHeader("build"),
                Token::Directive(Directive::From),
                Token::Word("alpine"),
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(first_error_code("  ENV A=\"open\n"), ErrorCode::E001);
        assert_eq!(first_error_code("  ENV A='open\n"), ErrorCode::E001);
    }

    #[test]
    fn test_invalid_escape() {
        assert_eq!(first_error_code("  ENV A=\"\\q\"\n"), ErrorCode::E003);
    }

    #[test]
    fn test_unexpected_character_in_array() {
        let err = tokenize("  RUN [\"a\", b]\n").expect_err("Should fail");
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E002));
        assert_eq!(diag.labels()[0].span().start(), 12);
    }

    #[test]
    fn test_unexpected_text_after_header() {
        assert_eq!(first_error_code("build: extra\n"), ErrorCode::E002);
    }

    #[test]
    fn test_spans_are_contiguous() {
        let source = "build:\n  RUN [\"a\"]\n  ENV X=\"y\"\n";
        let tokens = tokenize(source).unwrap();
        let mut pos = 0;
        for token in &tokens {
            assert_eq!(token.span.start(), pos, "gap before {:?}", token.token);
            pos = token.span.end();
        }
        assert_eq!(pos, source.len());
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn significant(input: &str) -> Vec<Token<'_>> {
        tokenize(input)
            .expect("Should tokenize")
            .into_iter()
            .map(|t| t.token)
            .filter(|t| !matches!(t, Token::Whitespace | Token::Newline))
            .collect()
    }

    proptest! {
        #[test]
        fn target_headers_tokenize(name in "[a-z][a-z0-9._-]{0,20}") {
            let source = format!("{name}:\n    FROM alpine\n");
            prop_assert_eq!(
                significant(&source),
                vec![
                    Token::TargetHeader(&name),
                    Token::Directive(Directive::From),
                    Token::Word("alpine"),
                ]
            );
        }

        #[test]
        fn plain_strings_are_kept(value in "[a-zA-Z0-9 ,.:/_-]{0,30}") {
            let source = format!("build:\n    ENV X=\"{value}\"\n");
            let tokens = significant(&source);
            prop_assert_eq!(tokens.last(), Some(&Token::StringLiteral(value)));
        }

        #[test]
        fn shell_text_spans_are_contiguous(text in "[a-z][a-z0-9 $_-]{0,30}[a-z0-9]") {
            let source = format!("build:\n    FROM alpine\n    RUN {text}\n");
            let tokens = tokenize(&source).unwrap();

            let mut pos = 0;
            for token in &tokens {
                prop_assert_eq!(token.span.start(), pos);
                pos = token.span.end();
            }
            prop_assert_eq!(pos, source.len());
            prop_assert!(tokens.iter().any(|t| t.token == Token::ShellText(text.clone())));
        }
    }
}
