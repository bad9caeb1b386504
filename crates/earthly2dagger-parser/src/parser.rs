//! Parser for Earthfile tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer) into
//! the syntax tree defined in [`parser_types`](super::parser_types). The public
//! entry point is [`build_document`].
//!
//! The grammar is line based:
//!
//! ```text
//! document  := blank* version? (target blank*)* EOF
//! version   := VERSION value+ line_end
//! target    := HEADER line_end (blank* INDENT statement)*
//! statement := DIRECTIVE payload line_end
//! ```
//!
//! Once a directive keyword has been read the rest of the line is committed
//! to that directive, so errors point at the offending payload rather than
//! at the start of the target.

use winnow::{
    Parser as _,
    combinator::{alt, eof, opt, preceded, repeat, separated, terminated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use earthly2dagger_core::{expansion, semantic::Protocol};

use crate::{
    error::{Diagnostic, ErrorCode},
    parser_types as types,
    span::{Span, Spanned},
    tokens::{Directive, PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    ///
    /// Used to calculate start_offset as: `tokens.len() - start_offset_value`
    StartOffset(usize),
    /// Error code, when the error is more specific than an unexpected token
    Code(ErrorCode),
    /// Exact span of a rejected value
    Span(Span),
    /// Text of a rejected value
    Found(String),
    Help(&'static str),
}

type Input<'src> = EarthfileTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
/// Type alias for winnow TokenSlice with our positioned tokens
type EarthfileTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

/// Build a Cut error for a value that parsed but is not acceptable.
fn rejected(
    code: ErrorCode,
    label: &'static str,
    span: Span,
    found: &str,
) -> ContextError<Context> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    e.push(Context::Code(code));
    e.push(Context::Span(span));
    e.push(Context::Found(found.to_string()));
    e
}

fn reject<O>(code: ErrorCode, label: &'static str, value: &Spanned<String>) -> IResult<O> {
    Err(ErrMode::Cut(rejected(code, label, value.span(), value)))
}

fn reject_with_help<O>(
    code: ErrorCode,
    label: &'static str,
    value: &Spanned<String>,
    help: &'static str,
) -> IResult<O> {
    let mut e = rejected(code, label, value.span(), value);
    e.push(Context::Help(help));
    Err(ErrMode::Cut(e))
}

fn is_trivia(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::Whitespace | Token::Newline | Token::Continuation | Token::Comment(_)
    )
}

/// Parse a single inline whitespace token
fn ws<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.is_inline_space())
        .void()
        .parse_next(input)
}

/// Parse zero or more inline whitespace tokens
fn ws0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., ws).parse_next(input)
}

/// Parse one or more inline whitespace tokens
fn ws1<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(1.., ws).parse_next(input)
}

/// Parse the indentation in front of a target statement
fn indentation<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Whitespace))
        .void()
        .parse_next(input)
}

fn newline<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Newline))
        .void()
        .parse_next(input)
}

fn comment<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Comment(_)))
        .void()
        .parse_next(input)
}

/// Parse a line holding nothing but whitespace and an optional comment
fn blank_line<'src>(input: &mut Input<'src>) -> IResult<()> {
    (ws0, opt(comment), newline).void().parse_next(input)
}

fn blank_lines<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., blank_line).parse_next(input)
}

/// Parse the end of a statement line
fn line_end<'src>(input: &mut Input<'src>) -> IResult<()> {
    (ws0, opt(comment), alt((newline, eof.void())))
        .void()
        .context(Context::Label("end of line"))
        .parse_next(input)
}

/// Parse `=` and return its span
fn equals<'src>(input: &mut Input<'src>) -> IResult<Span> {
    any.verify_map(|token: &PositionedToken<'_>| match token.token {
        Token::Equals => Some(token.span),
        _ => None,
    })
    .parse_next(input)
}

fn word<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Word(word) => Some(Spanned::new(*word, token.span)),
        _ => None,
    })
    .parse_next(input)
}

/// Parse a `--flag` word
fn flag_word<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    word.verify(|word: &Spanned<&str>| word.starts_with("--"))
        .parse_next(input)
}

/// Parse string literal
fn string_literal<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::StringLiteral(s) => Some(Spanned::new(s.clone(), token.span)),
        _ => None,
    })
    .context(Context::Label("string literal"))
    .parse_next(input)
}

/// Parse one piece of a compound value: a word, a string or `=`
fn value_piece<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Word(word) => Some(Spanned::new(word.to_string(), token.span)),
        Token::StringLiteral(s) => Some(Spanned::new(s.clone(), token.span)),
        Token::Equals => Some(Spanned::new("=".to_string(), token.span)),
        _ => None,
    })
    .parse_next(input)
}

/// Parse a value: adjacent words, strings and `=` with no whitespace between
///
/// `"alpine:"${TAG}` and `alpine:${TAG}` both yield `alpine:${TAG}`.
fn value<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    let first = value_piece.parse_next(input)?;
    let rest: Vec<Spanned<String>> = repeat(0.., value_piece).parse_next(input)?;

    Ok(rest.into_iter().fold(first, |acc, piece| {
        let span = acc.span().union(piece.span());
        let mut text = acc.into_inner();
        text.push_str(&piece);
        Spanned::new(text, span)
    }))
}

/// Parse whitespace separated values up to the end of the line
fn values<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<String>>> {
    separated(1.., value, ws1).parse_next(input)
}

/// Join values with single spaces, spanning all of them
fn join_values(values: Vec<Spanned<String>>) -> Option<Spanned<String>> {
    let span = values
        .iter()
        .map(|value| value.span())
        .reduce(|acc, span| acc.union(span))?;
    let text = values
        .into_iter()
        .map(Spanned::into_inner)
        .collect::<Vec<_>>()
        .join(" ");
    Some(Spanned::new(text, span))
}

/// Reject values that are flags of directives without flag support.
fn reject_flag(value: &Spanned<String>) -> IResult<()> {
    if value.starts_with("--") {
        let name = value.split('=').next().unwrap_or(value.as_str());
        let flag = Spanned::new(name.to_string(), value.span());
        return reject(ErrorCode::E103, "unsupported flag", &flag);
    }
    Ok(())
}

/// Parse a single payload value after the directive keyword
fn single_value<'src>(input: &mut Input<'src>, label: &'static str) -> IResult<Spanned<String>> {
    let value = preceded(ws1, value)
        .context(Context::Label(label))
        .parse_next(input)?;
    reject_flag(&value)?;
    Ok(value)
}

/// Parse a variable name for `ARG` or `ENV`
fn variable_name<'src>(input: &mut Input<'src>, label: &'static str) -> IResult<Spanned<String>> {
    let name = word
        .context(Context::Label(label))
        .parse_next(input)?
        .map(|name| name.to_string());
    reject_flag(&name)?;
    if !expansion::is_variable_name(&name) {
        return reject_with_help(
            ErrorCode::E100,
            "invalid variable name",
            &name,
            "names start with a letter or `_` and contain letters, digits and `_`",
        );
    }
    Ok(name)
}

/// Parse `=value` after a name; a bare `=` assigns the empty string
fn assigned_value<'src>(input: &mut Input<'src>) -> IResult<Option<Spanned<String>>> {
    let Some(equals) = opt(equals).parse_next(input)? else {
        return Ok(None);
    };
    let value = opt(value).parse_next(input)?;
    Ok(Some(
        value.unwrap_or_else(|| Spanned::new(String::new(), equals)),
    ))
}

/// `FROM <image>`
fn from_payload<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Statement>> {
    let image = single_value(input, "image reference")?;
    if image.starts_with('+') {
        return reject_with_help(
            ErrorCode::E103,
            "base image from a target",
            &image,
            "`FROM +target` cannot be translated; start from an image instead",
        );
    }
    Ok(vec![types::Statement::From { image }])
}

/// `ARG [--required] <name>[=<default>]`
fn arg_payload<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Statement>> {
    ws1.parse_next(input)?;

    let flags: Vec<Spanned<&str>> = repeat(0.., terminated(flag_word, ws1)).parse_next(input)?;
    let mut required = false;
    for flag in flags {
        match *flag.inner() {
            "--required" => required = true,
            other => {
                let flag = Spanned::new(other.to_string(), flag.span());
                return reject(ErrorCode::E103, "unsupported flag", &flag);
            }
        }
    }

    let name = variable_name(input, "argument name")?;
    let default = assigned_value(input)?;

    if let (true, Some(default)) = (required, &default) {
        return reject_with_help(
            ErrorCode::E103,
            "default value on a required argument",
            default,
            "remove `--required` or the default value",
        );
    }

    Ok(vec![types::Statement::Arg {
        name,
        default,
        required,
    }])
}

/// `ENV <name>=<value> [<name>=<value>...]` or the legacy `ENV <name> <value>`
fn env_payload<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Statement>> {
    ws1.parse_next(input)?;
    let name = variable_name(input, "variable name")?;

    if let Some(value) = assigned_value(input)? {
        let mut statements = vec![types::Statement::Env { name, value }];

        let more: Vec<(Spanned<String>, Spanned<String>)> =
            repeat(0.., preceded(ws1, env_assignment)).parse_next(input)?;
        statements.extend(
            more.into_iter()
                .map(|(name, value)| types::Statement::Env { name, value }),
        );
        return Ok(statements);
    }

    let legacy = preceded(ws1, values)
        .context(Context::Label("`=` and a value"))
        .parse_next(input)?;
    match join_values(legacy) {
        Some(value) => Ok(vec![types::Statement::Env { name, value }]),
        None => Err(ErrMode::Backtrack(ContextError::new())),
    }
}

/// One `<name>=<value>` pair after the first on an `ENV` line
fn env_assignment<'src>(input: &mut Input<'src>) -> IResult<(Spanned<String>, Spanned<String>)> {
    let name = word.parse_next(input)?.map(|name| name.to_string());
    let Some(value) = assigned_value(input)? else {
        return Err(ErrMode::Backtrack(ContextError::new()));
    };
    if !expansion::is_variable_name(&name) {
        return reject(ErrorCode::E100, "invalid variable name", &name);
    }
    Ok((name, value))
}

/// Parse leading `--flags` of a command directive, keeping only `allowed` ones
fn command_flags<'src>(
    input: &mut Input<'src>,
    allowed: &[&str],
) -> IResult<Vec<&'src str>> {
    let flags: Vec<Spanned<&'src str>> =
        repeat(0.., preceded(ws1, flag_word)).parse_next(input)?;

    flags
        .into_iter()
        .map(|flag| {
            if allowed.iter().any(|allowed| allowed == flag.inner()) {
                Ok(*flag.inner())
            } else {
                let flag = Spanned::new(flag.to_string(), flag.span());
                reject(ErrorCode::E103, "unsupported flag", &flag)
            }
        })
        .collect()
}

/// Parse shell-form command text
fn shell_command<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::Command>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::ShellText(text) => Some(Spanned::new(types::Command::Shell(text.clone()), token.span)),
        _ => None,
    })
    .parse_next(input)
}

fn left_bracket<'src>(input: &mut Input<'src>) -> IResult<Span> {
    any.verify_map(|token: &PositionedToken<'_>| match token.token {
        Token::LeftBracket => Some(token.span),
        _ => None,
    })
    .parse_next(input)
}

fn right_bracket<'src>(input: &mut Input<'src>) -> IResult<Span> {
    any.verify_map(|token: &PositionedToken<'_>| match token.token {
        Token::RightBracket => Some(token.span),
        _ => None,
    })
    .context(Context::Label("`]`"))
    .parse_next(input)
}

fn comma<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Comma))
        .void()
        .parse_next(input)
}

/// Parse exec-form command: `["executable", "arg", ...]`
fn exec_command<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::Command>> {
    let open = left_bracket.parse_next(input)?;

    cut_err(input, |input| {
        ws0.parse_next(input)?;
        let argv: Vec<String> = separated(
            0..,
            terminated(string_literal.map(Spanned::into_inner), ws0),
            (comma, ws0),
        )
        .parse_next(input)?;
        let close = right_bracket.parse_next(input)?;

        Ok(Spanned::new(types::Command::Exec(argv), open.union(close)))
    })
}

fn command<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::Command>> {
    preceded(ws1, alt((shell_command, exec_command)))
        .context(Context::Label("command"))
        .parse_next(input)
}

/// `RUN [--privileged] <command>`
fn run_payload<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Statement>> {
    let flags = command_flags(input, &["--privileged"])?;
    let command = command.parse_next(input)?;
    Ok(vec![types::Statement::Run {
        command,
        privileged: flags.contains(&"--privileged"),
    }])
}

/// `EXPOSE <port>[/<protocol>] ...`
fn expose_payload<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Statement>> {
    let ports = preceded(ws1, values)
        .context(Context::Label("port"))
        .parse_next(input)?;

    ports
        .iter()
        .map(|spec| {
            let (port, protocol) = parse_port(spec)?;
            Ok(types::Statement::Expose { port, protocol })
        })
        .collect()
}

/// Parse `8080`, `8080/tcp` or `53/udp`
fn parse_port(spec: &Spanned<String>) -> IResult<(Spanned<u16>, Protocol)> {
    let (number, protocol) = match spec.split_once('/') {
        Some((number, protocol)) => (number, Some(protocol)),
        None => (spec.as_str(), None),
    };

    let protocol = match protocol.map(str::to_ascii_lowercase).as_deref() {
        None | Some("tcp") => Protocol::Tcp,
        Some("udp") => Protocol::Udp,
        Some(_) => {
            return reject_with_help(
                ErrorCode::E104,
                "unknown port protocol",
                spec,
                "use `tcp` or `udp`",
            );
        }
    };

    match number.parse::<u16>() {
        Ok(port) if port != 0 => Ok((Spanned::new(port, spec.span()), protocol)),
        _ => reject_with_help(
            ErrorCode::E104,
            "invalid port",
            spec,
            "ports are numbers from 1 to 65535",
        ),
    }
}

/// `SAVE ARTIFACT <source> [<dest>]`
fn save_artifact_payload<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Statement>> {
    let mut parts = preceded(ws1, values)
        .context(Context::Label("artifact path"))
        .parse_next(input)?;

    for part in &parts {
        reject_flag(part)?;
    }
    if let Some(pos) = parts.iter().position(|part| part.inner() == "AS") {
        let span = parts[pos..]
            .iter()
            .fold(parts[pos].span(), |acc, part| acc.union(part.span()));
        let local = Spanned::new(parts[pos..].iter().map(|p| p.as_str()).collect::<Vec<_>>().join(" "), span);
        return reject_with_help(
            ErrorCode::E103,
            "local artifact export",
            &local,
            "`SAVE ARTIFACT ... AS LOCAL` cannot be translated; export the file from the generated function instead",
        );
    }
    if let Some(extra) = parts.get(2) {
        return reject(ErrorCode::E100, "unexpected argument", extra);
    }

    let dest = (parts.len() == 2).then(|| parts.remove(1));
    let source = parts.remove(0);
    Ok(vec![types::Statement::SaveArtifact { source, dest }])
}

/// Returns `true` for a name usable in a target header.
fn is_target_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// `BUILD +<target> [--<name>=<value>...]`
fn build_payload<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Statement>> {
    let reference = single_value(input, "target reference")?;

    let target = match reference.strip_prefix('+') {
        Some(name) if is_target_name(name) => Spanned::new(name.to_string(), reference.span()),
        _ => {
            return reject_with_help(
                ErrorCode::E103,
                "unsupported target reference",
                &reference,
                "only targets of the same Earthfile, such as `+build`, can be built",
            );
        }
    };

    let args: Vec<types::BuildArgument> =
        repeat(0.., preceded(ws1, build_argument)).parse_next(input)?;

    Ok(vec![types::Statement::Build { target, args }])
}

/// Parse `--name=value` on a `BUILD` line
fn build_argument<'src>(input: &mut Input<'src>) -> IResult<types::BuildArgument> {
    let flag = flag_word.parse_next(input)?;

    cut_err(input, |input| {
        let name = Spanned::new(flag.trim_start_matches("--").to_string(), flag.span());
        if !expansion::is_variable_name(&name) {
            return reject(ErrorCode::E100, "invalid argument name", &name);
        }
        let value = assigned_value
            .context(Context::Label("`=` and a value"))
            .parse_next(input)?;
        match value {
            Some(value) => Ok(types::BuildArgument { name, value }),
            None => {
                let mut e = ContextError::new();
                e.push(Context::Label("`=` and a value"));
                Err(ErrMode::Backtrack(e))
            }
        }
    })
}

/// Parse the payload of `directive` up to, not including, the end of the line
fn directive_payload<'src>(
    directive: Directive,
    input: &mut Input<'src>,
) -> IResult<Vec<types::Statement>> {
    match directive {
        Directive::From => from_payload(input),
        Directive::Arg => arg_payload(input),
        Directive::Env => env_payload(input),
        Directive::Workdir => {
            let path = single_value(input, "directory")?;
            Ok(vec![types::Statement::Workdir { path }])
        }
        Directive::Run => run_payload(input),
        Directive::Cmd => {
            command_flags(input, &[])?;
            let command = command.parse_next(input)?;
            Ok(vec![types::Statement::Cmd { command }])
        }
        Directive::Entrypoint => {
            command_flags(input, &[])?;
            let command = command.parse_next(input)?;
            Ok(vec![types::Statement::Entrypoint { command }])
        }
        Directive::User => {
            let name = single_value(input, "user name")?;
            if expansion::has_references(&name) {
                return reject_with_help(
                    ErrorCode::E103,
                    "variable in user name",
                    &name,
                    "name the user literally",
                );
            }
            Ok(vec![types::Statement::User { name }])
        }
        Directive::Expose => expose_payload(input),
        Directive::SaveArtifact => save_artifact_payload(input),
        Directive::Build => build_payload(input),
        // Handled by the callers before the payload is parsed.
        Directive::Version => Err(ErrMode::Backtrack(ContextError::new())),
    }
}

/// Parse directive keyword
fn directive<'src>(input: &mut Input<'src>) -> IResult<Spanned<Directive>> {
    any.verify_map(|token: &PositionedToken<'_>| match token.token {
        Token::Directive(directive) => Some(Spanned::new(directive, token.span)),
        _ => None,
    })
    .context(Context::Label("directive"))
    .parse_next(input)
}

/// Parse one statement line of a target
fn statement<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<types::Statement>>> {
    let keyword = directive.parse_next(input)?;

    if *keyword.inner() == Directive::Version {
        let version = Spanned::new(keyword.to_string(), keyword.span());
        return reject_with_help(
            ErrorCode::E105,
            "VERSION inside a target",
            &version,
            "move `VERSION` above the first target",
        );
    }

    cut_err(input, |input| {
        let (statements, taken) = (|input: &mut Input<'src>| directive_payload(*keyword.inner(), input))
            .with_taken()
            .parse_next(input)?;
        line_end.parse_next(input)?;

        let span = taken
            .iter()
            .rev()
            .find(|token| !is_trivia(&token.token))
            .map_or(keyword.span(), |last| keyword.span().union(last.span));

        Ok(statements
            .into_iter()
            .map(|statement| Spanned::new(statement, span))
            .collect())
    })
}

/// Report a word where a directive keyword is expected
fn unknown_directive<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<types::Statement>>> {
    let word = word.parse_next(input)?.map(|word| word.to_string());
    reject_with_help(
        ErrorCode::E102,
        "unknown directive",
        &word,
        "supported directives: FROM, ARG, ENV, WORKDIR, RUN, CMD, ENTRYPOINT, USER, EXPOSE, SAVE ARTIFACT, BUILD",
    )
}

/// Parse an indented statement line
fn body_line<'src>(input: &mut Input<'src>) -> IResult<Vec<Spanned<types::Statement>>> {
    indentation.parse_next(input)?;
    alt((statement, unknown_directive)).parse_next(input)
}

fn target_header<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::TargetHeader(name) => Some(Spanned::new(*name, token.span)),
        _ => None,
    })
    .context(Context::Label("target header"))
    .parse_next(input)
}

/// Parse a target header and its statements
fn target<'src>(input: &mut Input<'src>) -> IResult<types::Target<'src>> {
    let name = target_header.parse_next(input)?;

    cut_err(input, |input| {
        line_end.parse_next(input)?;
        let statements = repeat(0.., preceded(blank_lines, body_line))
            .fold(Vec::new, |mut acc: Vec<_>, mut line: Vec<_>| {
                acc.append(&mut line);
                acc
            })
            .parse_next(input)?;

        Ok(types::Target { name, statements })
    })
}

/// Parse the `VERSION` line
fn version<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    ws0.parse_next(input)?;
    any.verify(|token: &PositionedToken<'_>| {
        matches!(token.token, Token::Directive(Directive::Version))
    })
    .parse_next(input)?;

    cut_err(input, |input| {
        let args = preceded(ws1, values)
            .context(Context::Label("version"))
            .parse_next(input)?;
        line_end.parse_next(input)?;
        join_values(args).ok_or_else(|| ErrMode::Backtrack(ContextError::new()))
    })
}

/// Report whatever stops the document from continuing
fn stray_statement<'src>(input: &mut Input<'src>) -> IResult<types::Document<'src>> {
    ws0.parse_next(input)?;
    let Some(token) = input.next_token() else {
        return Err(ErrMode::Backtrack(ContextError::new()));
    };
    let found = Spanned::new(token.token.to_string(), token.span);

    match token.token {
        Token::Directive(Directive::Version) => reject_with_help(
            ErrorCode::E105,
            "VERSION after the first target",
            &found,
            "move `VERSION` above the first target",
        ),
        Token::Directive(_) => reject_with_help(
            ErrorCode::E105,
            "statement outside a target",
            &found,
            "indent the statement below a target header such as `build:`",
        ),
        Token::Word(_) => reject_with_help(
            ErrorCode::E102,
            "unknown directive",
            &found,
            "target headers look like `name:` at the start of a line",
        ),
        _ => Err(ErrMode::Cut(ContextError::new())),
    }
}

/// Parse complete Earthfile
fn document<'src>(input: &mut Input<'src>) -> IResult<types::Document<'src>> {
    blank_lines.parse_next(input)?;
    let version = opt(terminated(version, blank_lines)).parse_next(input)?;
    let targets = repeat(0.., terminated(target, blank_lines)).parse_next(input)?;
    (ws0, opt(comment)).void().parse_next(input)?;

    if !input.is_empty() {
        return stray_statement(input);
    }

    Ok(types::Document { version, targets })
}

/// Utility function to convert winnow errors to our custom error format
///
/// Uses an explicit span from the context when a value was rejected after
/// parsing, otherwise calculates the span from the StartOffset context and
/// the current position in the token array.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
) -> Diagnostic {
    let end_offset = tokens.len() - current_remaining;

    let e = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => {
            // This should not happen as we are not supporting streaming input.
            return incomplete(tokens, end_offset);
        }
    };

    let code = e
        .context()
        .find_map(|ctx| match ctx {
            Context::Code(code) => Some(*code),
            _ => None,
        })
        .unwrap_or(ErrorCode::E100);
    let explicit_span = e.context().find_map(|ctx| match ctx {
        Context::Span(span) => Some(*span),
        _ => None,
    });
    let found = e.context().find_map(|ctx| match ctx {
        Context::Found(found) => Some(found.as_str()),
        _ => None,
    });
    let help = e.context().find_map(|ctx| match ctx {
        Context::Help(help) => Some(*help),
        _ => None,
    });
    let labels: Vec<&str> = e
        .context()
        .filter_map(|ctx| match ctx {
            Context::Label(label) => Some(*label),
            _ => None,
        })
        .collect();

    if explicit_span.is_none() && end_offset >= tokens.len() && !tokens.is_empty() {
        return incomplete(tokens, end_offset);
    }

    let span = explicit_span.unwrap_or_else(|| {
        let start_offset = e
            .context()
            .find_map(|ctx| match ctx {
                Context::StartOffset(n) => Some(tokens.len() - n),
                _ => None,
            })
            .unwrap_or(0);
        error_span(tokens, start_offset, end_offset)
    });

    let message = match (found, labels.first()) {
        (Some(found), Some(label)) => format!("{label} `{found}`"),
        _ if labels.is_empty() => "unexpected token or end of input".to_string(),
        _ => {
            let expected: Vec<String> = labels.iter().map(|l| format!("expected {l}")).collect();
            format!("unexpected token: {}", expected.join(" → "))
        }
    };

    Diagnostic::error(message)
        .with_code(code)
        .with_label(span, code.description())
        .with_help(help.unwrap_or("check the statement syntax"))
}

/// Span of the tokens an error covers
///
/// Uses the consumed range when the failing parser consumed tokens, the
/// offending token when it did not, and the last meaningful token before
/// the error when the error sits on trivia such as a newline.
fn error_span(tokens: &[PositionedToken], start_offset: usize, end_offset: usize) -> Span {
    let meaningful = |range: std::ops::Range<usize>| {
        let slice = tokens.get(range)?;
        let first = slice.iter().find(|t| !is_trivia(&t.token))?;
        let last = slice.iter().rev().find(|t| !is_trivia(&t.token))?;
        Some(first.span.union(last.span))
    };

    if start_offset < end_offset {
        if let Some(span) = meaningful(start_offset..end_offset) {
            return span;
        }
    }
    if let Some(token) = tokens.get(end_offset).filter(|t| !is_trivia(&t.token)) {
        return token.span;
    }
    tokens[..end_offset.min(tokens.len())]
        .iter()
        .rev()
        .find(|t| !is_trivia(&t.token))
        .map(|t| t.span)
        .unwrap_or_default()
}

fn incomplete(tokens: &[PositionedToken], end_offset: usize) -> Diagnostic {
    let error_span = error_span(tokens, end_offset, end_offset);
    Diagnostic::error("incomplete input, more tokens expected")
        .with_code(ErrorCode::E101)
        .with_label(error_span, "incomplete")
        .with_help("complete the statement before the end of the file")
}

/// Build the syntax tree of an Earthfile from tokens
pub fn build_document<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<types::Document<'src>, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    match document.parse_next(&mut token_slice) {
        Ok(document) => Ok(document),
        Err(e) => {
            let current_remaining = token_slice.eof_offset();
            Err(convert_error(e, tokens, current_remaining))
        }
    }
}
