//! Parser AST types
//!
//! The syntax tree mirrors the Earthfile as written. Names are not looked up
//! and `$NAME` references are not checked yet; that is the job of the
//! [`resolve`](crate::resolve) pass.
//!
//! Leaf values are wrapped in [`Spanned<T>`] so that the resolver can point
//! diagnostics at the exact text.

use std::fmt;

use earthly2dagger_core::semantic::Protocol;

use crate::span::{Span, Spanned};

/// A whole Earthfile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document<'src> {
    /// The `VERSION` line arguments, if present.
    pub version: Option<Spanned<String>>,
    pub targets: Vec<Target<'src>>,
}

/// A target header and the indented statements below it.
#[derive(Debug, Clone, PartialEq)]
pub struct Target<'src> {
    pub name: Spanned<&'src str>,
    pub statements: Vec<Spanned<Statement>>,
}

impl Target<'_> {
    /// Span from the header to the last statement.
    pub fn span(&self) -> Span {
        self.statements
            .last()
            .map_or(self.name.span(), |last| self.name.span().union(last.span()))
    }
}

/// A `RUN`, `CMD` or `ENTRYPOINT` payload as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Shell form: the rest of the logical line.
    Shell(String),
    /// Exec form: `["executable", "arg", ...]`.
    Exec(Vec<String>),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Shell(script) => write!(f, "{script}"),
            Command::Exec(argv) => {
                write!(f, "[")?;
                for (i, arg) in argv.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg:?}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// `--name=value` on a `BUILD` line.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildArgument {
    pub name: Spanned<String>,
    pub value: Spanned<String>,
}

/// One statement. Lines like `ENV A=1 B=2` or `EXPOSE 80 443` produce
/// several statements sharing the line.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    From {
        image: Spanned<String>,
    },
    Arg {
        name: Spanned<String>,
        default: Option<Spanned<String>>,
        required: bool,
    },
    Env {
        name: Spanned<String>,
        value: Spanned<String>,
    },
    Workdir {
        path: Spanned<String>,
    },
    Run {
        command: Spanned<Command>,
        privileged: bool,
    },
    Cmd {
        command: Spanned<Command>,
    },
    Entrypoint {
        command: Spanned<Command>,
    },
    User {
        name: Spanned<String>,
    },
    Expose {
        port: Spanned<u16>,
        protocol: Protocol,
    },
    SaveArtifact {
        source: Spanned<String>,
        dest: Option<Spanned<String>>,
    },
    Build {
        /// Target name without the leading `+`.
        target: Spanned<String>,
        args: Vec<BuildArgument>,
    },
}

impl Statement {
    /// The directive keyword, for messages.
    pub fn keyword(&self) -> &'static str {
        match self {
            Statement::From { .. } => "FROM",
            Statement::Arg { .. } => "ARG",
            Statement::Env { .. } => "ENV",
            Statement::Workdir { .. } => "WORKDIR",
            Statement::Run { .. } => "RUN",
            Statement::Cmd { .. } => "CMD",
            Statement::Entrypoint { .. } => "ENTRYPOINT",
            Statement::User { .. } => "USER",
            Statement::Expose { .. } => "EXPOSE",
            Statement::SaveArtifact { .. } => "SAVE ARTIFACT",
            Statement::Build { .. } => "BUILD",
        }
    }

    /// Statements that change the container and therefore need a base image.
    pub fn needs_base_image(&self) -> bool {
        !matches!(
            self,
            Statement::From { .. }
                | Statement::Arg { .. }
                | Statement::Env { .. }
                | Statement::Build { .. }
        )
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())?;
        match self {
            Statement::From { image } => write!(f, " {image}"),
            Statement::Arg {
                name,
                default,
                required,
            } => {
                if *required {
                    write!(f, " --required")?;
                }
                write!(f, " {name}")?;
                if let Some(default) = default {
                    write!(f, "={default}")?;
                }
                Ok(())
            }
            Statement::Env { name, value } => write!(f, " {name}={value}"),
            Statement::Workdir { path } => write!(f, " {path}"),
            Statement::Run {
                command,
                privileged,
            } => {
                if *privileged {
                    write!(f, " --privileged")?;
                }
                write!(f, " {command}")
            }
            Statement::Cmd { command } | Statement::Entrypoint { command } => {
                write!(f, " {command}")
            }
            Statement::User { name } => write!(f, " {name}"),
            Statement::Expose { port, protocol } => match protocol {
                Protocol::Tcp => write!(f, " {port}"),
                Protocol::Udp => write!(f, " {port}/udp"),
            },
            Statement::SaveArtifact { source, dest } => {
                write!(f, " {source}")?;
                if let Some(dest) = dest {
                    write!(f, " {dest}")?;
                }
                Ok(())
            }
            Statement::Build { target, args } => {
                write!(f, " +{target}")?;
                for arg in args {
                    write!(f, " --{}={}", arg.name, arg.value)?;
                }
                Ok(())
            }
        }
    }
}
