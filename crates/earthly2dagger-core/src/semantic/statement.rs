//! Resolved statements.
//!
//! [`Statement`] is a closed union: the resolver and the code generator
//! match it exhaustively, so a new directive is added here and the compiler
//! points at every place that has to handle it.

use crate::{identifier::Id, semantic::TargetIndex};

/// A command payload for `RUN`, `CMD` and `ENTRYPOINT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// One command string interpreted by a shell.
    Shell {
        /// The command text, byte for byte as written.
        script: String,
        /// Whether `$NAME` / `${NAME}` references must be substituted at build time.
        expand: bool,
    },
    /// A literal argument vector executed without a shell.
    Exec { argv: Vec<String> },
}

impl Command {
    /// Returns `true` for a shell-form command flagged for runtime expansion.
    ///
    /// Exec-form commands are never expanded.
    pub fn expands(&self) -> bool {
        matches!(self, Command::Shell { expand: true, .. })
    }
}

/// How a string value reaches the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Plain text, emitted verbatim.
    Literal(String),
    /// The value is exactly one reference to a declared build argument and is
    /// passed as the corresponding function parameter.
    Param(Id),
    /// Text with references that the runtime substitutes from the container
    /// environment.
    Interpolated(String),
}

/// Transport protocol of an exposed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

/// One argument passed by a `BUILD` statement, in callee parameter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArg {
    param: Id,
    value: Value,
}

impl BuildArg {
    pub fn new(param: Id, value: Value) -> Self {
        Self { param, value }
    }

    /// The callee parameter this argument binds to.
    pub fn param(&self) -> Id {
        self.param
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A resolved statement of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `FROM <reference>`: re-bases the container on an image.
    FromImage { reference: String },
    /// `ARG <name>[=<default>]`: a function parameter.
    ///
    /// `export` is set when a later expanding payload reads the argument
    /// while it is still the binding in scope, so the runtime needs it in
    /// the container environment.
    ArgDecl {
        name: Id,
        default: Option<String>,
        export: bool,
    },
    /// `ENV <name>=<value>`
    EnvSet { name: Id, value: Value },
    /// `WORKDIR <path>`, with `expand` set when the path has references.
    Workdir { path: String, expand: bool },
    /// `RUN [--privileged] <command>`
    Run { command: Command, privileged: bool },
    /// `CMD <command>`: container default arguments.
    Cmd { command: Command },
    /// `ENTRYPOINT <command>`
    Entrypoint { command: Command },
    /// `USER <name>`
    User { name: String },
    /// `EXPOSE <port>[/<protocol>]`
    Expose { port: u16, protocol: Protocol },
    /// `SAVE ARTIFACT <source> [<dest>]`
    SaveArtifact { source: String, dest: Option<String> },
    /// `BUILD +<target> [--<name>=<value>...]`
    BuildRef { target: TargetIndex, args: Vec<BuildArg> },
}

impl Statement {
    /// Directive keyword of this statement, as written in an Earthfile.
    pub fn directive(&self) -> &'static str {
        match self {
            Statement::FromImage { .. } => "FROM",
            Statement::ArgDecl { .. } => "ARG",
            Statement::EnvSet { .. } => "ENV",
            Statement::Workdir { .. } => "WORKDIR",
            Statement::Run { .. } => "RUN",
            Statement::Cmd { .. } => "CMD",
            Statement::Entrypoint { .. } => "ENTRYPOINT",
            Statement::User { .. } => "USER",
            Statement::Expose { .. } => "EXPOSE",
            Statement::SaveArtifact { .. } => "SAVE ARTIFACT",
            Statement::BuildRef { .. } => "BUILD",
        }
    }

    /// Artifact path under the artifact root for a `SAVE ARTIFACT` statement.
    ///
    /// Without an explicit destination the artifact keeps the base name of its source.
    pub fn artifact_dest(source: &str, dest: Option<&str>) -> String {
        match dest {
            Some(dest) => dest.trim_start_matches("./").trim_start_matches('/').to_string(),
            None => source
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or(source)
                .to_string(),
        }
    }

    /// A `SAVE ARTIFACT` source ending in `/` names a directory.
    pub fn is_directory_artifact(source: &str) -> bool {
        source.ends_with('/')
    }
}
