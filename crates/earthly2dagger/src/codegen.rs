//! Go code generation for resolved Earthfiles.
//!
//! This module maps each [`semantic::Target`] to a [`GoMethod`]: the method
//! name, its parameters and the chain of `*dagger.Container` calls, one per
//! statement in source order. Rendering the methods into a source unit is
//! the job of the [`emit`](crate::emit) module.
//!
//! # Pipeline Position
//!
//! ```text
//! Source Text
//!     ↓ parse
//! Semantic Model
//!     ↓ codegen (this module)
//! Go Methods
//!     ↓ emit
//! Go Source
//!     ↓ format (optional)
//! Output File
//! ```
//!
//! Values are never substituted here. References are left in the text and
//! either passed as parameters or flagged for expansion by the runtime.

mod literal;

pub use literal::{quote, raw};

use log::{debug, trace};

use earthly2dagger_core::{
    naming,
    semantic::{self, BuildArg, Command, Protocol, Statement, Value},
};

use crate::config::CodegenConfig;

use literal::string_slice;

/// A parameter of a generated method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoParam {
    name: String,
    optional: bool,
    default: Option<String>,
}

impl GoParam {
    /// Go identifier of the parameter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether callers may omit the parameter.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Non-empty default value, if any.
    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// A generated method returning `*dagger.Container`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoMethod {
    name: String,
    params: Vec<GoParam>,
    calls: Vec<String>,
}

impl GoMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[GoParam] {
        &self.params
    }

    /// Chained calls on the module container, without the leading `.`.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }
}

/// Helper functions referenced by generated methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Helpers {
    pub save_artifact: bool,
    pub save_directory: bool,
    pub depends_on: bool,
}

/// All generated methods of a document, in target order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    methods: Vec<GoMethod>,
    helpers: Helpers,
}

impl GoModule {
    pub fn methods(&self) -> &[GoMethod] {
        &self.methods
    }

    pub fn helpers(&self) -> Helpers {
        self.helpers
    }
}

/// Generates Go methods from a resolved document.
pub struct Generator<'a> {
    config: &'a CodegenConfig,
    document: &'a semantic::Document,
    helpers: Helpers,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a CodegenConfig, document: &'a semantic::Document) -> Self {
        Self {
            config,
            document,
            helpers: Helpers::default(),
        }
    }

    /// Generate one method per target.
    pub fn generate(mut self) -> GoModule {
        let methods: Vec<GoMethod> = self
            .document
            .targets()
            .iter()
            .map(|target| self.method(target))
            .collect();

        debug!(
            methods = methods.len(),
            save_artifact = self.helpers.save_artifact,
            save_directory = self.helpers.save_directory,
            depends_on = self.helpers.depends_on;
            "Generated Go methods"
        );

        GoModule {
            methods,
            helpers: self.helpers,
        }
    }

    fn method(&mut self, target: &semantic::Target) -> GoMethod {
        let name = naming::pascal_case(&target.name().as_string());

        let params = target
            .params()
            .iter()
            .map(|param| GoParam {
                name: naming::param_name(&param.name().as_string()),
                optional: !param.is_required(),
                default: param.default().filter(|d| !d.is_empty()).map(str::to_string),
            })
            .collect();

        let calls: Vec<String> = target
            .statements()
            .iter()
            .filter_map(|statement| self.call(statement))
            .collect();

        trace!(method = name.as_str(), calls = calls.len(); "Generated method");
        GoMethod {
            name,
            params,
            calls,
        }
    }

    /// The container call for one statement.
    ///
    /// An `ARG` only produces a call when the container has to see it at run
    /// time; otherwise it lives on as a method parameter alone.
    fn call(&mut self, statement: &Statement) -> Option<String> {
        let call = match statement {
            Statement::FromImage { reference } => format!("From({})", quote(reference)),
            Statement::ArgDecl { export: false, .. } => return None,
            Statement::ArgDecl { name, .. } => {
                let var = name.as_string();
                format!(
                    "WithEnvVariable({}, {})",
                    quote(&var),
                    naming::param_name(&var)
                )
            }
            Statement::EnvSet { name, value } => {
                let var = quote(&name.as_string());
                match value {
                    Value::Interpolated(text) => format!(
                        "WithEnvVariable({var}, {}, dagger.ContainerWithEnvVariableOpts{{Expand: true}})",
                        quote(text)
                    ),
                    value => format!("WithEnvVariable({var}, {})", go_value(value)),
                }
            }
            Statement::Workdir { path, expand: false } => {
                format!("WithWorkdir({})", quote(path))
            }
            Statement::Workdir { path, expand: true } => format!(
                "WithWorkdir({}, dagger.ContainerWithWorkdirOpts{{Expand: true}})",
                quote(path)
            ),
            Statement::Run {
                command,
                privileged,
            } => {
                let mut opts = Vec::new();
                if command.expands() {
                    opts.push("Expand: true");
                }
                if *privileged {
                    opts.push("InsecureRootCapabilities: true");
                }
                let argv = self.argv(command);
                if opts.is_empty() {
                    format!("WithExec({argv})")
                } else {
                    format!(
                        "WithExec({argv}, dagger.ContainerWithExecOpts{{{}}})",
                        opts.join(", ")
                    )
                }
            }
            Statement::Cmd { command } => format!("WithDefaultArgs({})", self.argv(command)),
            Statement::Entrypoint { command } => {
                format!("WithEntrypoint({})", self.argv(command))
            }
            Statement::User { name } => format!("WithUser({})", quote(name)),
            Statement::Expose { port, protocol } => match protocol {
                Protocol::Tcp => format!("WithExposedPort({port})"),
                Protocol::Udp => format!(
                    "WithExposedPort({port}, dagger.ContainerWithExposedPortOpts{{Protocol: dagger.NetworkProtocolUdp}})"
                ),
            },
            Statement::SaveArtifact { source, dest } => {
                let helper = if Statement::is_directory_artifact(source) {
                    self.helpers.save_directory = true;
                    "saveDirectory"
                } else {
                    self.helpers.save_artifact = true;
                    "saveArtifact"
                };
                let dest = Statement::artifact_dest(source, dest.as_deref());
                format!("With({helper}({}, {}))", quote(source), quote(&dest))
            }
            Statement::BuildRef { target, args } => {
                self.helpers.depends_on = true;
                let callee = self.document.target(*target).name().as_string();
                format!(
                    "With(dependsOn({}, m.{}({})))",
                    quote(&callee),
                    naming::pascal_case(&callee),
                    go_args(args)
                )
            }
        };
        Some(call)
    }

    /// `[]string{...}` for a command; shell form goes through the configured shell.
    fn argv(&self, command: &Command) -> String {
        match command {
            Command::Shell { script, .. } => string_slice(
                self.config
                    .shell()
                    .iter()
                    .map(|part| quote(part))
                    .chain(std::iter::once(raw(script))),
            ),
            Command::Exec { argv } => string_slice(argv.iter().map(|arg| quote(arg))),
        }
    }
}

fn go_value(value: &Value) -> String {
    match value {
        Value::Literal(text) | Value::Interpolated(text) => quote(text),
        Value::Param(name) => naming::param_name(&name.as_string()),
    }
}

fn go_args(args: &[BuildArg]) -> String {
    args.iter()
        .map(|arg| go_value(arg.value()))
        .collect::<Vec<_>>()
        .join(", ")
}
