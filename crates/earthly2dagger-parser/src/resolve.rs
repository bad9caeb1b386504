//! Name resolution and semantic checks.
//!
//! The resolver turns the syntax tree into a [`semantic::Document`]. It runs
//! in three passes over the targets in document order:
//!
//! 1. index target names (duplicates and generated function name clashes are
//!    rejected) and collect each target's parameters, so that `BUILD` can
//!    refer to targets defined further down;
//! 2. walk every target's statements left to right, maintaining the scope
//!    of declared `ARG`/`ENV` names, classifying values and binding `BUILD`
//!    arguments to the callee's parameters;
//! 3. search the `BUILD` graph for cycles.
//!
//! The first problem found is returned as a [`ResolveError`].

use std::collections::HashMap;

use log::{debug, trace, warn};

use earthly2dagger_core::{
    expansion,
    identifier::Id,
    naming,
    semantic::{self, Binding, BindingKind, BuildArg, Param, Scope, TargetIndex, Value},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    parser_types as types,
    span::{Span, Spanned},
};

/// Name of the field holding the base container on the generated module.
const CONTAINER_FIELD: &str = "Container";

/// A semantic error in an otherwise well-formed Earthfile.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    UndeclaredVariable {
        target: String,
        name: String,
        /// Index of the offending statement within the target.
        statement: usize,
        span: Span,
    },
    DuplicateBaseImage {
        target: String,
        first: Span,
        second: Span,
    },
    MissingBaseImage {
        target: String,
        span: Span,
    },
    CyclicDependency {
        /// Target names from the repeated target back to itself.
        cycle: Vec<String>,
        span: Span,
    },
    UnknownTargetReference {
        from: String,
        to: String,
        span: Span,
    },
    DuplicateTarget {
        name: String,
        first: Span,
        second: Span,
    },
    EmptyTarget {
        name: String,
        span: Span,
    },
    StatementBeforeBaseImage {
        target: String,
        statement: usize,
        directive: &'static str,
        span: Span,
    },
    UnknownBuildArgument {
        from: String,
        to: String,
        name: String,
        /// Arguments the callee does declare.
        declared: Vec<String>,
        span: Span,
    },
    MissingBuildArgument {
        from: String,
        to: String,
        name: String,
        span: Span,
    },
    ConflictingFunctionName {
        target: String,
        function: String,
        /// The earlier target with the same function name, or `None` when
        /// the name clashes with the module's own field.
        other: Option<(String, Span)>,
        span: Span,
    },
    ConflictingParameterName {
        target: String,
        parameter: String,
        first: Spanned<String>,
        second: Spanned<String>,
    },
}

impl ResolveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolveError::UndeclaredVariable { .. } => ErrorCode::E200,
            ResolveError::DuplicateBaseImage { .. } => ErrorCode::E201,
            ResolveError::MissingBaseImage { .. } => ErrorCode::E202,
            ResolveError::CyclicDependency { .. } => ErrorCode::E203,
            ResolveError::UnknownTargetReference { .. } => ErrorCode::E204,
            ResolveError::DuplicateTarget { .. } => ErrorCode::E205,
            ResolveError::EmptyTarget { .. } => ErrorCode::E206,
            ResolveError::StatementBeforeBaseImage { .. } => ErrorCode::E207,
            ResolveError::UnknownBuildArgument { .. } => ErrorCode::E208,
            ResolveError::MissingBuildArgument { .. } => ErrorCode::E209,
            ResolveError::ConflictingFunctionName { .. } => ErrorCode::E210,
            ResolveError::ConflictingParameterName { .. } => ErrorCode::E211,
        }
    }
}

impl From<ResolveError> for Diagnostic {
    fn from(err: ResolveError) -> Self {
        let code = err.code();
        match err {
            ResolveError::UndeclaredVariable {
                target, name, span, ..
            } => Diagnostic::error(format!(
                "undeclared variable `{name}` in target `{target}`"
            ))
            .with_code(code)
            .with_label(span, "referenced before it is declared")
            .with_help(format!(
                "declare it earlier in the target with `ARG {name}` or `ENV {name}=<value>`"
            )),
            ResolveError::DuplicateBaseImage {
                target,
                first,
                second,
            } => Diagnostic::error(format!("target `{target}` has more than one FROM"))
                .with_code(code)
                .with_label(second, "second base image")
                .with_secondary_label(first, "first base image")
                .with_help("split the target in two and connect them with BUILD"),
            ResolveError::MissingBaseImage { target, span } => {
                Diagnostic::error(format!("target `{target}` has no FROM"))
                    .with_code(code)
                    .with_label(span, "no base image")
                    .with_help("add `FROM <image>` before the first statement that needs a container")
            }
            ResolveError::CyclicDependency { cycle, span } => {
                Diagnostic::error(format!("cyclic dependency: {}", cycle.join(" -> ")))
                    .with_code(code)
                    .with_label(span, "this BUILD closes the cycle")
            }
            ResolveError::UnknownTargetReference { from, to, span } => Diagnostic::error(
                format!("target `{from}` builds unknown target `{to}`"),
            )
            .with_code(code)
            .with_label(span, "no target with this name"),
            ResolveError::DuplicateTarget {
                name,
                first,
                second,
            } => Diagnostic::error(format!("target `{name}` is defined more than once"))
                .with_code(code)
                .with_label(second, "duplicate definition")
                .with_secondary_label(first, "first defined here")
                .with_help("rename or merge one of the targets"),
            ResolveError::EmptyTarget { name, span } => {
                Diagnostic::error(format!("target `{name}` has no statements"))
                    .with_code(code)
                    .with_label(span, "empty target")
                    .with_help("add statements below the header or remove it")
            }
            ResolveError::StatementBeforeBaseImage {
                target,
                directive,
                span,
                ..
            } => Diagnostic::error(format!(
                "`{directive}` before `FROM` in target `{target}`"
            ))
            .with_code(code)
            .with_label(span, "needs a base image")
            .with_help("move `FROM` above this statement"),
            ResolveError::UnknownBuildArgument {
                from,
                to,
                name,
                declared,
                span,
            } => {
                let help = if declared.is_empty() {
                    format!("target `{to}` declares no arguments")
                } else {
                    format!("target `{to}` declares: {}", declared.join(", "))
                };
                Diagnostic::error(format!(
                    "target `{from}` passes unknown argument `{name}` to `{to}`"
                ))
                .with_code(code)
                .with_label(span, "not declared by the target")
                .with_help(help)
            }
            ResolveError::MissingBuildArgument {
                from,
                to,
                name,
                span,
            } => Diagnostic::error(format!(
                "target `{from}` does not pass required argument `{name}` to `{to}`"
            ))
            .with_code(code)
            .with_label(span, format!("missing `--{name}=<value>`"))
            .with_help(format!("pass a value or give `{name}` a default in `{to}`")),
            ResolveError::ConflictingFunctionName {
                target,
                function,
                other: Some((other, other_span)),
                span,
            } => Diagnostic::error(format!(
                "targets `{other}` and `{target}` both generate function `{function}`"
            ))
            .with_code(code)
            .with_label(span, "conflicting name")
            .with_secondary_label(other_span, "first target")
            .with_help("rename one of the targets"),
            ResolveError::ConflictingFunctionName {
                target,
                function,
                other: None,
                span,
            } => Diagnostic::error(format!(
                "target `{target}` generates `{function}`, which the module already uses"
            ))
            .with_code(code)
            .with_label(span, "conflicting name")
            .with_help("rename the target"),
            ResolveError::ConflictingParameterName {
                target,
                parameter,
                first,
                second,
            } => Diagnostic::error(format!(
                "arguments `{first}` and `{second}` of target `{target}` both generate parameter `{parameter}`"
            ))
            .with_code(code)
            .with_label(second.span(), "conflicting name")
            .with_secondary_label(first.span(), "first argument")
            .with_help("rename one of the arguments"),
        }
    }
}

type Result<T> = std::result::Result<T, ResolveError>;

/// Per-target information gathered before statements are resolved.
struct TargetInfo {
    params: Vec<Param>,
}

struct Resolver<'a, 'src> {
    document: &'a types::Document<'src>,
    index: HashMap<&'src str, TargetIndex>,
    infos: Vec<TargetInfo>,
}

impl<'a, 'src> Resolver<'a, 'src> {
    fn new(document: &'a types::Document<'src>) -> Self {
        Self {
            document,
            index: HashMap::new(),
            infos: Vec::with_capacity(document.targets.len()),
        }
    }

    fn name(&self, idx: TargetIndex) -> &'src str {
        self.document.targets[idx.index()].name.inner()
    }

    // ============================================================================
    // Pass 1: names and parameters
    // ============================================================================

    fn index_targets(&mut self) -> Result<()> {
        let mut functions: HashMap<String, TargetIndex> = HashMap::new();

        for (i, target) in self.document.targets.iter().enumerate() {
            let idx = TargetIndex::new(i);
            let name = *target.name.inner();

            if let Some(first) = self.index.get(name) {
                return Err(ResolveError::DuplicateTarget {
                    name: name.to_string(),
                    first: self.document.targets[first.index()].name.span(),
                    second: target.name.span(),
                });
            }

            let function = naming::pascal_case(name);
            if function == CONTAINER_FIELD {
                return Err(ResolveError::ConflictingFunctionName {
                    target: name.to_string(),
                    function,
                    other: None,
                    span: target.name.span(),
                });
            }
            if let Some(other) = functions.get(&function) {
                let other = &self.document.targets[other.index()];
                return Err(ResolveError::ConflictingFunctionName {
                    target: name.to_string(),
                    function,
                    other: Some((other.name.to_string(), other.name.span())),
                    span: target.name.span(),
                });
            }

            trace!(target_name = name, function = function.as_str(); "Indexed target");
            functions.insert(function, idx);
            self.index.insert(name, idx);
            self.infos.push(TargetInfo {
                params: Self::collect_params(target)?,
            });
        }

        Ok(())
    }

    /// Parameters in first-declaration order, last declaration's default.
    fn collect_params(target: &types::Target<'_>) -> Result<Vec<Param>> {
        let mut params: Vec<(Spanned<String>, Option<String>)> = Vec::new();

        for statement in &target.statements {
            let types::Statement::Arg { name, default, .. } = statement.inner() else {
                continue;
            };
            let default = default.as_ref().map(|d| expansion::unescape(d));

            if let Some(existing) = params.iter_mut().find(|(n, _)| n.inner() == name.inner()) {
                existing.1 = default;
                continue;
            }

            let parameter = naming::param_name(name);
            if let Some((first, _)) = params
                .iter()
                .find(|(n, _)| naming::param_name(n) == parameter)
            {
                return Err(ResolveError::ConflictingParameterName {
                    target: target.name.to_string(),
                    parameter,
                    first: first.clone(),
                    second: name.clone(),
                });
            }
            params.push((name.clone(), default));
        }

        Ok(params
            .into_iter()
            .map(|(name, default)| Param::new(Id::new(&name), default))
            .collect())
    }

    // ============================================================================
    // Pass 2: statements
    // ============================================================================

    fn resolve_targets(&self) -> Result<Vec<semantic::Target>> {
        self.document
            .targets
            .iter()
            .enumerate()
            .map(|(i, target)| self.resolve_target(TargetIndex::new(i), target))
            .collect()
    }

    fn resolve_target(
        &self,
        idx: TargetIndex,
        target: &types::Target<'src>,
    ) -> Result<semantic::Target> {
        let name = *target.name.inner();
        debug!(target_name = name, statements = target.statements.len(); "Resolving target");

        if target.statements.is_empty() {
            return Err(ResolveError::EmptyTarget {
                name: name.to_string(),
                span: target.name.span(),
            });
        }

        let has_from = target
            .statements
            .iter()
            .any(|s| matches!(s.inner(), types::Statement::From { .. }));
        let declarations_only = target
            .statements
            .iter()
            .all(|s| matches!(s.inner(), types::Statement::Arg { .. } | types::Statement::Env { .. }));
        if !has_from && !declarations_only {
            return Err(ResolveError::MissingBaseImage {
                target: name.to_string(),
                span: target.name.span(),
            });
        }

        let mut walk = TargetWalk {
            resolver: self,
            name,
            scope: Scope::new(),
            base_image: None,
            statements: Vec::with_capacity(target.statements.len()),
            arg_statements: HashMap::new(),
            dependencies: Vec::new(),
        };
        for (position, statement) in target.statements.iter().enumerate() {
            walk.statement(position, statement)?;
        }

        Ok(semantic::Target::new(
            Id::new(name),
            self.infos[idx.index()].params.clone(),
            walk.statements,
            walk.scope,
            walk.dependencies,
        ))
    }

    // ============================================================================
    // Pass 3: cycles
    // ============================================================================

    fn check_cycles(&self, targets: &[semantic::Target]) -> Result<()> {
        let mut colors = vec![Color::White; targets.len()];
        let mut stack = Vec::new();

        for i in 0..targets.len() {
            if colors[i] == Color::White {
                self.visit(TargetIndex::new(i), targets, &mut colors, &mut stack)?;
            }
        }
        Ok(())
    }

    fn visit(
        &self,
        idx: TargetIndex,
        targets: &[semantic::Target],
        colors: &mut [Color],
        stack: &mut Vec<TargetIndex>,
    ) -> Result<()> {
        colors[idx.index()] = Color::Gray;
        stack.push(idx);

        for &dep in targets[idx.index()].dependencies() {
            match colors[dep.index()] {
                Color::White => self.visit(dep, targets, colors, stack)?,
                Color::Gray => {
                    let start = stack.iter().position(|&i| i == dep).unwrap_or(0);
                    let mut cycle: Vec<String> = stack[start..]
                        .iter()
                        .map(|&i| self.name(i).to_string())
                        .collect();
                    cycle.push(self.name(dep).to_string());
                    return Err(ResolveError::CyclicDependency {
                        cycle,
                        span: self.build_span(idx, dep),
                    });
                }
                Color::Black => {}
            }
        }

        stack.pop();
        colors[idx.index()] = Color::Black;
        Ok(())
    }

    /// Span of the first `BUILD` in `from` that invokes `to`.
    fn build_span(&self, from: TargetIndex, to: TargetIndex) -> Span {
        let target = &self.document.targets[from.index()];
        let to = self.name(to);
        target
            .statements
            .iter()
            .find(|s| matches!(s.inner(), types::Statement::Build { target: callee, .. } if callee.inner() == to))
            .map_or(target.name.span(), |s| s.span())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// State while walking the statements of one target.
struct TargetWalk<'r, 'a, 'src> {
    resolver: &'r Resolver<'a, 'src>,
    name: &'src str,
    scope: Scope,
    base_image: Option<Span>,
    statements: Vec<semantic::Statement>,
    /// Latest `ARG` statement of each name, as an index into `statements`.
    arg_statements: HashMap<Id, usize>,
    dependencies: Vec<TargetIndex>,
}

impl TargetWalk<'_, '_, '_> {
    fn statement(&mut self, position: usize, statement: &Spanned<types::Statement>) -> Result<()> {
        let stmt = statement.inner();

        if stmt.needs_base_image() && self.base_image.is_none() {
            return Err(ResolveError::StatementBeforeBaseImage {
                target: self.name.to_string(),
                statement: position,
                directive: stmt.keyword(),
                span: statement.span(),
            });
        }

        let resolved = match stmt {
            types::Statement::From { image } => {
                if let Some(first) = self.base_image {
                    return Err(ResolveError::DuplicateBaseImage {
                        target: self.name.to_string(),
                        first,
                        second: statement.span(),
                    });
                }
                self.base_image = Some(statement.span());
                semantic::Statement::FromImage {
                    reference: image.to_string(),
                }
            }
            types::Statement::Arg { name, default, .. } => {
                let id = Id::new(name);
                let default = default.as_ref().map(|d| expansion::unescape(d));
                self.scope
                    .declare(id, Binding::new(BindingKind::Arg, default.clone()));
                self.arg_statements.insert(id, self.statements.len());
                semantic::Statement::ArgDecl {
                    name: id,
                    default,
                    export: false,
                }
            }
            types::Statement::Env { name, value } => {
                let value = self.classify(position, value)?;
                if let Value::Interpolated(text) = &value {
                    self.export_args(text);
                }
                let id = Id::new(name);
                self.arg_statements.remove(&id);
                let text = match &value {
                    Value::Literal(text) | Value::Interpolated(text) => text.clone(),
                    Value::Param(param) => format!("${{{param}}}"),
                };
                self.scope
                    .declare(id, Binding::new(BindingKind::Env, Some(text)));
                semantic::Statement::EnvSet { name: id, value }
            }
            types::Statement::Workdir { path } => {
                self.check_references(position, path, path.span())?;
                let expand = expansion::has_references(path);
                if expand {
                    self.export_args(path);
                }
                semantic::Statement::Workdir {
                    path: path.to_string(),
                    expand,
                }
            }
            types::Statement::Run {
                command,
                privileged,
            } => {
                let command = self.run_command(position, command)?;
                if let semantic::Command::Shell {
                    script,
                    expand: true,
                } = &command
                {
                    self.export_args(script);
                }
                semantic::Statement::Run {
                    command,
                    privileged: *privileged,
                }
            }
            types::Statement::Cmd { command } => semantic::Statement::Cmd {
                command: Self::runtime_command(command),
            },
            types::Statement::Entrypoint { command } => semantic::Statement::Entrypoint {
                command: Self::runtime_command(command),
            },
            types::Statement::User { name } => semantic::Statement::User {
                name: name.to_string(),
            },
            types::Statement::Expose { port, protocol } => semantic::Statement::Expose {
                port: *port.inner(),
                protocol: *protocol,
            },
            types::Statement::SaveArtifact { source, dest } => semantic::Statement::SaveArtifact {
                source: source.to_string(),
                dest: dest.as_ref().map(|d| d.to_string()),
            },
            types::Statement::Build { target, args } => {
                self.build(position, statement.span(), target, args)?
            }
        };

        trace!(statement:? = resolved; "Resolved statement");
        self.statements.push(resolved);
        Ok(())
    }

    /// Fail on the first reference in `text` that names nothing in scope.
    fn check_references(&self, position: usize, text: &str, span: Span) -> Result<()> {
        match expansion::references(text).find(|r| !self.scope.contains(Id::new(r.name()))) {
            Some(reference) => Err(ResolveError::UndeclaredVariable {
                target: self.name.to_string(),
                name: reference.name().to_string(),
                statement: position,
                span,
            }),
            None => Ok(()),
        }
    }

    /// Mark the `ARG`s that an expanding payload reads from the container
    /// environment as exported.
    fn export_args(&mut self, text: &str) {
        for reference in expansion::references(text) {
            let id = Id::new(reference.name());
            if !self.scope.is_arg(id) {
                continue;
            }
            let Some(&index) = self.arg_statements.get(&id) else {
                continue;
            };
            if let Some(semantic::Statement::ArgDecl { export, .. }) =
                self.statements.get_mut(index)
            {
                *export = true;
            }
        }
    }

    /// How a value reaches the generated code.
    fn classify(&self, position: usize, value: &Spanned<String>) -> Result<Value> {
        self.check_references(position, value, value.span())?;

        if let Some(name) = expansion::sole_reference(value) {
            let id = Id::new(name);
            if self.scope.is_arg(id) {
                return Ok(Value::Param(id));
            }
        }
        if expansion::has_references(value) {
            Ok(Value::Interpolated(value.to_string()))
        } else {
            Ok(Value::Literal(expansion::unescape(value)))
        }
    }

    fn run_command(
        &self,
        position: usize,
        command: &Spanned<types::Command>,
    ) -> Result<semantic::Command> {
        match command.inner() {
            types::Command::Shell(script) => {
                self.check_references(position, script, command.span())?;
                Ok(semantic::Command::Shell {
                    script: script.clone(),
                    expand: expansion::has_references(script),
                })
            }
            types::Command::Exec(argv) => Ok(semantic::Command::Exec { argv: argv.clone() }),
        }
    }

    /// `CMD` and `ENTRYPOINT` are run by the container later; the shell
    /// expands their references then from the image environment.
    fn runtime_command(command: &Spanned<types::Command>) -> semantic::Command {
        match command.inner() {
            types::Command::Shell(script) => semantic::Command::Shell {
                script: script.clone(),
                expand: false,
            },
            types::Command::Exec(argv) => semantic::Command::Exec { argv: argv.clone() },
        }
    }

    fn build(
        &mut self,
        position: usize,
        span: Span,
        callee: &Spanned<String>,
        args: &[types::BuildArgument],
    ) -> Result<semantic::Statement> {
        let resolver = self.resolver;
        let Some(&callee_idx) = resolver.index.get(callee.as_str()) else {
            return Err(ResolveError::UnknownTargetReference {
                from: self.name.to_string(),
                to: callee.to_string(),
                span: callee.span(),
            });
        };
        let params = &resolver.infos[callee_idx.index()].params;

        if let Some(unknown) = args
            .iter()
            .find(|arg| !params.iter().any(|p| p.name() == arg.name.as_str()))
        {
            return Err(ResolveError::UnknownBuildArgument {
                from: self.name.to_string(),
                to: callee.to_string(),
                name: unknown.name.to_string(),
                declared: params.iter().map(|p| p.name().as_string()).collect(),
                span: unknown.name.span(),
            });
        }

        let mut bound = Vec::with_capacity(params.len());
        for param in params {
            // The last occurrence wins when an argument is passed twice.
            let passed = args.iter().rev().find(|arg| param.name() == arg.name.as_str());
            let value = match (passed, param.default()) {
                (Some(arg), _) => self.build_value(position, callee, arg)?,
                (None, Some(default)) => Value::Literal(default.to_string()),
                (None, None) => {
                    return Err(ResolveError::MissingBuildArgument {
                        from: self.name.to_string(),
                        to: callee.to_string(),
                        name: param.name().as_string(),
                        span,
                    });
                }
            };
            bound.push(BuildArg::new(param.name(), value));
        }

        if !self.dependencies.contains(&callee_idx) {
            self.dependencies.push(callee_idx);
        }

        Ok(semantic::Statement::BuildRef {
            target: callee_idx,
            args: bound,
        })
    }

    /// A `BUILD` argument is either forwarded from one of our parameters or
    /// passed as literal text.
    fn build_value(
        &self,
        position: usize,
        callee: &str,
        arg: &types::BuildArgument,
    ) -> Result<Value> {
        self.check_references(position, &arg.value, arg.value.span())?;

        if let Some(name) = expansion::sole_reference(&arg.value) {
            let id = Id::new(name);
            if self.scope.is_arg(id) {
                return Ok(Value::Param(id));
            }
        }
        if expansion::has_references(&arg.value) {
            warn!(
                target_name = self.name,
                callee = callee,
                argument = arg.name.as_str(),
                value = arg.value.as_str();
                "Build argument references variables but is passed literally"
            );
        }
        Ok(Value::Literal(expansion::unescape(&arg.value)))
    }
}

/// Resolve a parsed Earthfile into the semantic model.
pub fn resolve(document: &types::Document<'_>) -> std::result::Result<semantic::Document, ResolveError> {
    let mut resolver = Resolver::new(document);

    resolver.index_targets()?;
    let targets = resolver.resolve_targets()?;
    resolver.check_cycles(&targets)?;

    debug!(targets = targets.len(); "Resolved document");
    Ok(semantic::Document::new(targets))
}
