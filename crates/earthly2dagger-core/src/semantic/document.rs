//! Document, target and scope structures of the resolved model.

use indexmap::IndexMap;

use crate::{identifier::Id, semantic::Statement};

/// Index of a [`Target`] in its [`Document`]'s flat target table.
///
/// Inter-target references are stored as indices rather than ownership
/// links, so forward references and (rejected) cycles never create
/// ownership cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetIndex(usize);

impl TargetIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether a scope entry came from `ARG` or `ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Arg,
    Env,
}

/// A name visible to later statements of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    kind: BindingKind,
    value: Option<String>,
}

impl Binding {
    pub fn new(kind: BindingKind, value: Option<String>) -> Self {
        Self { kind, value }
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// The `ENV` value or `ARG` default as written, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Names declared in a target, in first-declaration order.
///
/// Re-declaring a name overwrites its binding (last write wins) but keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    bindings: IndexMap<Id, Binding>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare or re-declare `name`.
    pub fn declare(&mut self, name: Id, binding: Binding) {
        self.bindings.insert(name, binding);
    }

    pub fn get(&self, name: Id) -> Option<&Binding> {
        self.bindings.get(&name)
    }

    pub fn contains(&self, name: Id) -> bool {
        self.bindings.contains_key(&name)
    }

    /// Returns `true` if `name` is currently bound by an `ARG`.
    pub fn is_arg(&self, name: Id) -> bool {
        self.get(name)
            .is_some_and(|binding| binding.kind() == BindingKind::Arg)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, &Binding)> {
        self.bindings.iter().map(|(name, binding)| (*name, binding))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A function parameter derived from one or more `ARG` declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: Id,
    default: Option<String>,
}

impl Param {
    pub fn new(name: Id, default: Option<String>) -> Self {
        Self { name, default }
    }

    /// The `ARG` name as written in the Earthfile.
    pub fn name(&self) -> Id {
        self.name
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// A parameter without default must be supplied by every caller.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A resolved build target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    name: Id,
    params: Vec<Param>,
    statements: Vec<Statement>,
    scope: Scope,
    dependencies: Vec<TargetIndex>,
}

impl Target {
    pub fn new(
        name: Id,
        params: Vec<Param>,
        statements: Vec<Statement>,
        scope: Scope,
        dependencies: Vec<TargetIndex>,
    ) -> Self {
        Self {
            name,
            params,
            statements,
            scope,
            dependencies,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn param(&self, name: Id) -> Option<&Param> {
        self.params.iter().find(|param| param.name() == name)
    }

    /// Statements in source order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// The scope as it stands after the last statement.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Targets invoked through `BUILD`, in first-reference order, without duplicates.
    pub fn dependencies(&self) -> &[TargetIndex] {
        &self.dependencies
    }
}

/// A resolved Earthfile: targets in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    targets: Vec<Target>,
}

impl Document {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Returns the target at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not come from this document.
    pub fn target(&self, index: TargetIndex) -> &Target {
        &self.targets[index.index()]
    }

    pub fn find(&self, name: &str) -> Option<(TargetIndex, &Target)> {
        self.targets
            .iter()
            .enumerate()
            .find(|(_, target)| target.name() == name)
            .map(|(idx, target)| (TargetIndex::new(idx), target))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
