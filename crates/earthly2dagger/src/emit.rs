//! Go source emission.
//!
//! Renders a [`GoModule`] into one Go source unit: package clause, the
//! Dagger import, the module struct with its `New` constructor, the target
//! methods, and the helper functions the methods use. The output follows
//! the layout `gofmt` produces, but running a formatter afterwards is left
//! to the [`format`](crate::format) module.

use std::fmt::{self, Write};

use earthly2dagger_core::naming;

use crate::{
    codegen::{GoMethod, GoModule, quote},
    config::CodegenConfig,
};

/// Destination of the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    /// Dagger module name, used in the import path.
    module: String,
    /// Go package name.
    package: String,
}

impl ModuleSpec {
    pub fn new(module: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            package: package.into(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Name of the generated module struct: `my-module` → `MyModule`.
    pub fn struct_name(&self) -> String {
        naming::pascal_case(&self.module)
    }
}

/// Writes a [`GoModule`] as Go source text.
pub struct Emitter<'a> {
    spec: &'a ModuleSpec,
    config: &'a CodegenConfig,
}

impl<'a> Emitter<'a> {
    pub fn new(spec: &'a ModuleSpec, config: &'a CodegenConfig) -> Self {
        Self { spec, config }
    }

    /// Render the complete source unit.
    pub fn emit(&self, module: &GoModule) -> String {
        let mut out = String::new();
        // Writing to a `String` cannot fail.
        let _ = self.write_unit(&mut out, module);
        out
    }

    fn write_unit(&self, out: &mut String, module: &GoModule) -> fmt::Result {
        let name = self.spec.struct_name();

        writeln!(out, "package {}", self.spec.package())?;
        writeln!(out)?;
        writeln!(out, "import {}", quote(&format!("dagger/{}/internal/dagger", self.spec.module())))?;
        writeln!(out)?;
        writeln!(out, "type {name} struct {{")?;
        writeln!(out, "\tContainer *dagger.Container")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "func New(")?;
        writeln!(out, "\t// +optional")?;
        writeln!(out, "\tcontainer *dagger.Container,")?;
        writeln!(out, ") *{name} {{")?;
        writeln!(out, "\tif container == nil {{")?;
        writeln!(out, "\t\tcontainer = dag.Container()")?;
        writeln!(out, "\t}}")?;
        writeln!(out, "\treturn &{name}{{Container: container}}")?;
        writeln!(out, "}}")?;

        for method in module.methods() {
            writeln!(out)?;
            write_method(out, &name, method)?;
        }

        let helpers = module.helpers();
        if helpers.save_artifact {
            writeln!(out)?;
            self.write_container_func(
                out,
                "saveArtifact(src string, dest string)",
                &format!(
                    "ctr.WithFile({}+dest, ctr.File(src))",
                    quote(&dir_prefix(self.config.artifact_dir()))
                ),
            )?;
        }
        if helpers.save_directory {
            writeln!(out)?;
            self.write_container_func(
                out,
                "saveDirectory(src string, dest string)",
                &format!(
                    "ctr.WithDirectory({}+dest, ctr.Directory(src))",
                    quote(&dir_prefix(self.config.artifact_dir()))
                ),
            )?;
        }
        if helpers.depends_on {
            writeln!(out)?;
            self.write_container_func(
                out,
                "dependsOn(name string, dep *dagger.Container)",
                &format!(
                    "ctr.WithMountedDirectory({}+name, dep.Rootfs())",
                    quote(&dir_prefix(self.config.dependency_dir()))
                ),
            )?;
        }

        Ok(())
    }

    /// A helper returning a `dagger.WithContainerFunc` for use with `With`.
    fn write_container_func(&self, out: &mut String, signature: &str, body: &str) -> fmt::Result {
        writeln!(out, "func {signature} dagger.WithContainerFunc {{")?;
        writeln!(out, "\treturn func(ctr *dagger.Container) *dagger.Container {{")?;
        writeln!(out, "\t\treturn {body}")?;
        writeln!(out, "\t}}")?;
        writeln!(out, "}}")
    }
}

fn write_method(out: &mut String, receiver: &str, method: &GoMethod) -> fmt::Result {
    write!(out, "func (m *{receiver}) {}(", method.name())?;
    if !method.params().is_empty() {
        writeln!(out)?;
        for param in method.params() {
            if param.is_optional() {
                writeln!(out, "\t// +optional")?;
            }
            if let Some(default) = param.default() {
                writeln!(out, "\t// +default={}", quote(default))?;
            }
            writeln!(out, "\t{} string,", param.name())?;
        }
    }
    writeln!(out, ") *dagger.Container {{")?;

    write!(out, "\treturn m.Container")?;
    for call in method.calls() {
        write!(out, ".\n\t\t{call}")?;
    }
    writeln!(out)?;
    writeln!(out, "}}")
}

/// `dir` followed by exactly one `/`.
fn dir_prefix(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}

#[cfg(test)]
mod tests {
    use earthly2dagger_core::{
        identifier::Id,
        semantic::{Document, Param, Scope, Statement, Target},
    };

    use super::*;
    use crate::codegen::Generator;

    const PREAMBLE: &str = "package main

import \"dagger/my-module/internal/dagger\"

type MyModule struct {
\tContainer *dagger.Container
}

func New(
\t// +optional
\tcontainer *dagger.Container,
) *MyModule {
\tif container == nil {
\t\tcontainer = dag.Container()
\t}
\treturn &MyModule{Container: container}
}
";

    fn emit(targets: Vec<Target>, config: &CodegenConfig) -> String {
        let document = Document::new(targets);
        let module = Generator::new(config, &document).generate();
        let spec = ModuleSpec::new("my-module", "main");
        Emitter::new(&spec, config).emit(&module)
    }

    #[test]
    fn test_struct_name() {
        assert_eq!(ModuleSpec::new("my-module", "main").struct_name(), "MyModule");
    }

    #[test]
    fn test_empty_document_has_preamble_only() {
        assert_eq!(emit(vec![], &CodegenConfig::default()), PREAMBLE);
    }

    #[test]
    fn test_method_without_params() {
        let target = Target::new(
            Id::new("test-expose-port"),
            vec![],
            vec![
                Statement::FromImage {
                    reference: "alpine".to_string(),
                },
                Statement::Expose {
                    port: 8080,
                    protocol: Default::default(),
                },
            ],
            Scope::new(),
            vec![],
        );

        let expected = format!(
            "{PREAMBLE}
func (m *MyModule) TestExposePort() *dagger.Container {{
\treturn m.Container.
\t\tFrom(\"alpine\").
\t\tWithExposedPort(8080)
}}
"
        );
        assert_eq!(emit(vec![target], &CodegenConfig::default()), expected);
    }

    #[test]
    fn test_method_with_params() {
        let target = Target::new(
            Id::new("build"),
            vec![
                Param::new(Id::new("name"), None),
                Param::new(Id::new("tag"), Some(String::new())),
                Param::new(Id::new("greeting"), Some("hello \"you\"".to_string())),
            ],
            vec![Statement::ArgDecl {
                name: Id::new("name"),
                default: None,
                export: true,
            }],
            Scope::new(),
            vec![],
        );

        let out = emit(vec![target], &CodegenConfig::default());
        assert!(out.contains(
            "func (m *MyModule) Build(
\tname string,
\t// +optional
\ttag string,
\t// +optional
\t// +default=\"hello \\\"you\\\"\"
\tgreeting string,
) *dagger.Container {
\treturn m.Container.
\t\tWithEnvVariable(\"name\", name)
}
"
        ));
    }

    #[test]
    fn test_helpers_follow_methods() {
        let target = Target::new(
            Id::new("dist"),
            vec![],
            vec![
                Statement::FromImage {
                    reference: "alpine".to_string(),
                },
                Statement::SaveArtifact {
                    source: "/out/app".to_string(),
                    dest: Some("bin/app".to_string()),
                },
            ],
            Scope::new(),
            vec![],
        );
        let config = CodegenConfig::new(vec!["sh".to_string(), "-c".to_string()], "/out/", "/deps");

        let out = emit(vec![target], &config);
        assert!(out.ends_with(
            "
func saveArtifact(src string, dest string) dagger.WithContainerFunc {
\treturn func(ctr *dagger.Container) *dagger.Container {
\t\treturn ctr.WithFile(\"/out/\"+dest, ctr.File(src))
\t}
}
"
        ));
        assert!(!out.contains("func dependsOn"));
        assert!(!out.contains("func saveDirectory"));
    }

    #[test]
    fn test_directory_helper() {
        let target = Target::new(
            Id::new("docs"),
            vec![],
            vec![Statement::SaveArtifact {
                source: "site/".to_string(),
                dest: None,
            }],
            Scope::new(),
            vec![],
        );

        let out = emit(vec![target], &CodegenConfig::default());
        assert!(out.contains("\t\tWith(saveDirectory(\"site/\", \"site\"))\n}\n"));
        assert!(out.ends_with(
            "
func saveDirectory(src string, dest string) dagger.WithContainerFunc {
\treturn func(ctr *dagger.Container) *dagger.Container {
\t\treturn ctr.WithDirectory(\"/artifacts/\"+dest, ctr.Directory(src))
\t}
}
"
        ));
        assert!(!out.contains("func saveArtifact"));
    }

    #[test]
    fn test_dir_prefix() {
        assert_eq!(dir_prefix("/artifacts"), "/artifacts/");
        assert_eq!(dir_prefix("/"), "/");
    }
}
