//! Example: Generating a Dagger module from the semantic model
//!
//! This example builds a resolved document by hand, without an Earthfile,
//! and prints the Go source generated for it.

use earthly2dagger::{
    ModuleSpec, Translator,
    identifier::Id,
    semantic::{
        Binding, BindingKind, BuildArg, Command, Document, Param, Scope, Statement, Target,
        TargetIndex, Value,
    },
};

fn main() {
    println!("Building document from semantic model...\n");

    let name = Id::new("name");

    // `greet` takes a required `name` argument and echoes it
    let mut greet_scope = Scope::new();
    greet_scope.declare(name, Binding::new(BindingKind::Arg, None));
    let greet = Target::new(
        Id::new("greet"),
        vec![Param::new(name, None)],
        vec![
            Statement::FromImage {
                reference: "alpine:3.20".to_string(),
            },
            Statement::ArgDecl {
                name,
                default: None,
                export: true,
            },
            Statement::Run {
                command: Command::Shell {
                    script: "echo \"Hello, ${name}\"".to_string(),
                    expand: true,
                },
                privileged: false,
            },
        ],
        greet_scope,
        vec![],
    );

    // `all` builds `greet` with a fixed argument
    let all = Target::new(
        Id::new("all"),
        vec![],
        vec![
            Statement::FromImage {
                reference: "alpine:3.20".to_string(),
            },
            Statement::BuildRef {
                target: TargetIndex::new(0),
                args: vec![BuildArg::new(name, Value::Literal("world".to_string()))],
            },
        ],
        Scope::new(),
        vec![TargetIndex::new(0)],
    );

    let document = Document::new(vec![greet, all]);

    println!("Created document:");
    for target in document.targets() {
        println!(
            "  {}: {} statements, {} params",
            target.name(),
            target.statements().len(),
            target.params().len()
        );
    }
    println!();

    let translator = Translator::default();
    let go = translator.generate(&document, &ModuleSpec::new("hello", "main"));
    println!("{go}");
}
