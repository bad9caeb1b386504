//! Integration tests for the Translator API
//!
//! Each fixture Earthfile under `tests/fixtures` is translated and compared
//! with the Go source next to it.

use earthly2dagger::{
    ModuleSpec, TranslateError, Translator,
    config::{AppConfig, CodegenConfig, FormatConfig},
};
use earthly2dagger_parser::error::ErrorCode;

fn spec() -> ModuleSpec {
    ModuleSpec::new("my-module", "main")
}

fn translate(source: &str) -> Result<String, TranslateError> {
    Translator::default().translate(source, &spec())
}

/// The first diagnostic code of a failed translation.
fn error_code(source: &str) -> ErrorCode {
    match translate(source) {
        Err(TranslateError::Parse { err, .. }) => err.diagnostics()[0]
            .code()
            .expect("diagnostic should have a code"),
        other => panic!("Expected a parse error, got {other:?}"),
    }
}

macro_rules! fixture_test {
    ($name:ident, $fixture:literal) => {
        #[test]
        fn $name() {
            let source = include_str!(concat!("fixtures/", $fixture, ".earth"));
            let expected = include_str!(concat!("fixtures/", $fixture, ".go"));

            let go = translate(source).expect("Fixture should translate");
            assert_eq!(go, expected);
        }
    };
}

fixture_test!(test_cmd_fixture, "cmd");
fixture_test!(test_expose_port_fixture, "expose-port");
fixture_test!(test_workdir_fixture, "workdir");
fixture_test!(test_simple_args_fixture, "simple-args");
fixture_test!(test_multi_target_fixture, "multi-target");

#[test]
fn test_echo_is_copied_verbatim() {
    let go = translate("VERSION 0.7\ntest:\n    FROM alpine\n    RUN echo hello world\n").unwrap();
    assert!(go.contains("WithExec([]string{\"sh\", \"-c\", `echo hello world`})\n}"));
    assert!(!go.contains("Expand"));
}

#[test]
fn test_one_method_per_target_in_order() {
    let go = translate(
        "c:\n    FROM alpine\n\
         a:\n    FROM alpine\n\
         b:\n    FROM alpine\n",
    )
    .unwrap();

    let positions: Vec<usize> = ["C()", "A()", "B()"]
        .iter()
        .map(|method| go.find(&format!("func (m *MyModule) {method}")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_args_stay_out_of_the_environment() {
    let go = translate(
        "t:\n    \
             ARG MODE=fast\n    \
             ARG TARGET\n    \
             FROM alpine\n    \
             RUN make $TARGET\n",
    )
    .unwrap();

    assert!(!go.contains("WithEnvVariable(\"MODE\""));
    assert!(go.contains(
        "\t\tWithEnvVariable(\"TARGET\", target).\n\
         \t\tFrom(\"alpine\").\n"
    ));
}

#[test]
fn test_escaped_dollar_in_env_value() {
    let go = translate("t:\n    FROM alpine\n    ENV A=\"\\$HOME\"\n    RUN echo \\$HOME\n").unwrap();

    assert!(go.contains("WithEnvVariable(\"A\", \"$HOME\")"));
    assert!(go.contains("`echo \\$HOME`})"));
    assert!(!go.contains("Expand"));
}

#[test]
fn test_workdir_expands_variables() {
    let go = translate("t:\n    FROM alpine\n    ENV APP=web\n    WORKDIR /src/$APP\n").unwrap();
    assert!(go.contains(
        "WithWorkdir(\"/src/$APP\", dagger.ContainerWithWorkdirOpts{Expand: true})"
    ));
}

#[test]
fn test_variable_user_is_rejected() {
    assert_eq!(
        error_code("t:\n    FROM alpine\n    ARG U=app\n    USER $U\n"),
        ErrorCode::E103
    );
}

#[test]
fn test_missing_base_image_is_rejected() {
    // A target with a command but no FROM.
    assert_eq!(
        error_code("build:\n    RUN echo \"Hello, World\"\ntest:\n    FROM alpine\n"),
        ErrorCode::E202
    );
}

#[test]
fn test_duplicate_base_image_is_rejected() {
    assert_eq!(
        error_code("t:\n    FROM alpine\n    FROM ubuntu\n"),
        ErrorCode::E201
    );
}

#[test]
fn test_cycle_is_rejected() {
    let err = translate("a:\n    FROM alpine\n    BUILD +b\nb:\n    FROM alpine\n    BUILD +a\n")
        .unwrap_err();
    let TranslateError::Parse { err, src } = &err else {
        panic!("Expected a parse error, got {err:?}");
    };
    let diagnostic = &err.diagnostics()[0];
    assert_eq!(diagnostic.code(), Some(ErrorCode::E203));
    assert_eq!(diagnostic.message(), "cyclic dependency: a -> b -> a");
    assert!(src.starts_with("a:"));
}

#[test]
fn test_undeclared_variable_is_rejected() {
    assert_eq!(
        error_code("t:\n    FROM alpine\n    RUN echo $NAME\n"),
        ErrorCode::E200
    );
}

#[test]
fn test_lexer_error_keeps_source() {
    let source = "t:\n    FROM alpine\n    ENV A=\"open\n";
    let err = translate(source).unwrap_err();
    let TranslateError::Parse { err, src } = err else {
        panic!("Expected a parse error");
    };
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E001));
    assert_eq!(src, source);
}

#[test]
fn test_custom_codegen_config() {
    let config = AppConfig::new(
        CodegenConfig::new(vec!["bash".to_string(), "-c".to_string()], "/out", "/deps"),
        FormatConfig::default(),
    );
    let translator = Translator::new(config);

    let go = translator
        .translate(
            "a:\n    FROM alpine\n    RUN make\n    SAVE ARTIFACT bin/app\n    SAVE ARTIFACT dist/ out\n\
             b:\n    FROM alpine\n    BUILD +a\n",
            &ModuleSpec::new("ci", "main"),
        )
        .unwrap();

    assert!(go.contains("import \"dagger/ci/internal/dagger\""));
    assert!(go.contains("func (m *Ci) A() *dagger.Container {"));
    assert!(go.contains("[]string{\"bash\", \"-c\", `make`}"));
    assert!(go.contains("With(saveArtifact(\"bin/app\", \"app\"))"));
    assert!(go.contains("With(saveDirectory(\"dist/\", \"out\"))"));
    assert!(go.contains("ctr.WithFile(\"/out/\"+dest, ctr.File(src))"));
    assert!(go.contains("ctr.WithDirectory(\"/out/\"+dest, ctr.Directory(src))"));
    assert!(go.contains("ctr.WithMountedDirectory(\"/deps/\"+name, dep.Rootfs())"));
}

#[test]
fn test_translator_reusability() {
    let translator = Translator::default();

    let first = translator.parse("a:\n    FROM alpine\n").unwrap();
    let second = translator.parse("b:\n    FROM ubuntu\n").unwrap();

    let go_first = translator.generate(&first, &spec());
    let go_second = translator.generate(&second, &spec());
    assert!(go_first.contains("func (m *MyModule) A()"));
    assert!(go_second.contains("From(\"ubuntu\")"));
}

#[cfg(unix)]
#[test]
fn test_formatter_is_applied() {
    let translator = Translator::new(AppConfig::default().with_format_command(vec![
        "sed".to_string(),
        "s/^package main$/package formatted/".to_string(),
    ]));

    let go = translator
        .translate("t:\n    FROM alpine\n", &spec())
        .unwrap();
    assert!(go.starts_with("package formatted\n"));
}

#[cfg(unix)]
#[test]
fn test_formatter_failure() {
    let translator =
        Translator::new(AppConfig::default().with_format_command(vec!["false".to_string()]));

    let err = translator
        .translate("t:\n    FROM alpine\n", &spec())
        .unwrap_err();
    assert!(matches!(err, TranslateError::Format(_)));
}
