//! Identifier conventions of the generated Go code.
//!
//! Earthfile names (`test-expose-port`, `MULTI_WORD`) are split into words
//! at every character that is not an ASCII letter or digit. Words written
//! entirely in upper case are treated as shouting and folded to lower case
//! before capitalization, so `MULTI_WORD` and `multi-word` map to the same
//! Go identifier.

/// Go keywords, plus identifiers the generated method bodies refer to and
/// that a parameter must not shadow.
const RESERVED: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "dag",
    "dagger",
    "default",
    "defer",
    "dependsOn",
    "else",
    "fallthrough",
    "false",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "int",
    "interface",
    "m",
    "map",
    "nil",
    "package",
    "range",
    "return",
    "saveArtifact",
    "saveDirectory",
    "select",
    "string",
    "struct",
    "switch",
    "true",
    "type",
    "var",
];

fn words(name: &str) -> impl Iterator<Item = &str> {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
}

fn is_shouting(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_uppercase()) && !word.chars().any(|c| c.is_ascii_lowercase())
}

fn capitalize(word: &str) -> String {
    let folded = if is_shouting(word) {
        word.to_ascii_lowercase()
    } else {
        word.to_string()
    };
    let mut chars = folded.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn decapitalize(word: &str) -> String {
    if is_shouting(word) {
        return word.to_ascii_lowercase();
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Exported Go name for a target or module name: `test-expose-port` → `TestExposePort`.
///
/// Names that would start with a digit are prefixed with `X`.
pub fn pascal_case(name: &str) -> String {
    let ident: String = words(name).map(capitalize).collect();
    match ident.chars().next() {
        None => "X".to_string(),
        Some(c) if c.is_ascii_digit() => format!("X{ident}"),
        Some(_) => ident,
    }
}

/// Go parameter identifier for a build argument: `MULTI_WORD` → `multiWord`.
///
/// Keywords and names bound by the generated code get a trailing `_`.
pub fn param_name(name: &str) -> String {
    let mut parts = words(name);
    let Some(first) = parts.next() else {
        return "arg".to_string();
    };

    let mut ident = decapitalize(first);
    ident.extend(parts.map(capitalize));

    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if RESERVED.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("test"), "Test");
        assert_eq!(pascal_case("test-expose-port"), "TestExposePort");
        assert_eq!(pascal_case("args-long-name"), "ArgsLongName");
        assert_eq!(pascal_case("my-module"), "MyModule");
        assert_eq!(pascal_case("build.linux_amd64"), "BuildLinuxAmd64");
        assert_eq!(pascal_case("fooBar"), "FooBar");
        assert_eq!(pascal_case("CI"), "Ci");
        assert_eq!(pascal_case("2fa"), "X2fa");
        assert_eq!(pascal_case("--"), "X");
    }

    #[test]
    fn test_param_name() {
        assert_eq!(param_name("name"), "name");
        assert_eq!(param_name("TAG"), "tag");
        assert_eq!(param_name("MULTI_WORD"), "multiWord");
        assert_eq!(param_name("fooBar"), "fooBar");
        assert_eq!(param_name("GoVersion"), "goVersion");
        assert_eq!(param_name("_private"), "private");
        assert_eq!(param_name("_"), "arg");
    }

    #[test]
    fn test_param_name_reserved() {
        assert_eq!(param_name("type"), "type_");
        assert_eq!(param_name("TYPE"), "type_");
        assert_eq!(param_name("m"), "m_");
        assert_eq!(param_name("dag"), "dag_");
        assert_eq!(param_name("STRING"), "string_");
        assert_eq!(param_name("saveArtifact"), "saveArtifact_");
        assert_eq!(param_name("SAVE_DIRECTORY"), "saveDirectory_");
        assert_eq!(param_name("version"), "version");
    }

    proptest! {
        #[test]
        fn prop_param_name_is_go_identifier(name in "[A-Za-z_][A-Za-z0-9_]{0,16}") {
            let ident = param_name(&name);
            let mut chars = ident.chars();
            let first = chars.next().unwrap();
            prop_assert!(first.is_ascii_alphabetic() || first == '_');
            prop_assert!(chars.all(|c| c.is_ascii_alphanumeric() || c == '_'));
            prop_assert!(!RESERVED.contains(&ident.as_str()));
        }

        #[test]
        fn prop_pascal_case_is_exported(name in "[a-z][a-zA-Z0-9._-]{0,16}") {
            let ident = pascal_case(&name);
            prop_assert!(ident.starts_with(|c: char| c.is_ascii_uppercase()));
            prop_assert!(ident.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
