//! Configuration types for Earthfile translation.
//!
//! This module provides configuration structures that control the generated
//! Go code and the optional formatting step. All types implement
//! [`serde::Deserialize`] for loading from external sources, and every field
//! has a default so that partial files are accepted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`CodegenConfig`] - Paths and the shell used by generated methods.
//! - [`FormatConfig`] - External formatter command.
//!
//! # Example
//!
//! ```
//! # use earthly2dagger::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.codegen().shell(), ["sh", "-c"]);
//! assert!(config.format().command().is_none());
//! ```

use serde::Deserialize;

/// Top-level application configuration.
///
/// Groups [`CodegenConfig`] and [`FormatConfig`] into a single configuration
/// root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Code generation section.
    #[serde(default)]
    codegen: CodegenConfig,

    /// Formatter section.
    #[serde(default)]
    format: FormatConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(codegen: CodegenConfig, format: FormatConfig) -> Self {
        Self { codegen, format }
    }

    /// Returns the code generation configuration.
    pub fn codegen(&self) -> &CodegenConfig {
        &self.codegen
    }

    /// Returns the formatter configuration.
    pub fn format(&self) -> &FormatConfig {
        &self.format
    }

    /// Replace the formatter command, as done by a command line override.
    pub fn with_format_command(mut self, command: Vec<String>) -> Self {
        self.format.command = Some(command);
        self
    }
}

/// Settings that shape the generated Go code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Program and flags that shell-form commands are passed to.
    shell: Vec<String>,

    /// Directory in the container where `SAVE ARTIFACT` copies files.
    artifact_dir: String,

    /// Directory in the container where `BUILD` dependencies are mounted.
    dependency_dir: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            shell: vec!["sh".to_string(), "-c".to_string()],
            artifact_dir: "/artifacts".to_string(),
            dependency_dir: "/run/earthly2dagger/deps".to_string(),
        }
    }
}

impl CodegenConfig {
    /// Creates a new [`CodegenConfig`].
    ///
    /// # Arguments
    ///
    /// * `shell` - Shell invocation prepended to shell-form commands.
    /// * `artifact_dir` - Artifact root in the container.
    /// * `dependency_dir` - Mount root for dependencies in the container.
    pub fn new(
        shell: Vec<String>,
        artifact_dir: impl Into<String>,
        dependency_dir: impl Into<String>,
    ) -> Self {
        Self {
            shell,
            artifact_dir: artifact_dir.into(),
            dependency_dir: dependency_dir.into(),
        }
    }

    pub fn shell(&self) -> &[String] {
        &self.shell
    }

    /// Artifact root, without a trailing `/`.
    pub fn artifact_dir(&self) -> &str {
        trim_dir(&self.artifact_dir)
    }

    /// Dependency mount root, without a trailing `/`.
    pub fn dependency_dir(&self) -> &str {
        trim_dir(&self.dependency_dir)
    }
}

fn trim_dir(dir: &str) -> &str {
    match dir.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// External formatter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatConfig {
    /// Program and arguments; Go source is written to its stdin.
    #[serde(default)]
    command: Option<Vec<String>>,
}

impl FormatConfig {
    /// Returns the formatter command, or `None` when output is left as generated.
    pub fn command(&self) -> Option<&[String]> {
        self.command.as_deref().filter(|command| !command.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config: AppConfig = toml::from_str(
            r#"
            [codegen]
            artifact_dir = "/out/"
            "#,
        )
        .unwrap();

        assert_eq!(config.codegen().artifact_dir(), "/out");
        assert_eq!(config.codegen().shell(), ["sh", "-c"]);
        assert_eq!(config.codegen().dependency_dir(), "/run/earthly2dagger/deps");
        assert!(config.format().command().is_none());
    }

    #[test]
    fn test_full_config() {
        let config: AppConfig = toml::from_str(
            r#"
            [codegen]
            shell = ["bash", "-euc"]
            artifact_dir = "/artifacts"
            dependency_dir = "/deps"

            [format]
            command = ["gofmt"]
            "#,
        )
        .unwrap();

        assert_eq!(config.codegen().shell(), ["bash", "-euc"]);
        assert_eq!(config.codegen().dependency_dir(), "/deps");
        assert_eq!(config.format().command(), Some(&["gofmt".to_string()][..]));
    }

    #[test]
    fn test_empty_formatter_command_is_disabled() {
        let config: AppConfig = toml::from_str("[format]\ncommand = []\n").unwrap();
        assert!(config.format().command().is_none());
    }

    #[test]
    fn test_root_dir() {
        let config = CodegenConfig::new(vec![], "/", "//");
        assert_eq!(config.artifact_dir(), "/");
        assert_eq!(config.dependency_dir(), "/");
    }

    #[test]
    fn test_format_override() {
        let config = AppConfig::default().with_format_command(vec!["goimports".to_string()]);
        assert_eq!(config.format().command(), Some(&["goimports".to_string()][..]));
    }
}
