//! Command-line argument definitions.
//!
//! [`Args`] is parsed with [`clap`]. The Earthfile path and the Dagger module
//! name are required; output goes to stdout unless `--output` is given.

use std::path::PathBuf;

use clap::Parser;

/// Translate an Earthfile into a Dagger Go module
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input Earthfile
    pub input: PathBuf,

    /// Dagger module name, used for the import path and the struct name
    pub module: String,

    /// Go package name of the generated file
    #[arg(default_value = "main")]
    pub package: String,

    /// Path to the output Go file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Formatter command the generated source is piped through, e.g. "gofmt"
    #[arg(long)]
    pub formatter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// The `--formatter` override split into program and arguments.
    pub fn formatter_command(&self) -> Option<Vec<String>> {
        self.formatter
            .as_deref()
            .map(|command| command.split_whitespace().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = Args::parse_from(["earthly2dagger", "Earthfile", "my-module"]);
        assert_eq!(args.input, PathBuf::from("Earthfile"));
        assert_eq!(args.module, "my-module");
        assert_eq!(args.package, "main");
        assert!(args.output.is_none());
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn test_formatter_command() {
        let args = Args::parse_from([
            "earthly2dagger",
            "Earthfile",
            "ci",
            "dagger",
            "--formatter",
            "gofmt -s",
            "-o",
            "main.go",
        ]);
        assert_eq!(args.package, "dagger");
        assert_eq!(args.output, Some(PathBuf::from("main.go")));
        assert_eq!(
            args.formatter_command(),
            Some(vec!["gofmt".to_string(), "-s".to_string()])
        );
    }

    #[test]
    fn test_module_is_required() {
        assert!(Args::try_parse_from(["earthly2dagger", "Earthfile"]).is_err());
    }
}
