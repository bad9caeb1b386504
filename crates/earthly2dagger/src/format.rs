//! Formatting of generated Go source.
//!
//! This module provides the [`Formatter`] trait for post-processing emitted
//! source, and [`CommandFormatter`], which pipes the source through an
//! external program such as `gofmt`. It is the last, optional stage of the
//! translation pipeline.
//!
//! # Error Handling
//!
//! Formatting returns [`Error`]. A formatter that cannot be started or that
//! exits unsuccessfully is reported with its stderr as is; it is never
//! retried. [`Error`] converts into [`TranslateError::Format`] at the crate
//! boundary.
//!
//! [`TranslateError::Format`]: crate::TranslateError::Format

use std::{
    io::{self, Write},
    process::{Command, Stdio},
};

use log::{debug, info};

/// Abstraction for source formatters.
pub trait Formatter {
    /// Formats Go source text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the formatter cannot be run, or
    /// [`Error::Failed`] if it rejects the source.
    fn format(&self, source: &str) -> Result<String, Error>;
}

/// Errors that can occur while formatting.
#[derive(Debug)]
pub enum Error {
    /// The formatter process could not be started or talked to.
    Spawn { program: String, source: io::Error },
    /// The formatter ran and exited unsuccessfully.
    Failed { program: String, stderr: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn { program, source } => write!(f, "cannot run `{program}`: {source}"),
            Self::Failed { program, stderr } => {
                write!(f, "`{program}` failed")?;
                let stderr = stderr.trim_end();
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Failed { .. } => None,
        }
    }
}

/// Runs an external command with the source on stdin and reads the
/// formatted source from stdout.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    /// Create a formatter from a command line split into words.
    ///
    /// Returns `None` for an empty command.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn spawn_error(&self, source: io::Error) -> Error {
        Error::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, source: &str) -> Result<String, Error> {
        info!(program = self.program.as_str(); "Running formatter");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.spawn_error(err))?;

        // stdin is written concurrently with draining stdout and stderr.
        let stdin = child.stdin.take();
        let input = source.to_owned();
        let writer = std::thread::spawn(move || -> io::Result<()> {
            match stdin {
                Some(mut stdin) => stdin.write_all(input.as_bytes()),
                None => Ok(()),
            }
        });

        let output = child
            .wait_with_output()
            .map_err(|err| self.spawn_error(err))?;
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));

        if !output.status.success() {
            return Err(Error::Failed {
                program: self.program.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        written.map_err(|err| self.spawn_error(err))?;

        let formatted = String::from_utf8(output.stdout).map_err(|err| Error::Failed {
            program: self.program.clone(),
            stderr: format!("output is not UTF-8: {err}"),
        })?;
        debug!(bytes = formatted.len(); "Formatter finished");
        Ok(formatted)
    }
}
