//! earthly2dagger - Translate Earthfiles into Dagger Go modules.
//!
//! Parsing, resolution and Go code generation for Earthfiles. Every target
//! of an Earthfile becomes a method on the generated module struct that
//! returns a `*dagger.Container`.

pub mod config;
pub mod format;

mod codegen;
mod emit;
mod error;

pub use earthly2dagger_core::{identifier, semantic};

pub use emit::ModuleSpec;
pub use error::TranslateError;

use log::{debug, info, trace};

use config::AppConfig;
use format::{CommandFormatter, Formatter};

/// Builder for translating Earthfiles.
///
/// This provides an API for running Earthfiles through the parsing,
/// generation and formatting stages.
///
/// # Examples
///
/// ```
/// use earthly2dagger::{ModuleSpec, Translator, config::AppConfig};
///
/// let source = "test:\n    FROM alpine\n    RUN echo hello world\n";
///
/// let translator = Translator::new(AppConfig::default());
///
/// // Parse source to semantic model
/// let document = translator.parse(source).expect("Failed to parse");
///
/// // Generate Go source
/// let spec = ModuleSpec::new("my-module", "main");
/// let go = translator.generate(&document, &spec);
/// assert!(go.contains("func (m *MyModule) Test() *dagger.Container {"));
/// ```
#[derive(Debug, Default)]
pub struct Translator {
    config: AppConfig,
}

impl Translator {
    /// Create a new translator with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Code generation and formatter settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse Earthfile source into the resolved semantic model.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::Parse` carrying the diagnostics and the
    /// source for syntax and resolution errors.
    pub fn parse(&self, source: &str) -> Result<semantic::Document, TranslateError> {
        info!("Parsing Earthfile");

        let document = earthly2dagger_parser::parse(source)
            .map_err(|err| TranslateError::new_parse_error(err, source))?;

        debug!(targets = document.len(); "Earthfile parsed successfully");
        trace!(document:?; "Parsed document");

        Ok(document)
    }

    /// Generate unformatted Go source for a resolved document.
    pub fn generate(&self, document: &semantic::Document, spec: &ModuleSpec) -> String {
        info!(module = spec.module(), package = spec.package(); "Generating Go source");

        let codegen = self.config.codegen();
        let module = codegen::Generator::new(codegen, document).generate();
        let source = emit::Emitter::new(spec, codegen).emit(&module);

        debug!(bytes = source.len(); "Go source generated");
        source
    }

    /// Run Go source through the configured formatter, if any.
    ///
    /// # Errors
    ///
    /// Returns `TranslateError::Format` if the formatter cannot be run or
    /// rejects the source.
    pub fn format(&self, source: String) -> Result<String, TranslateError> {
        match self.config.format().command().and_then(CommandFormatter::new) {
            Some(formatter) => Ok(formatter.format(&source)?),
            None => {
                debug!("No formatter configured");
                Ok(source)
            }
        }
    }

    /// Parse, generate and format in one step.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`parse`](Self::parse) or
    /// [`format`](Self::format). Nothing is returned on failure.
    pub fn translate(&self, source: &str, spec: &ModuleSpec) -> Result<String, TranslateError> {
        let document = self.parse(source)?;
        let go = self.generate(&document, spec);
        self.format(go)
    }
}
