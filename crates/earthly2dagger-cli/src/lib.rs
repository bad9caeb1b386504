//! CLI logic for the Earthfile to Dagger translator.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, io::Write};

use log::info;

use earthly2dagger::{ModuleSpec, TranslateError, Translator};

/// Run the translator on the file named in `args`.
///
/// The Go source is written to `args.output`, or to stdout when no output
/// path is given. Nothing is written if any stage fails.
///
/// # Errors
///
/// Returns `TranslateError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parse and resolution errors
/// - Formatter errors
pub fn run(args: &Args) -> Result<(), TranslateError> {
    info!(
        input_path = args.input.display().to_string(),
        module = args.module;
        "Translating Earthfile"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(command) = args.formatter_command() {
        app_config = app_config.with_format_command(command);
    }

    let source = fs::read_to_string(&args.input)?;

    let translator = Translator::new(app_config);
    let go = translator.translate(&source, &ModuleSpec::new(&args.module, &args.package))?;

    match &args.output {
        Some(path) => {
            fs::write(path, go)?;
            info!(output_file = path.display().to_string(); "Go module written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(go.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
