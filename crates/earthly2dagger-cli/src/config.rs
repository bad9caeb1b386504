//! Configuration file loading for the CLI
//!
//! This module finds and loads the TOML configuration file from an explicit
//! path, the working directory, or the platform configuration directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use earthly2dagger::{TranslateError, config::AppConfig};

/// Location of the project-local configuration file.
const LOCAL_CONFIG: &str = "earthly2dagger/config.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for TranslateError {
    fn from(err: ConfigError) -> Self {
        TranslateError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (`earthly2dagger/config.toml`)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns `TranslateError::Config` if an explicit path does not exist or
/// a config file cannot be parsed, and `TranslateError::Io` if it cannot
/// be read.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, TranslateError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new(LOCAL_CONFIG);
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "earthly2dagger", "earthly2dagger") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, TranslateError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_explicit_path() {
        let file = config_file(
            "[codegen]\nshell = [\"bash\", \"-c\"]\n\n[format]\ncommand = [\"gofmt\"]\n",
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.codegen().shell(), ["bash", "-c"]);
        assert_eq!(config.codegen().artifact_dir(), "/artifacts");
        assert_eq!(config.format().command(), Some(&["gofmt".to_string()][..]));
    }

    #[test]
    fn test_missing_explicit_path() {
        let err = load_config(Some("/nonexistent/earthly2dagger.toml")).unwrap_err();
        assert!(matches!(
            &err,
            TranslateError::Config(message) if message.starts_with("Missing configuration file")
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let file = config_file("[codegen]\nshell = \"bash\"\n");

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(
            &err,
            TranslateError::Config(message) if message.starts_with("Failed to parse TOML")
        ));
    }
}
