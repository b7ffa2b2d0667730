//! Configuration file location and loading.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

use super::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, AppConfig};

const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_FILE_HEADER: &str = "# thumbwell configuration\n\n";

/// Errors raised while locating or materializing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no configuration directory.
    #[error("no platform configuration directory")]
    ConfigDirNotFound,
    /// The file or its directory could not be accessed.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The default configuration could not be rendered as TOML.
    #[error("cannot serialize default configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Locates `config.toml` and turns it into an [`AppConfig`].
pub struct ConfigStorage {
    config_dir: PathBuf,
}

impl ConfigStorage {
    /// Uses the platform configuration directory.
    ///
    /// # Errors
    /// Returns `ConfigError::ConfigDirNotFound` if the platform has none.
    pub fn new() -> Result<Self, ConfigError> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| Self::with_dir(dirs.config_dir().to_path_buf()))
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Uses `config_dir` instead of the platform directory.
    #[must_use]
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// The file read by [`Self::load_config`].
    #[must_use]
    pub fn config_path(&self, path_override: Option<&Path>) -> PathBuf {
        path_override.map_or_else(|| self.config_dir.join(CONFIG_FILE_NAME), Path::to_path_buf)
    }

    /// Loads the configuration.
    ///
    /// A missing file is written out with defaults so it can be edited. A
    /// file that does not parse is left alone and defaults are used.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read, or the default
    /// file cannot be written.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let path = self.config_path(path_override);

        match fs::read_to_string(&path) {
            Ok(content) => Ok(parse_or_default(&path, &content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "Writing default configuration");
                let config = AppConfig::default();
                write_config(&path, &config)?;
                Ok(config)
            }
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }
}

fn parse_or_default(path: &Path, content: &str) -> AppConfig {
    toml::from_str(content).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Ignoring malformed configuration file");
        AppConfig::default()
    })
}

/// Writes `config` through a temporary file in the target directory.
fn write_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let body = format!("{DEFAULT_FILE_HEADER}{}", toml::to_string_pretty(config)?);
    fs::create_dir_all(dir).map_err(io_error)?;
    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(body.as_bytes()).map_err(io_error)?;
    file.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}
