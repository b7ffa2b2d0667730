//! Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use crate::domain::entities::ImageVariant;
use crate::infrastructure::image::ImageLoaderConfig;
use crate::infrastructure::image::http_fetcher::DEFAULT_TIMEOUT_SECS;
use crate::infrastructure::image::memory_cache::DEFAULT_CACHE_SIZE;

pub(super) const APP_NAME: &str = "thumbwell";
pub(super) const APP_QUALIFIER: &str = "com";
pub(super) const APP_ORGANIZATION: &str = "linuxmobile";

/// Catalog served when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://d3jbb8n5wk0qxi.cloudfront.net/recipes.json";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Catalog endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Which image URL to use for thumbnails.
    #[serde(default)]
    pub image_variant: ImageVariant,

    /// Image cache configuration.
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Image cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Maximum number of decoded images kept in memory.
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,

    /// Disk cache directory. Defaults to the platform cache location.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Network request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl CacheSettings {
    /// Returns the loader configuration for these settings.
    #[must_use]
    pub fn loader_config(&self) -> ImageLoaderConfig {
        ImageLoaderConfig {
            memory_cache_size: self.memory_capacity,
            timeout_secs: self.request_timeout_secs,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            memory_capacity: default_memory_capacity(),
            directory: None,
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

const fn default_memory_capacity() -> usize {
    DEFAULT_CACHE_SIZE
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(endpoint) = &args.endpoint {
            self.endpoint.clone_from(endpoint);
        }
        if let Some(variant) = args.variant {
            self.image_variant = variant;
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.cache.directory = Some(cache_dir.clone());
        }
        if let Some(capacity) = args.memory_capacity {
            self.cache.memory_capacity = capacity;
        }
        if let Some(timeout) = args.timeout_secs {
            self.cache.request_timeout_secs = timeout;
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            endpoint: default_endpoint(),
            image_variant: ImageVariant::default(),
            cache: CacheSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_config_file() {
        let toml_content = r#"
            endpoint = "https://example.com/items.json"
            log_level = "debug"
            image_variant = "large"

            [cache]
            memory_capacity = 12
            directory = "/tmp/thumbs"
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.endpoint, "https://example.com/items.json");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.image_variant, ImageVariant::Large);
        assert_eq!(config.cache.memory_capacity, 12);
        assert_eq!(config.cache.directory, Some(PathBuf::from("/tmp/thumbs")));
        assert_eq!(config.cache.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.cache.memory_capacity, DEFAULT_CACHE_SIZE);
        assert!(config.cache.directory.is_none());
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.cache, CacheSettings::default());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config: AppConfig = toml::from_str("endpoint = \"https://a/items.json\"").unwrap();
        let args = CliArgs::parse_from([
            "thumbwell",
            "--endpoint",
            "https://b/items.json",
            "--memory-capacity",
            "3",
            "--variant",
            "large",
        ]);

        config.merge_with_args(&args);

        assert_eq!(config.endpoint, "https://b/items.json");
        assert_eq!(config.cache.memory_capacity, 3);
        assert_eq!(config.image_variant, ImageVariant::Large);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_loader_config() {
        let settings = CacheSettings {
            memory_capacity: 7,
            directory: None,
            request_timeout_secs: 2,
        };
        let loader = settings.loader_config();
        assert_eq!(loader.memory_cache_size, 7);
        assert_eq!(loader.timeout_secs, 2);
    }
}
