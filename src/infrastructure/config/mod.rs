//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{AppConfig, CacheSettings, DEFAULT_ENDPOINT, LogLevel};
pub use args::{CliArgs, Command};
pub use storage::{ConfigError, ConfigStorage};
