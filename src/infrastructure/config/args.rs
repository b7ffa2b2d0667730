use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::app_config::LogLevel;
use crate::domain::entities::ImageVariant;

#[derive(Debug, Parser)]
#[command(
    name = "thumbwell",
    version,
    about = "Browse a remote item catalog with cached thumbnails",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Catalog endpoint URL.
    #[arg(long, value_name = "URL", env = "THUMBWELL_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Disk cache directory.
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Maximum number of decoded images kept in memory.
    #[arg(long, value_name = "COUNT")]
    pub memory_capacity: Option<usize>,

    /// Network request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Which image URL to use for thumbnails.
    #[arg(long, value_enum)]
    pub variant: Option<ImageVariant>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List items with their thumbnails (default).
    List {
        /// Only show items in this category ("All" shows everything).
        #[arg(long)]
        category: Option<String>,
    },
    /// List the categories present in the catalog.
    Categories,
    /// Delete every cached image.
    Clear,
}

impl CliArgs {
    /// Returns the selected command, defaulting to an unfiltered listing.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::List { category: None })
    }
}
