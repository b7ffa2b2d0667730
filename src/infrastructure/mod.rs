//! Infrastructure layer with external service adapters.

/// Item catalog client.
pub mod catalog;
/// Application configuration.
pub mod config;
/// Image handling (caching, loading, downloading).
pub mod image;

pub use catalog::HttpCatalogClient;
pub use config::{AppConfig, CacheSettings, CliArgs, Command, ConfigStorage, LogLevel};
pub use self::image::{
    CacheStats, DiskImageCache, HttpImageFetcher, ImageLoader, ImageLoaderConfig, MemoryImageCache,
};
