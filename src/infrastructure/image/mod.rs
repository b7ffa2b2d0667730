//! Image handling infrastructure.
//!
//! This module provides:
//! - Memory caching with LRU eviction
//! - Disk caching for persistence
//! - HTTP download transport
//! - Async loading with per-URL request coalescing

pub mod disk_cache;
pub mod http_fetcher;
pub mod loader;
pub mod memory_cache;

pub use disk_cache::{DiskImageCache, default_cache_dir};
pub use http_fetcher::HttpImageFetcher;
pub use loader::{ImageLoader, ImageLoaderConfig};
pub use memory_cache::{CacheStats, MemoryImageCache};
