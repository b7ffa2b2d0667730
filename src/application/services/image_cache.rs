//! Public image cache entry point.

use std::sync::Arc;

use tracing::info;

use crate::domain::entities::LoadedImage;
use crate::domain::errors::CacheResult;
use crate::infrastructure::config::CacheSettings;
use crate::infrastructure::image::{CacheStats, DiskImageCache, ImageLoader};

/// Image cache shared by every consumer in the process.
///
/// Create one at startup and clone the handle; clones share all state.
/// Neither operation ever fails: a missing image is `None` and the reason
/// is logged.
#[derive(Debug, Clone)]
pub struct ImageCache {
    loader: ImageLoader,
}

impl ImageCache {
    /// Wraps an existing loader.
    #[must_use]
    pub const fn new(loader: ImageLoader) -> Self {
        Self { loader }
    }

    /// Opens the disk cache and builds an HTTP backed loader.
    ///
    /// # Errors
    /// Returns error if the cache directory cannot be resolved or created, or
    /// the HTTP client cannot be built.
    pub async fn open(settings: &CacheSettings) -> CacheResult<Self> {
        let disk_cache = match &settings.directory {
            Some(dir) => DiskImageCache::new(dir.clone()).await?,
            None => DiskImageCache::default_location().await?,
        };
        info!(path = %disk_cache.dir().display(), capacity = settings.memory_capacity, "Image cache ready");

        let loader = ImageLoader::with_http(&settings.loader_config(), Arc::new(disk_cache))?;
        Ok(Self::new(loader))
    }

    /// Loads the image at `url` from memory, disk or network.
    pub async fn load_image(&self, url: &str) -> Option<LoadedImage> {
        self.loader.load(url).await
    }

    /// Empties the memory and disk caches.
    pub async fn clear(&self) {
        self.loader.clear_all().await;
    }

    /// Returns memory cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.loader.memory_cache_stats()
    }

    /// Returns the underlying loader.
    #[must_use]
    pub const fn loader(&self) -> &ImageLoader {
        &self.loader
    }
}
