//! Disk-based image cache for persistence across sessions.
//!
//! One file per URL, named by its [`CacheKey`], holding the raw fetched bytes.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, trace, warn};

use crate::domain::entities::CacheKey;
use crate::domain::errors::{CacheError, CacheResult};

const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "linuxmobile";
const APP_NAME: &str = "thumbwell";

/// Suffix for blobs that are still being written.
const PARTIAL_SUFFIX: &str = "part";

/// Disk-based image cache that persists raw image bytes.
#[derive(Debug)]
pub struct DiskImageCache {
    cache_dir: PathBuf,
}

impl DiskImageCache {
    /// Creates a new disk cache in the specified directory.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be created.
    pub async fn new(cache_dir: PathBuf) -> CacheResult<Self> {
        fs::create_dir_all(&cache_dir)
            .await
            .map_err(|e| CacheError::io(format!("Failed to create cache dir: {e}")))?;

        debug!(path = %cache_dir.display(), "Opened disk image cache");
        Ok(Self { cache_dir })
    }

    /// Creates a cache in the platform cache location (e.g. `~/.cache/thumbwell/images/`).
    ///
    /// # Errors
    /// Returns error if the platform cache location is unavailable or the
    /// directory cannot be created.
    pub async fn default_location() -> CacheResult<Self> {
        let cache_dir = default_cache_dir().ok_or(CacheError::CacheDirUnavailable)?;
        Self::new(cache_dir).await
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path for a cached blob.
    #[must_use]
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(key.as_str())
    }

    /// Reads a cached blob.
    ///
    /// Missing, unreadable and empty files are all reported as a miss.
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => {
                warn!(key = %key, "Ignoring empty disk cache entry");
                None
            }
            Ok(bytes) => {
                trace!(key = %key, size = bytes.len(), "Disk cache hit");
                Some(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!(key = %key, "Disk cache miss");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read disk cache entry");
                None
            }
        }
    }

    /// Stores a blob, logging and swallowing any failure.
    ///
    /// Returns whether the blob was written.
    pub async fn put(&self, key: &CacheKey, bytes: &[u8]) -> bool {
        match self.try_put(key, bytes).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to cache to disk");
                false
            }
        }
    }

    /// Stores a blob.
    ///
    /// The bytes go to a sibling partial file first and are renamed into
    /// place, so a concurrent reader never sees a truncated blob.
    ///
    /// # Errors
    /// Returns error if the file cannot be written or renamed.
    async fn try_put(&self, key: &CacheKey, bytes: &[u8]) -> CacheResult<()> {
        let path = self.path_for(key);
        let partial = path.with_extension(PARTIAL_SUFFIX);

        fs::write(&partial, bytes)
            .await
            .map_err(|e| CacheError::io(format!("Failed to write cache file: {e}")))?;

        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(CacheError::io(format!("Failed to move cache file: {e}")));
        }

        debug!(key = %key, path = %path.display(), size = bytes.len(), "Stored image in disk cache");
        Ok(())
    }

    /// Checks if a blob is cached.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        fs::try_exists(self.path_for(key)).await.unwrap_or(false)
    }

    /// Deletes every file in the cache directory.
    ///
    /// Individual failures are logged and skipped. Returns the number of
    /// files removed.
    pub async fn clear(&self) -> usize {
        let mut entries = match fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(error = %e, "Failed to read cache dir");
                }
                return 0;
            }
        };

        let mut removed = 0usize;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read cache dir entry");
                    break;
                }
            };

            let path = entry.path();
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if !is_file {
                continue;
            }

            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove cache file"),
            }
        }

        debug!(removed, "Cleared disk cache");
        removed
    }

    /// Returns the number of cached blobs.
    pub async fn len(&self) -> usize {
        let Ok(mut entries) = fs::read_dir(&self.cache_dir).await else {
            return 0;
        };

        let mut count = 0usize;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != PARTIAL_SUFFIX)
                && entry.file_type().await.is_ok_and(|t| t.is_file())
            {
                count += 1;
            }
        }
        count
    }

    /// Returns true if the cache holds no blobs.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Returns the default cache directory path, if the platform has one.
#[must_use]
pub fn default_cache_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
        .map(|dirs| dirs.cache_dir().join("images"))
}
