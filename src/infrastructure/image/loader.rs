//! Async image loading orchestrator.
//!
//! Implements a three-tier cache: Memory -> Disk -> Network, with at most one
//! outstanding disk/network resolution per URL. Concurrent callers for the
//! same URL attach to the running load and all observe its single outcome.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tokio::sync::{RwLock, oneshot};
use tracing::{debug, info, trace, warn};

use crate::domain::entities::{CacheKey, ImageSource, LoadedImage};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::ImageFetchPort;

use super::disk_cache::DiskImageCache;
use super::http_fetcher::{DEFAULT_TIMEOUT_SECS, HttpImageFetcher};
use super::memory_cache::{CacheStats, DEFAULT_CACHE_SIZE, MemoryImageCache};

type FlightOutcome = Option<(Arc<image::DynamicImage>, ImageSource)>;
type Flight = Shared<BoxFuture<'static, FlightOutcome>>;
type FlightMap = Arc<Mutex<HashMap<String, Flight>>>;

/// Configuration for the image loader.
#[derive(Debug, Clone)]
pub struct ImageLoaderConfig {
    /// Maximum images in memory cache.
    pub memory_cache_size: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ImageLoaderConfig {
    fn default() -> Self {
        Self {
            memory_cache_size: DEFAULT_CACHE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Orchestrates image loading from memory, disk, and network.
///
/// Cloning is cheap and every clone shares the same stores and in-flight table.
#[derive(Clone)]
pub struct ImageLoader {
    memory_cache: Arc<MemoryImageCache>,
    disk_cache: Arc<DiskImageCache>,
    fetcher: Arc<dyn ImageFetchPort>,
    /// Used for deduplicating concurrent loads of the same URL.
    in_flight: FlightMap,
    /// Bumped on every clear; loads started earlier do not repopulate the stores.
    generation: Arc<AtomicU64>,
    /// Held shared while a load writes to the stores and exclusively by a clear.
    store_lock: Arc<RwLock<()>>,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("memory_cache", &self.memory_cache)
            .field("disk_cache", &self.disk_cache)
            .field("in_flight", &self.in_flight_count())
            .finish_non_exhaustive()
    }
}

/// Removes an in-flight entry when the owning load settles, even if it panics.
struct InFlightGuard {
    in_flight: FlightMap,
    url: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.url);
    }
}

impl ImageLoader {
    /// Creates a loader with a fresh memory cache sized from `config`.
    #[must_use]
    pub fn new(
        config: &ImageLoaderConfig,
        disk_cache: Arc<DiskImageCache>,
        fetcher: Arc<dyn ImageFetchPort>,
    ) -> Self {
        let memory_cache = Arc::new(MemoryImageCache::new(config.memory_cache_size));
        Self::from_parts(memory_cache, disk_cache, fetcher)
    }

    /// Creates a loader that downloads over HTTP.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_http(
        config: &ImageLoaderConfig,
        disk_cache: Arc<DiskImageCache>,
    ) -> CacheResult<Self> {
        let fetcher = HttpImageFetcher::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::new(config, disk_cache, Arc::new(fetcher)))
    }

    /// Creates a loader from already constructed stores.
    #[must_use]
    pub fn from_parts(
        memory_cache: Arc<MemoryImageCache>,
        disk_cache: Arc<DiskImageCache>,
        fetcher: Arc<dyn ImageFetchPort>,
    ) -> Self {
        Self {
            memory_cache,
            disk_cache,
            fetcher,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
            store_lock: Arc::new(RwLock::new(())),
        }
    }

    /// Loads an image, checking caches first.
    ///
    /// Returns `None` if the image could not be produced from any source; the
    /// reason is logged.
    pub async fn load(&self, url: &str) -> Option<LoadedImage> {
        if let Some(img) = self.memory_cache.get(url) {
            return Some(LoadedImage::new(url, img, ImageSource::Memory));
        }

        let (image, source) = self.join_or_start(url).await?;
        Some(LoadedImage::new(url, image, source))
    }

    /// Returns the running load for `url`, starting one if there is none.
    fn join_or_start(&self, url: &str) -> Flight {
        let (sender, flight, generation) = {
            let mut in_flight = self.in_flight.lock();
            if let Some(flight) = in_flight.get(url) {
                trace!(url, "Joining in-flight image load");
                return flight.clone();
            }

            let (sender, receiver) = oneshot::channel();
            let flight = published(url.to_string(), receiver);
            in_flight.insert(url.to_string(), flight.clone());
            (sender, flight, self.generation.load(Ordering::SeqCst))
        };

        // The in-flight lock must be released here: a task refused by a
        // shutting down runtime is dropped inside `spawn`, and its guard
        // takes the lock.
        self.spawn_flight(url.to_string(), generation, sender);
        flight
    }

    /// Spawns the resolution as a separate task so that dropping a waiter
    /// never cancels it.
    ///
    /// The task removes its own entry before publishing, so callers either
    /// receive this result or start over from the memory cache.
    fn spawn_flight(
        &self,
        url: String,
        generation: u64,
        sender: oneshot::Sender<FlightOutcome>,
    ) {
        let guard = InFlightGuard {
            in_flight: self.in_flight.clone(),
            url: url.clone(),
        };

        let loader = self.clone();
        tokio::spawn(async move {
            let outcome = loader.resolve(&url, generation).await;
            drop(guard);
            sender.send(outcome).ok();
        });
    }

    /// Resolves a memory miss from disk, then from the network.
    async fn resolve(&self, url: &str, generation: u64) -> FlightOutcome {
        if let Some(img) = self.memory_cache.peek(url) {
            return Some((img, ImageSource::Memory));
        }

        let key = CacheKey::from_url(url);
        if let Some(img) = self.load_from_disk(url, &key).await {
            let _store = self.store_lock.read().await;
            if self.is_current(generation) {
                self.memory_cache.put(url, img.clone());
            }
            debug!(url, source = "disk", "Image loaded successfully");
            return Some((img, ImageSource::Disk));
        }

        match self.load_from_network(url, &key, generation).await {
            Ok(img) => {
                debug!(url, source = "network", "Image loaded successfully");
                Some((img, ImageSource::Network))
            }
            Err(e) => {
                warn!(url, reason = e.kind(), error = %e, "Failed to load image");
                None
            }
        }
    }

    async fn load_from_disk(&self, url: &str, key: &CacheKey) -> Option<Arc<image::DynamicImage>> {
        let bytes = self.disk_cache.get(key).await?;
        match decode(bytes).await {
            Ok(img) => Some(img),
            Err(e) => {
                warn!(url, key = %key, error = %e, "Discarding undecodable disk cache entry");
                None
            }
        }
    }

    async fn load_from_network(
        &self,
        url: &str,
        key: &CacheKey,
        generation: u64,
    ) -> CacheResult<Arc<image::DynamicImage>> {
        let bytes = self.fetcher.fetch(url).await?;
        let img = decode(bytes.clone()).await?;

        let _store = self.store_lock.read().await;
        if self.is_current(generation) {
            self.disk_cache.put(key, &bytes).await;
            self.memory_cache.put(url, img.clone());
        } else {
            debug!(url, "Caches were cleared during load, not storing image");
        }

        Ok(img)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Returns true if a disk/network load for `url` is running.
    #[must_use]
    pub fn is_loading(&self, url: &str) -> bool {
        self.in_flight.lock().contains_key(url)
    }

    /// Returns the number of running disk/network loads.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Returns memory cache statistics.
    #[must_use]
    pub fn memory_cache_stats(&self) -> CacheStats {
        self.memory_cache.stats()
    }

    /// Returns the memory cache.
    #[must_use]
    pub fn memory_cache(&self) -> &MemoryImageCache {
        &self.memory_cache
    }

    /// Returns the disk cache.
    #[must_use]
    pub fn disk_cache(&self) -> &DiskImageCache {
        &self.disk_cache
    }

    /// Clears all caches.
    ///
    /// Waits for loads that are writing to the stores. Loads already running
    /// still deliver their result to their waiters but no longer populate
    /// either store.
    pub async fn clear_all(&self) {
        let _store = self.store_lock.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.memory_cache.remove_all();
        let removed = self.disk_cache.clear().await;
        info!(removed, "Cleared all image caches");
    }
}

/// Turns the receiving end of a load into a handle every waiter can poll.
fn published(url: String, receiver: oneshot::Receiver<FlightOutcome>) -> Flight {
    receiver
        .map(move |result| {
            result.unwrap_or_else(|_| {
                warn!(url = %url, "Image load task ended without a result");
                None
            })
        })
        .boxed()
        .shared()
}

/// Decodes image bytes on the blocking pool.
async fn decode<B>(bytes: B) -> CacheResult<Arc<image::DynamicImage>>
where
    B: AsRef<[u8]> + Send + 'static,
{
    tokio::task::spawn_blocking(move || image::load_from_memory(bytes.as_ref()))
        .await
        .map_err(|e| CacheError::decode(format!("Decode task panicked: {e}")))?
        .map(Arc::new)
        .map_err(|e| CacheError::decode(format!("Failed to decode image: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockImageFetcher;
    use crate::infrastructure::image::fixtures::png_bytes;
    use tempfile::TempDir;

    const URL: &str = "https://x/a.png";

    struct Harness {
        loader: ImageLoader,
        fetcher: Arc<MockImageFetcher>,
        _temp: TempDir,
    }

    async fn harness() -> Harness {
        let temp = TempDir::new().unwrap();
        harness_in(temp).await
    }

    async fn harness_in(temp: TempDir) -> Harness {
        let disk = Arc::new(DiskImageCache::new(temp.path().to_path_buf()).await.unwrap());
        let fetcher = Arc::new(MockImageFetcher::new());
        let loader = ImageLoader::new(&ImageLoaderConfig::default(), disk, fetcher.clone());
        Harness {
            loader,
            fetcher,
            _temp: temp,
        }
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_second_load_is_served_from_memory() {
        let h = harness().await;
        let bytes = png_bytes(10, 10);
        assert!(bytes.len() < 200);
        h.fetcher.serve(URL, bytes);

        let first = h.loader.load(URL).await.unwrap();
        assert_eq!(first.dimensions(), (10, 10));
        assert_eq!(first.source, ImageSource::Network);
        assert_eq!(h.fetcher.calls_for(URL), 1);

        let second = h.loader.load(URL).await.unwrap();
        assert_eq!(second.dimensions(), (10, 10));
        assert_eq!(second.source, ImageSource::Memory);
        assert_eq!(second.image.as_bytes(), first.image.as_bytes());
        assert_eq!(h.fetcher.calls_for(URL), 1);
    }

    #[tokio::test]
    async fn test_success_populates_both_stores() {
        let h = harness().await;
        let bytes = png_bytes(10, 10);
        h.fetcher.serve(URL, bytes.clone());

        h.loader.load(URL).await.unwrap();

        assert!(h.loader.memory_cache().peek(URL).is_some());
        let key = CacheKey::from_url(URL);
        assert_eq!(h.loader.disk_cache().get(&key).await, Some(bytes));
        assert_eq!(h.loader.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_disk_hit_after_restart_skips_network() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_path_buf();
        let h = harness_in(temp).await;
        h.fetcher.serve(URL, png_bytes(10, 10));
        h.loader.load(URL).await.unwrap();

        let disk = Arc::new(DiskImageCache::new(dir).await.unwrap());
        let fetcher = Arc::new(MockImageFetcher::new());
        let restarted = ImageLoader::new(&ImageLoaderConfig::default(), disk, fetcher.clone());

        let loaded = restarted.load(URL).await.unwrap();
        assert_eq!(loaded.source, ImageSource::Disk);
        assert_eq!(loaded.dimensions(), (10, 10));
        assert_eq!(fetcher.total_calls(), 0);
        assert!(restarted.memory_cache().peek(URL).is_some());
    }

    #[tokio::test]
    async fn test_memory_eviction_falls_back_to_disk() {
        let temp = TempDir::new().unwrap();
        let disk = Arc::new(DiskImageCache::new(temp.path().to_path_buf()).await.unwrap());
        let fetcher = Arc::new(MockImageFetcher::new());
        let config = ImageLoaderConfig {
            memory_cache_size: 1,
            ..ImageLoaderConfig::default()
        };
        let loader = ImageLoader::new(&config, disk, fetcher.clone());
        fetcher.serve("https://x/1.png", png_bytes(1, 1));
        fetcher.serve("https://x/2.png", png_bytes(2, 2));

        loader.load("https://x/1.png").await.unwrap();
        loader.load("https://x/2.png").await.unwrap();

        let again = loader.load("https://x/1.png").await.unwrap();
        assert_eq!(again.source, ImageSource::Disk);
        assert_eq!(fetcher.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_disk_entry_falls_through_to_network() {
        let h = harness().await;
        let key = CacheKey::from_url(URL);
        h.loader.disk_cache().put(&key, b"definitely not an image").await;
        let bytes = png_bytes(4, 3);
        h.fetcher.serve(URL, bytes.clone());

        let loaded = h.loader.load(URL).await.unwrap();
        assert_eq!(loaded.source, ImageSource::Network);
        assert_eq!(loaded.dimensions(), (4, 3));
        assert_eq!(h.loader.disk_cache().get(&key).await, Some(bytes));
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_no_entries() {
        let h = harness().await;
        h.fetcher.fail(URL, "connection refused");

        assert!(h.loader.load(URL).await.is_none());
        assert!(h.loader.memory_cache().peek(URL).is_none());
        assert!(!h.loader.disk_cache().contains(&CacheKey::from_url(URL)).await);
        assert_eq!(h.loader.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_network_bytes_are_not_stored() {
        let h = harness().await;
        h.fetcher.serve(URL, &b"<html>404</html>"[..]);

        assert!(h.loader.load(URL).await.is_none());
        assert!(h.loader.memory_cache().is_empty());
        assert!(h.loader.disk_cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_no_retry_within_a_call_but_next_call_refetches() {
        let h = harness().await;
        h.fetcher.fail(URL, "timeout");

        assert!(h.loader.load(URL).await.is_none());
        assert_eq!(h.fetcher.calls_for(URL), 1);

        h.fetcher.serve(URL, png_bytes(2, 2));
        assert!(h.loader.load(URL).await.is_some());
        assert_eq!(h.fetcher.calls_for(URL), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_loads_share_one_fetch() {
        let h = harness().await;
        let gate = h.fetcher.serve_gated(URL, png_bytes(10, 10));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let loader = h.loader.clone();
                tokio::spawn(async move { loader.load(URL).await })
            })
            .collect();

        wait_until(|| h.fetcher.calls_for(URL) == 1).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(h.loader.is_loading(URL));
        gate.add_permits(1);

        let mut images = Vec::new();
        for handle in handles {
            images.push(handle.await.unwrap().expect("every waiter gets the image").image);
        }

        assert_eq!(h.fetcher.calls_for(URL), 1);
        assert!(images.iter().all(|img| Arc::ptr_eq(img, &images[0])));
        assert_eq!(h.loader.in_flight_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_loads_share_one_failure() {
        let h = harness().await;
        let gate = h.fetcher.fail_gated(URL, "HTTP 500");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = h.loader.clone();
                tokio::spawn(async move { loader.load(URL).await })
            })
            .collect();

        wait_until(|| h.fetcher.calls_for(URL) == 1).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        gate.add_permits(1);

        for handle in handles {
            assert!(handle.await.unwrap().is_none());
        }
        assert_eq!(h.fetcher.calls_for(URL), 1);
        assert!(!h.loader.is_loading(URL));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stalled_url_does_not_block_other_urls() {
        let h = harness().await;
        let slow = "https://x/slow.png";
        let fast = "https://x/fast.png";
        let gate = h.fetcher.serve_gated(slow, png_bytes(1, 1));
        h.fetcher.serve(fast, png_bytes(3, 3));

        let loader = h.loader.clone();
        let stalled = tokio::spawn(async move { loader.load(slow).await });
        wait_until(|| h.fetcher.calls_for(slow) == 1).await;

        let loaded = tokio::time::timeout(Duration::from_secs(2), h.loader.load(fast))
            .await
            .expect("fast URL must not wait for the stalled one")
            .unwrap();
        assert_eq!(loaded.dimensions(), (3, 3));
        assert!(h.loader.is_loading(slow));

        gate.add_permits(1);
        assert!(stalled.await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_abandoned_waiter_does_not_cancel_load() {
        let h = harness().await;
        let gate = h.fetcher.serve_gated(URL, png_bytes(5, 5));

        let loader = h.loader.clone();
        let waiter = tokio::spawn(async move { loader.load(URL).await });
        wait_until(|| h.fetcher.calls_for(URL) == 1).await;
        waiter.abort();

        gate.add_permits(1);
        let memory = h.loader.memory_cache();
        wait_until(|| memory.peek(URL).is_some()).await;

        let loaded = h.loader.load(URL).await.unwrap();
        assert_eq!(loaded.source, ImageSource::Memory);
        assert_eq!(h.fetcher.calls_for(URL), 1);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let h = harness().await;
        h.fetcher.serve(URL, png_bytes(10, 10));
        h.loader.load(URL).await.unwrap();

        h.loader.clear_all().await;
        assert!(h.loader.memory_cache().is_empty());
        assert!(h.loader.disk_cache().is_empty().await);

        let loaded = h.loader.load(URL).await.unwrap();
        assert_eq!(loaded.source, ImageSource::Network);
        assert_eq!(h.fetcher.calls_for(URL), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_clear_during_load_does_not_repopulate() {
        let h = harness().await;
        let gate = h.fetcher.serve_gated(URL, png_bytes(6, 6));

        let loader = h.loader.clone();
        let pending = tokio::spawn(async move { loader.load(URL).await });
        wait_until(|| h.fetcher.calls_for(URL) == 1).await;

        h.loader.clear_all().await;
        gate.add_permits(1);

        let loaded = pending.await.unwrap().unwrap();
        assert_eq!(loaded.dimensions(), (6, 6));
        assert!(h.loader.memory_cache().is_empty());
        assert!(h.loader.disk_cache().is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_clear_while_loads_are_storing_leaves_stores_empty() {
        let h = harness().await;
        let urls: Vec<String> = (0..8).map(|i| format!("https://x/{i}.png")).collect();
        for url in &urls {
            h.fetcher.serve(url, png_bytes(16, 16));
        }

        for round in 0..60u64 {
            let flights: Vec<_> = urls.iter().map(|url| h.loader.join_or_start(url)).collect();
            tokio::time::sleep(Duration::from_micros(round * 25)).await;
            h.loader.clear_all().await;

            for flight in flights {
                assert!(flight.await.is_some());
            }
            assert!(h.loader.memory_cache().is_empty(), "round {round}: memory");
            assert!(h.loader.disk_cache().is_empty().await, "round {round}: disk");
        }
    }

    #[test]
    fn test_start_after_runtime_shutdown_returns() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let handle = runtime.handle().clone();
        let h = runtime.block_on(harness());
        runtime.shutdown_background();

        let _entered = handle.enter();
        let flight = h.loader.join_or_start(URL);
        assert!(!h.loader.is_loading(URL));
        drop(flight);
    }
}
