//! Port definition for the image network transport.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::CacheResult;

/// Fetches raw image bytes over the network.
/// Implementations must be thread-safe.
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Downloads the body at `url`.
    ///
    /// Any transport failure or non-2xx status is an error.
    async fn fetch(&self, url: &str) -> CacheResult<Bytes>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use tokio::sync::Semaphore;

    use crate::domain::errors::CacheError;

    #[derive(Clone)]
    struct Route {
        body: Result<Bytes, String>,
        gate: Option<Arc<Semaphore>>,
    }

    /// Mock transport with canned per-URL responses and call counters.
    #[derive(Default)]
    pub struct MockImageFetcher {
        routes: Mutex<HashMap<String, Route>>,
        calls: Mutex<HashMap<String, usize>>,
        total_calls: AtomicUsize,
    }

    impl MockImageFetcher {
        /// Creates new mock with no routes.
        pub fn new() -> Self {
            Self::default()
        }

        /// Serves `body` for `url`.
        pub fn serve(&self, url: &str, body: impl Into<Bytes>) {
            self.insert(url, Ok(body.into()), None);
        }

        /// Fails every fetch of `url` with a network error.
        pub fn fail(&self, url: &str, message: &str) {
            self.insert(url, Err(message.to_string()), None);
        }

        /// Serves `body` for `url` once a permit is added to the returned gate.
        pub fn serve_gated(&self, url: &str, body: impl Into<Bytes>) -> Arc<Semaphore> {
            let gate = Arc::new(Semaphore::new(0));
            self.insert(url, Ok(body.into()), Some(gate.clone()));
            gate
        }

        /// Fails `url` with a network error once a permit is added to the returned gate.
        pub fn fail_gated(&self, url: &str, message: &str) -> Arc<Semaphore> {
            let gate = Arc::new(Semaphore::new(0));
            self.insert(url, Err(message.to_string()), Some(gate.clone()));
            gate
        }

        /// Number of fetches issued for `url`.
        pub fn calls_for(&self, url: &str) -> usize {
            self.calls.lock().get(url).copied().unwrap_or(0)
        }

        /// Number of fetches issued for any URL.
        pub fn total_calls(&self) -> usize {
            self.total_calls.load(Ordering::SeqCst)
        }

        fn insert(
            &self,
            url: &str,
            body: Result<Bytes, String>,
                gate: Option<Arc<Semaphore>>,
        ) {
            self.routes
                .lock()
                .insert(url.to_string(), Route { body, gate });
        }
    }

    #[async_trait]
    impl ImageFetchPort for MockImageFetcher {
        async fn fetch(&self, url: &str) -> CacheResult<Bytes> {
            self.total_calls.fetch_add(1, Ordering::SeqCst);
            *self.calls.lock().entry(url.to_string()).or_default() += 1;

            let route = self.routes.lock().get(url).cloned();
            let Some(route) = route else {
                return Err(CacheError::network(format!("no route for {url}")));
            };

            if let Some(gate) = route.gate {
                let _permit = gate
                    .acquire()
                    .await
                    .map_err(|e| CacheError::network(format!("gate closed: {e}")))?;
            }

            route.body.map_err(CacheError::network)
        }
    }
}
