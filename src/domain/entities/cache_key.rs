//! Filesystem-safe cache keys derived from image URLs.

use sha2::{Digest, Sha256};

/// Length of a [`CacheKey`] in characters (hex-encoded SHA-256).
pub const CACHE_KEY_LEN: usize = 64;

/// Stable identifier for a cached blob on disk.
///
/// Derived from the SHA-256 of the URL string, encoded as lowercase hex.
/// The same URL always maps to the same key across runs; the key only
/// contains `[0-9a-f]` so it is always a valid single path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a URL.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
