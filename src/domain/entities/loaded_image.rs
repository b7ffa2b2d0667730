//! Domain types for loaded images.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A decoded image ready for display.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// URL the image was requested with.
    pub url: String,
    /// Decoded pixel data, shared between every holder.
    pub image: Arc<image::DynamicImage>,
    /// Where the image was found.
    pub source: ImageSource,
}

impl LoadedImage {
    /// Creates a new loaded image.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        image: Arc<image::DynamicImage>,
        source: ImageSource,
    ) -> Self {
        Self {
            url: url.into(),
            image,
            source,
        }
    }

    /// Returns the image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Returns the image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

/// Where an image was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Loaded from the in-memory LRU cache.
    Memory,
    /// Loaded from the disk cache.
    Disk,
    /// Downloaded from the network.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Disk => write!(f, "disk"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// Which of an item's image URLs to use for thumbnails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageVariant {
    /// The small image URL.
    #[default]
    Small,
    /// The large image URL.
    Large,
}

impl std::fmt::Display for ImageVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Large => write!(f, "large"),
        }
    }
}
