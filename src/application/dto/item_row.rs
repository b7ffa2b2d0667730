//! Row DTOs handed to the presentation layer.

use crate::domain::entities::{ImageSource, Item, LoadedImage};

/// Thumbnail state of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thumbnail {
    /// The item has no image URL.
    Missing,
    /// The image could not be loaded.
    Unavailable,
    /// The image was loaded.
    Ready {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Where the image came from.
        source: ImageSource,
    },
}

impl Thumbnail {
    /// Builds the state from a load result.
    #[must_use]
    pub fn from_load(image: Option<&LoadedImage>) -> Self {
        image.map_or(Self::Unavailable, |img| Self::Ready {
            width: img.width(),
            height: img.height(),
            source: img.source,
        })
    }

    /// Returns true if the image was loaded.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// One displayable catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    /// Item identifier.
    pub id: String,
    /// Display text.
    pub name: String,
    /// Category label.
    pub category: String,
    /// Thumbnail state.
    pub thumbnail: Thumbnail,
}

impl ItemRow {
    /// Creates a row for `item`.
    #[must_use]
    pub fn new(item: &Item, thumbnail: Thumbnail) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            thumbnail,
        }
    }
}
