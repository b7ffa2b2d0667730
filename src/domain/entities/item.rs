//! Catalog item entities.

use std::collections::BTreeSet;

use super::ImageVariant;

/// Category label meaning "no filter".
pub const ALL_CATEGORIES: &str = "All";

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Stable identifier.
    pub id: String,
    /// Display text.
    pub name: String,
    /// Category label used for filtering.
    pub category: String,
    /// Thumbnail-sized image URL.
    pub image_url_small: Option<String>,
    /// Full-size image URL.
    pub image_url_large: Option<String>,
    /// Link to the original page.
    pub source_url: Option<String>,
    /// Link to a video.
    pub youtube_url: Option<String>,
}

impl Item {
    /// Creates an item without any links.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            image_url_small: None,
            image_url_large: None,
            source_url: None,
            youtube_url: None,
        }
    }

    /// Sets the small image URL.
    #[must_use]
    pub fn with_small_image(mut self, url: impl Into<String>) -> Self {
        self.image_url_small = Some(url.into());
        self
    }

    /// Sets the large image URL.
    #[must_use]
    pub fn with_large_image(mut self, url: impl Into<String>) -> Self {
        self.image_url_large = Some(url.into());
        self
    }

    /// Returns the image URL for the requested variant.
    ///
    /// Falls back to the other variant when the preferred one is missing.
    #[must_use]
    pub fn image_url(&self, variant: ImageVariant) -> Option<&str> {
        let (preferred, fallback) = match variant {
            ImageVariant::Small => (&self.image_url_small, &self.image_url_large),
            ImageVariant::Large => (&self.image_url_large, &self.image_url_small),
        };
        preferred.as_deref().or(fallback.as_deref())
    }
}

/// An ordered list of items as returned by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCollection {
    items: Vec<Item>,
}

impl ItemCollection {
    /// Wraps a list of items.
    #[must_use]
    pub const fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Returns the items in catalog order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Consumes the collection.
    #[must_use]
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the distinct categories, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| item.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Keeps only items in `category`. `None` or [`ALL_CATEGORIES`] keeps everything.
    #[must_use]
    pub fn filter_by_category(self, category: Option<&str>) -> Self {
        match category {
            None => self,
            Some(c) if c == ALL_CATEGORIES => self,
            Some(c) => Self {
                items: self
                    .items
                    .into_iter()
                    .filter(|item| item.category == c)
                    .collect(),
            },
        }
    }
}

impl From<Vec<Item>> for ItemCollection {
    fn from(items: Vec<Item>) -> Self {
        Self::new(items)
    }
}
