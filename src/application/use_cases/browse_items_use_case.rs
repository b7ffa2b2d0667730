//! Browse items use case implementation.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info};

use crate::application::dto::{ItemRow, Thumbnail};
use crate::application::services::ImageCache;
use crate::domain::entities::{ImageVariant, Item};
use crate::domain::errors::CatalogError;
use crate::domain::ports::CatalogPort;

/// Fetches the catalog and resolves a thumbnail for every listed item.
#[derive(Clone)]
pub struct BrowseItemsUseCase {
    catalog: Arc<dyn CatalogPort>,
    images: ImageCache,
}

impl BrowseItemsUseCase {
    /// Creates new browse use case.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogPort>, images: ImageCache) -> Self {
        Self { catalog, images }
    }

    /// Fetches the items at `endpoint`, keeps those in `category`, and loads
    /// their thumbnails concurrently.
    ///
    /// Rows come back in catalog order. Thumbnail failures only affect the
    /// row's [`Thumbnail`] state.
    ///
    /// # Errors
    /// Returns error if the catalog cannot be fetched or decoded.
    pub async fn execute(
        &self,
        endpoint: &str,
        category: Option<&str>,
        variant: ImageVariant,
    ) -> Result<Vec<ItemRow>, CatalogError> {
        let items = self
            .catalog
            .fetch_items(endpoint)
            .await?
            .filter_by_category(category);

        debug!(count = items.len(), category = ?category, "Loading thumbnails");

        let rows = join_all(
            items
                .items()
                .iter()
                .map(|item| self.row_for(item, variant)),
        )
        .await;

        let ready = rows.iter().filter(|row| row.thumbnail.is_ready()).count();
        info!(rows = rows.len(), thumbnails = ready, "Catalog loaded");

        Ok(rows)
    }

    /// Returns the sorted distinct categories at `endpoint`.
    ///
    /// # Errors
    /// Returns error if the catalog cannot be fetched or decoded.
    pub async fn categories(&self, endpoint: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self.catalog.fetch_items(endpoint).await?.categories())
    }

    async fn row_for(&self, item: &Item, variant: ImageVariant) -> ItemRow {
        let thumbnail = match item.image_url(variant) {
            Some(url) => Thumbnail::from_load(self.images.load_image(url).await.as_ref()),
            None => Thumbnail::Missing,
        };
        ItemRow::new(item, thumbnail)
    }
}
