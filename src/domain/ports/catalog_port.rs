//! Port definition for the item catalog source.

use async_trait::async_trait;

use crate::domain::entities::ItemCollection;
use crate::domain::errors::CatalogError;

/// Port for retrieving the item list.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Fetches and decodes the item list at `endpoint`.
    async fn fetch_items(&self, endpoint: &str) -> Result<ItemCollection, CatalogError>;
}
