use serde::Deserialize;

use crate::domain::entities::Item;

/// Catalog document envelope.
#[derive(Debug, Deserialize)]
pub struct CatalogResponse {
    /// Listed items. Older endpoints name this field `recipes`.
    #[serde(alias = "recipes")]
    pub items: Vec<ItemResponse>,
}

/// Single catalog entry as served by the endpoint.
#[derive(Debug, Deserialize)]
pub struct ItemResponse {
    /// Stable identifier.
    #[serde(alias = "uuid")]
    pub id: String,
    /// Display text.
    pub name: String,
    /// Category label.
    #[serde(alias = "cuisine")]
    pub category: String,
    /// Small image URL.
    #[serde(default, alias = "photo_url_small")]
    pub image_url_small: Option<String>,
    /// Large image URL.
    #[serde(default, alias = "photo_url_large")]
    pub image_url_large: Option<String>,
    /// Source page URL.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Video URL.
    #[serde(default)]
    pub youtube_url: Option<String>,
}

impl From<ItemResponse> for Item {
    fn from(value: ItemResponse) -> Self {
        Self {
            id: value.id,
            name: value.name,
            category: value.category,
            image_url_small: value.image_url_small.filter(|u| !u.is_empty()),
            image_url_large: value.image_url_large.filter(|u| !u.is_empty()),
            source_url: value.source_url,
            youtube_url: value.youtube_url,
        }
    }
}
