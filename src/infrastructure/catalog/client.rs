//! Catalog HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::dto::CatalogResponse;
use crate::domain::entities::{Item, ItemCollection};
use crate::domain::errors::CatalogError;
use crate::domain::ports::CatalogPort;

const USER_AGENT: &str = concat!("thumbwell/", env!("CARGO_PKG_VERSION"));

/// Fetches the item list over HTTP and decodes it from JSON.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
}

impl HttpCatalogClient {
    /// Creates new client with the given request timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl CatalogPort for HttpCatalogClient {
    async fn fetch_items(&self, endpoint: &str) -> Result<ItemCollection, CatalogError> {
        let url = parse_endpoint(endpoint)?;

        debug!(endpoint = %url, "Fetching catalog");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "Failed to fetch catalog");
            if e.is_timeout() {
                CatalogError::network("request timed out")
            } else if e.is_connect() {
                CatalogError::network("failed to connect")
            } else {
                CatalogError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::network(format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::network(format!("failed to read body: {e}")))?;

        let items = parse_catalog(&body)?;
        debug!(count = items.len(), "Catalog fetched");
        Ok(items)
    }
}

/// Validates that `endpoint` is an absolute http(s) URL.
///
/// # Errors
/// Returns [`CatalogError::InvalidUrl`] otherwise.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, CatalogError> {
    match Url::parse(endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(CatalogError::invalid_url(endpoint)),
    }
}

/// Decodes a catalog document.
///
/// # Errors
/// Returns [`CatalogError::Decoding`] for malformed documents and
/// [`CatalogError::EmptyData`] when the document lists no items.
pub fn parse_catalog(body: &[u8]) -> Result<ItemCollection, CatalogError> {
    let response: CatalogResponse = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Failed to parse catalog");
        CatalogError::decoding(e.to_string())
    })?;

    if response.items.is_empty() {
        return Err(CatalogError::EmptyData);
    }

    Ok(response
        .items
        .into_iter()
        .map(Item::from)
        .collect::<Vec<_>>()
        .into())
}
