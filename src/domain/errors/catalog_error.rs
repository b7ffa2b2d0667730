//! Catalog retrieval error types.

use thiserror::Error;

/// Errors while fetching the item list.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum CatalogError {
    #[error("the catalog URL is invalid: {url}")]
    InvalidUrl { url: String },

    #[error("network error while fetching catalog: {message}")]
    Network { message: String },

    #[error("failed to decode catalog: {message}")]
    Decoding { message: String },

    #[error("the catalog is empty")]
    EmptyData,
}

impl CatalogError {
    /// Creates invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates decoding error.
    #[must_use]
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding {
            message: message.into(),
        }
    }
}
