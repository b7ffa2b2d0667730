//! Domain error types.

mod cache_error;
mod catalog_error;

pub use cache_error::{CacheError, CacheResult};
pub use catalog_error::CatalogError;
