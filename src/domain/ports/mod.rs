mod catalog_port;
mod image_fetch_port;

pub use catalog_port::CatalogPort;
pub use image_fetch_port::ImageFetchPort;

#[cfg(test)]
pub mod mocks {
    pub use super::catalog_port::mock::MockCatalog;
    pub use super::image_fetch_port::mock::MockImageFetcher;
}
