//! Application layer with services, use cases and DTOs.

/// Data transfer objects.
pub mod dto;
/// Application services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{ItemRow, Thumbnail};
pub use services::ImageCache;
pub use use_cases::BrowseItemsUseCase;
