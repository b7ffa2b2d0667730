//! Use case implementations.

mod browse_items_use_case;

pub use browse_items_use_case::BrowseItemsUseCase;
