//! Data transfer objects for the application layer.

mod item_row;

pub use item_row::{ItemRow, Thumbnail};
