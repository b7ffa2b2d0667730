//! Domain entity definitions.

mod cache_key;
mod loaded_image;
mod item;

pub use cache_key::{CACHE_KEY_LEN, CacheKey};
pub use loaded_image::{ImageSource, ImageVariant, LoadedImage};
pub use item::{ALL_CATEGORIES, Item, ItemCollection};
