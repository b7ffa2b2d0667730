//! Presentation layer rendering catalog rows as text.

/// Row and category rendering.
pub mod listing;

pub use listing::{render_categories, render_rows};
