//! Plain-text rendering of catalog rows.

use std::fmt::Write;

use crate::application::dto::{ItemRow, Thumbnail};
use crate::domain::entities::ALL_CATEGORIES;

/// Shown when an item has no image URL.
pub const NO_IMAGE: &str = "[no image]";
/// Shown when an image could not be loaded.
pub const UNAVAILABLE: &str = "[--]";

const THUMB_WIDTH: usize = 11;

/// Renders the thumbnail column for a row.
#[must_use]
pub fn thumbnail_label(thumbnail: &Thumbnail) -> String {
    match thumbnail {
        Thumbnail::Missing => NO_IMAGE.to_string(),
        Thumbnail::Unavailable => UNAVAILABLE.to_string(),
        Thumbnail::Ready { width, height, .. } => format!("[{width}x{height}]"),
    }
}

/// Renders one line per row: thumbnail, name, category.
#[must_use]
pub fn render_rows(rows: &[ItemRow]) -> String {
    if rows.is_empty() {
        return "No items available.\n".to_string();
    }

    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{:<width$} {}  ({})",
            thumbnail_label(&row.thumbnail),
            row.name,
            row.category,
            width = THUMB_WIDTH
        );
    }
    out
}

/// Renders the category picker entries, with the "All" entry first.
#[must_use]
pub fn render_categories(categories: &[String]) -> String {
    std::iter::once(ALL_CATEGORIES)
        .chain(categories.iter().map(String::as_str))
        .fold(String::new(), |mut out, c| {
            let _ = writeln!(out, "{c}");
            out
        })
}
