//! Thumbwell - browse a remote item catalog with cached thumbnails.
//!
//! Images are served from a bounded in-memory LRU, then a disk cache, then
//! the network, with concurrent requests for the same URL coalesced into a
//! single download.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the image cache facade and use cases.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer rendering catalog rows.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "thumbwell";
