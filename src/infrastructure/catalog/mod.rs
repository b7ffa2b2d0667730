//! Item catalog client.

mod client;
mod dto;

pub use client::{HttpCatalogClient, parse_catalog, parse_endpoint};
