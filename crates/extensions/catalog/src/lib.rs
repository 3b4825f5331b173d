//! Restaurant catalog for autonom.
//!
//! - [`Catalog`] - read-only lookups over restaurants and menus
//! - [`StaticCatalog`] - in-process catalog loaded from JSON
//! - [`HttpCatalog`] - client for a remote catalog service
//! - [`catalog_router`] - axum router serving any [`Catalog`] over HTTP

mod catalog;
mod client;
mod error;
mod http;
mod model;

pub use catalog::{Catalog, StaticCatalog};
pub use client::HttpCatalog;
pub use error::CatalogError;
pub use http::catalog_router;
pub use model::{MenuEntry, MenuItem, Restaurant};
