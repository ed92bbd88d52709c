//! Core library for IPM.
//!
//! Everything between the catalog store and the HTTP boundary lives here:
//! the [`CatalogStore`] abstraction and its SQLite-backed implementation,
//! release resolution, download reference construction and the read-only
//! [`CatalogService`] that composes them.

pub mod download;
pub mod error;
pub mod migrate;
pub mod paths;
pub mod resolver;
pub mod service;
pub mod store;
#[cfg(feature = "network")]
pub mod validate;
pub mod visibility;

pub use error::CatalogError;
pub use paths::*;
pub use service::{CatalogService, DownloadInfo, ListFilter};
pub use store::{CatalogStore, StoreConfig, StoreError, StoreFilter};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("ipm-core/", env!("CARGO_PKG_VERSION"));
