//! IPM backend.
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! A read-only REST API over the IP catalog. All catalog semantics live in
//! [`ipm_core::CatalogService`]; this crate maps requests onto it and its
//! failures onto HTTP status codes.

pub mod config;
pub mod error;
pub mod json;
pub mod routes;

pub use config::{Args, CatalogSource, Command, ServerConfig};
pub use error::AppError;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use ipm_core::store::{CatalogHandle, MemoryStore};
use ipm_core::{CatalogService, CatalogStore, StoreConfig, migrate};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Application state shared across all routes.
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: CatalogService,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, config: ServerConfig) -> Self {
        Self {
            service: CatalogService::new(store),
            config,
        }
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let timeout = TimeoutLayer::new(state.config.request_timeout);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::ips::routes())
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Open the store a server should read from.
pub fn open_store(source: &CatalogSource) -> Result<Arc<dyn CatalogStore>> {
    match source {
        CatalogSource::Database(path) => {
            let handle = CatalogHandle::spawn(&StoreConfig::new(path))
                .with_context(|| format!("Failed to open catalog database {}", path.display()))?;
            Ok(Arc::new(handle))
        }
        CatalogSource::File(path) => Ok(Arc::new(load_catalog_file(path)?)),
    }
}

/// Load a catalog JSON file (the migration source format) into memory.
///
/// Entries that do not decode are skipped with a warning.
pub fn load_catalog_file(path: &Path) -> Result<MemoryStore> {
    let source = migrate::load_source(path)
        .with_context(|| format!("Failed to load catalog {}", path.display()))?;

    let store = MemoryStore::new();
    for (name, entry) in source {
        match migrate::transform_entry(&name, entry) {
            Ok(ip) => {
                store.upsert(ip);
            }
            Err(reason) => warn!(%name, %reason, "skipping catalog entry"),
        }
    }
    Ok(store)
}
