//! Catalog storage.
//!
//! The query layer only sees the [`CatalogStore`] trait. Two implementations
//! ship with the crate: [`actor::CatalogHandle`], a SQLite document store
//! hosted on its own thread, and [`memory::MemoryStore`].

pub mod actor;
pub mod db;
pub mod memory;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use ipm_schema::IpRecord;
use thiserror::Error;

pub use actor::CatalogHandle;
pub use db::{CatalogDb, Upsert};
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt catalog document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog store actor is no longer running")]
    Closed,
}

/// Connection settings for the SQLite catalog, passed in explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Database file; parent directories are created on open.
    pub db_path: PathBuf,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

/// Equality constraints for [`CatalogStore::find_many`]. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreFilter {
    pub category: Option<String>,
    pub technology: Option<String>,
}

impl StoreFilter {
    /// Whether `ip` satisfies every constraint that is set.
    pub fn matches(&self, ip: &IpRecord) -> bool {
        self.category.as_deref().is_none_or(|c| ip.category == c)
            && self.technology.as_deref().is_none_or(|t| ip.technology == t)
    }
}

/// Read access to persisted IP records.
///
/// Implementations own their concurrency safety; callers may share one
/// store across any number of tasks.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch one IP by exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<IpRecord>, StoreError>;

    /// Fetch all IPs matching `filter`, in the store's own order.
    async fn find_many(&self, filter: &StoreFilter) -> Result<Vec<IpRecord>, StoreError>;

    /// Number of IPs in the store.
    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.find_many(&StoreFilter::default()).await?.len())
    }
}

#[async_trait]
impl<T: CatalogStore + ?Sized> CatalogStore for Arc<T> {
    async fn find_by_name(&self, name: &str) -> Result<Option<IpRecord>, StoreError> {
        (**self).find_by_name(name).await
    }

    async fn find_many(&self, filter: &StoreFilter) -> Result<Vec<IpRecord>, StoreError> {
        (**self).find_many(filter).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        (**self).count().await
    }
}
