//! In-memory catalog store.
//!
//! Keeps records in insertion order behind a read-write lock. Used by tests
//! and by `ipm-server serve --catalog <file>` to serve a catalog JSON file
//! without a database.

use std::sync::RwLock;

use async_trait::async_trait;
use ipm_schema::IpRecord;

use super::{CatalogStore, StoreError, StoreFilter, Upsert};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<IpRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, keeping their order.
    ///
    /// A later record with an already-seen name replaces the earlier one.
    pub fn from_records(records: impl IntoIterator<Item = IpRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.upsert(record);
        }
        store
    }

    /// Insert or replace (in place) a record by name.
    pub fn upsert(&self, ip: IpRecord) -> Upsert {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(existing) = records.iter_mut().find(|r| r.name == ip.name) {
            *existing = ip;
            Upsert::Replaced
        } else {
            records.push(ip);
            Upsert::Inserted
        }
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<IpRecord>, StoreError> {
        let records = self
            .records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(records.iter().find(|r| r.name == name).cloned())
    }

    async fn find_many(&self, filter: &StoreFilter) -> Result<Vec<IpRecord>, StoreError> {
        let records = self
            .records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(records.iter().filter(|r| filter.matches(r)).cloned().collect())
    }
}
