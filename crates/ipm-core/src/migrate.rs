//! One-shot import of the static catalog JSON into the catalog store.
//!
//! The source file is a JSON object keyed by IP name. Each entry carries its
//! releases under `release` (singular), which becomes `releases` in the store.
//! Entries are upserted one by one; an entry that does not decode is logged,
//! recorded in the report and skipped.

use std::path::Path;

use ipm_schema::IpRecord;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::{CatalogHandle, StoreError, Upsert};

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Failed to read catalog source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog source is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog source must be a JSON object keyed by IP name")]
    NotAnObject,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An entry that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedEntry {
    pub name: String,
    pub reason: String,
}

/// Outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Entries that were new to the store.
    pub migrated: usize,
    /// Entries that replaced an existing record.
    pub updated: usize,
    pub failed: Vec<FailedEntry>,
}

impl MigrationReport {
    pub fn total(&self) -> usize {
        self.migrated + self.updated + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Read and parse a catalog source file.
pub fn load_source(path: &Path) -> Result<Map<String, Value>, MigrateError> {
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(MigrateError::NotAnObject),
    }
}

/// Turn one source entry into a catalog record.
///
/// The map key is authoritative for the name. Missing descriptive fields
/// default to empty values.
pub fn transform_entry(name: &str, entry: Value) -> Result<IpRecord, String> {
    let Value::Object(mut fields) = entry else {
        return Err("entry is not a JSON object".to_string());
    };

    if let Some(releases) = fields.remove("release") {
        if fields.insert("releases".to_string(), releases).is_some() {
            warn!(ip = name, "entry has both 'release' and 'releases'; using 'release'");
        }
    }
    // Explicit nulls would otherwise fail to decode into strings and lists.
    fields.retain(|_, value| !value.is_null());
    fields.remove("_id");
    fields.insert("name".to_string(), Value::String(name.to_string()));

    serde_json::from_value(Value::Object(fields)).map_err(|e| e.to_string())
}

/// Import every entry of `source` into the store behind `handle`.
///
/// Only a failing store aborts the run; bad entries are reported.
pub async fn migrate(
    handle: &CatalogHandle,
    source: Map<String, Value>,
) -> Result<MigrationReport, MigrateError> {
    info!(entries = source.len(), "starting catalog migration");
    let mut report = MigrationReport::default();

    for (name, entry) in source {
        let ip = match transform_entry(&name, entry) {
            Ok(ip) => ip,
            Err(reason) => {
                warn!(%name, %reason, "skipping catalog entry");
                report.failed.push(FailedEntry { name, reason });
                continue;
            }
        };

        match handle.upsert(ip).await? {
            Upsert::Inserted => {
                debug!(%name, "migrated");
                report.migrated += 1;
            }
            Upsert::Replaced => {
                debug!(%name, "updated");
                report.updated += 1;
            }
        }
    }

    info!(
        migrated = report.migrated,
        updated = report.updated,
        failed = report.failed.len(),
        "catalog migration finished"
    );
    Ok(report)
}
