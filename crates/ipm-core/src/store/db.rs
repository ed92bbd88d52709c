//! SQLite catalog database
//!
//! Stores each IP as a JSON document keyed by name. Category and technology
//! are mirrored into indexed columns so filtered listing stays in SQL.

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use ipm_schema::IpRecord;

use super::{StoreConfig, StoreError, StoreFilter};

/// Outcome of [`CatalogDb::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// No record with that name existed.
    Inserted,
    /// An existing record was replaced in place.
    Replaced,
}

/// Catalog database handle. Not `Sync`; see [`super::CatalogHandle`] for shared use.
#[derive(Debug)]
pub struct CatalogDb {
    conn: Connection,
}

impl CatalogDb {
    /// Open or create the catalog database described by `config`
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&config.db_path)?;

        // Enable WAL mode so `validate` can read while a server is running
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Open a private in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS ips (
                name TEXT PRIMARY KEY,
                category TEXT NOT NULL,
                technology TEXT NOT NULL,
                document TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_ips_category ON ips(category);
            CREATE INDEX IF NOT EXISTS idx_ips_technology ON ips(technology);
            ",
        )?;
        Ok(())
    }

    /// Insert an IP, or replace the existing record with the same name.
    ///
    /// Replacing keeps the row's original position in listing order.
    pub fn upsert(&self, ip: &IpRecord) -> Result<Upsert, StoreError> {
        let document = serde_json::to_string(ip)?;
        let existed = self
            .conn
            .query_row(
                "SELECT 1 FROM ips WHERE name = ?1",
                params![ip.name.as_str()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        self.conn.execute(
            "INSERT INTO ips (name, category, technology, document)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                category = excluded.category,
                technology = excluded.technology,
                document = excluded.document",
            params![ip.name.as_str(), ip.category, ip.technology, document],
        )?;

        debug!(name = %ip.name, replaced = existed, "upserted catalog record");
        Ok(if existed {
            Upsert::Replaced
        } else {
            Upsert::Inserted
        })
    }

    /// Get an IP by exact name
    pub fn find_by_name(&self, name: &str) -> Result<Option<IpRecord>, StoreError> {
        let document: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM ips WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        document
            .map(|doc| serde_json::from_str(&doc).map_err(StoreError::from))
            .transpose()
    }

    /// List IPs matching `filter` in insertion order
    pub fn find_many(&self, filter: &StoreFilter) -> Result<Vec<IpRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT document FROM ips
             WHERE (?1 IS NULL OR category = ?1)
               AND (?2 IS NULL OR technology = ?2)
             ORDER BY rowid",
        )?;

        let documents = stmt.query_map(
            params![filter.category.as_deref(), filter.technology.as_deref()],
            |row| row.get::<_, String>(0),
        )?;

        let mut ips = Vec::new();
        for document in documents {
            ips.push(serde_json::from_str(&document?)?);
        }
        Ok(ips)
    }

    /// Number of IPs in the catalog
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM ips", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
