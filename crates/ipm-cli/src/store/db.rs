//! SQLite state database
//!
//! Tracks installed IPs. The same IP may be installed under several IP roots,
//! so records are keyed by `(name, ip_root)`.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Installed IP record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledIp {
    pub name: String,
    pub ip_root: PathBuf,
    pub version: String,
    pub sha256: String,
    pub technology: String,
    pub category: String,
    pub installed_at: i64,
}

impl InstalledIp {
    /// Directory holding this IP's files.
    pub fn path(&self) -> PathBuf {
        self.ip_root.join(&self.name)
    }

    /// Exact match on whichever of `category` and `technology` are given.
    pub fn matches(&self, category: Option<&str>, technology: Option<&str>) -> bool {
        category.is_none_or(|c| self.category == c)
            && technology.is_none_or(|t| self.technology == t)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            ip_root: PathBuf::from(row.get::<_, String>(1)?),
            version: row.get(2)?,
            sha256: row.get(3)?,
            technology: row.get(4)?,
            category: row.get(5)?,
            installed_at: row.get(6)?,
        })
    }
}

const COLUMNS: &str = "name, ip_root, version, sha256, technology, category, installed_at";

/// State database for tracking installations
#[derive(Debug)]
pub struct StateDb {
    conn: Connection,
}

impl StateDb {
    /// Open or create the state database at `path`
    pub fn open_at(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS installed_ips (
                name TEXT NOT NULL,
                ip_root TEXT NOT NULL,
                version TEXT NOT NULL,
                sha256 TEXT NOT NULL,
                technology TEXT NOT NULL,
                category TEXT NOT NULL,
                installed_at INTEGER NOT NULL,
                PRIMARY KEY (name, ip_root)
            );
            ",
        )?;
        Ok(())
    }

    /// Record an installation, replacing any earlier one at the same root
    pub fn record_install(&self, ip: &InstalledIp) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO installed_ips
             (name, ip_root, version, sha256, technology, category, installed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                ip.name,
                ip.ip_root.to_string_lossy(),
                ip.version,
                ip.sha256,
                ip.technology,
                ip.category,
                ip.installed_at
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, name: &str, ip_root: &Path) -> Result<Option<InstalledIp>, DbError> {
        let sql = format!("SELECT {COLUMNS} FROM installed_ips WHERE name = ?1 AND ip_root = ?2");
        let ip = self
            .conn
            .query_row(
                &sql,
                params![name, ip_root.to_string_lossy()],
                InstalledIp::from_row,
            )
            .optional()?;
        Ok(ip)
    }

    /// Every installation, optionally restricted to one IP root
    pub fn list(&self, ip_root: Option<&Path>) -> Result<Vec<InstalledIp>, DbError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM installed_ips
             WHERE (?1 IS NULL OR ip_root = ?1)
             ORDER BY name, ip_root"
        );
        let root = ip_root.map(|p| p.to_string_lossy().into_owned());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![root], InstalledIp::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// All installations of `name`, across IP roots
    pub fn find_by_name(&self, name: &str) -> Result<Vec<InstalledIp>, DbError> {
        let sql = format!("SELECT {COLUMNS} FROM installed_ips WHERE name = ?1 ORDER BY ip_root");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![name], InstalledIp::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Installations recorded under any root other than `ip_root`
    pub fn list_outside(&self, ip_root: &Path) -> Result<Vec<InstalledIp>, DbError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM installed_ips WHERE ip_root != ?1 ORDER BY name, ip_root"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![ip_root.to_string_lossy()], InstalledIp::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Forget an installation. Returns whether a record existed.
    pub fn remove(&self, name: &str, ip_root: &Path) -> Result<bool, DbError> {
        let removed = self.conn.execute(
            "DELETE FROM installed_ips WHERE name = ?1 AND ip_root = ?2",
            params![name, ip_root.to_string_lossy()],
        )?;
        Ok(removed > 0)
    }
}
