//! SQLite store bootstrap.
//!
//! # Invariants
//! - Every connection handed out has `foreign_keys=ON` and a busy timeout.
//! - The schema script runs on every `Store::open`; it only uses
//!   `CREATE ... IF NOT EXISTS`, so reapplying it is a no-op.
//! - No connection is shared between requests. Each unit of work opens its
//!   own, so all coordination happens inside SQLite.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rusqlite::Connection;

use crate::config::DatabaseSection;

const SCHEMA_SQL: &str = include_str!("schema.sql");

pub type StoreResult<T> = std::result::Result<T, rusqlite::Error>;

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Store {
    pub fn open(cfg: &DatabaseSection) -> StoreResult<Self> {
        Self::open_path(&cfg.path, Duration::from_millis(cfg.busy_timeout_ms))
    }

    /// Open the database file, verify connectivity and apply the schema.
    pub fn open_path(path: impl AsRef<Path>, busy_timeout: Duration) -> StoreResult<Self> {
        let started_at = Instant::now();
        let store = Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout,
        };

        let conn = store.connect().map_err(|e| {
            tracing::error!(path = %store.path.display(), error = %e, "store open failed");
            e
        })?;
        let journal_mode: String =
            conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
        conn.execute_batch(SCHEMA_SQL).map_err(|e| {
            tracing::error!(path = %store.path.display(), error = %e, "schema migration failed");
            e
        })?;

        tracing::info!(
            path = %store.path.display(),
            journal_mode = %journal_mode,
            duration_ms = started_at.elapsed().as_millis() as u64,
            "store ready"
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fresh connection for one unit of work.
    pub fn connect(&self) -> StoreResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}
