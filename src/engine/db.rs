//! SQLite bootstrap: schema and connection handling.

use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::path::PathBuf;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS rentals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reference TEXT NOT NULL UNIQUE,
    customer TEXT NOT NULL,
    vehicle TEXT,
    status TEXT NOT NULL DEFAULT 'scheduled',
    payment_status TEXT NOT NULL DEFAULT 'pending',
    start_date TEXT,
    end_date TEXT,
    started_at TEXT,
    started_by TEXT,
    completed_at TEXT,
    completed_by TEXT,
    cancelled_at TEXT,
    cancelled_by TEXT,
    cancellation_reason TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rental_id INTEGER NOT NULL REFERENCES rentals(id),
    action TEXT NOT NULL,
    actor TEXT NOT NULL,
    old_status TEXT NOT NULL,
    new_status TEXT NOT NULL,
    reason TEXT,
    metadata TEXT NOT NULL DEFAULT '{}',
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_audit_rental ON audit_log(rental_id);
";

pub struct Db;

impl Db {
    /// Creates the store and its schema.
    ///
    /// # Errors
    /// Returns an error if the directory or database cannot be created.
    pub fn init() -> Result<Connection> {
        let path = Self::path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }
        let conn = Connection::open(&path)
            .with_context(|| format!("Cannot open {}", path.display()))?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    /// Opens an existing store.
    ///
    /// # Errors
    /// Returns an error if the store has not been initialized.
    pub fn connect() -> Result<Connection> {
        let path = Self::path();
        if !path.exists() {
            bail!("No rental store found. Run `rentdesk init` first.");
        }
        Connection::open(&path).with_context(|| format!("Cannot open {}", path.display()))
    }

    /// Opens (and initializes) a store at an explicit path. Used by tests.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn connect_at(path: &std::path::Path) -> Result<Connection> {
        let conn = Connection::open(path)
            .with_context(|| format!("Cannot open {}", path.display()))?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    fn path() -> PathBuf {
        std::env::var("RENTDESK_DB").map_or_else(
            |_| PathBuf::from(".rentdesk/rentals.db"),
            PathBuf::from,
        )
    }
}
