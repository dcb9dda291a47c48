//! SQLite-backed stores for the relay gateway.
//!
//! Provides [`SqliteStore`], a durable [`Staging`](rcore::Staging) and
//! [`Workspace`](rcore::Workspace) implementation. Tables are created on
//! open, idempotently, so the first write to a session needs no setup.
//!
//! All SQL lives in `sql/*.sql` files, loaded via `include_str!`.

use anyhow::Result;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

mod sql;
mod staging;
mod workspace;

/// SQLite-backed fragment and workspace store.
///
/// Wraps a `rusqlite::Connection` in a `Mutex`; every trait call runs
/// under the lock, so reads observe all completed writes.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Self::with_connection(conn)
    }

    /// Create an in-memory database (useful for testing).
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(sql::SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}
