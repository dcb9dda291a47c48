//! Store backend enum for static dispatch over store implementations.
//!
//! Wraps [`InMemory`] and [`SqliteStore`] with [`Staging`] and
//! [`Workspace`] delegation.

use crate::config::{GatewayConfig, StoreBackendKind};
use anyhow::Result;
use rcore::{ConfigKey, Document, Fragment, FragmentKind, InMemory, Role, Staging, Workspace};
use sqlite::SqliteStore;
use std::path::Path;

/// Store backend selected from gateway configuration.
#[derive(Debug)]
pub enum StoreBackend {
    /// Volatile in-memory store.
    InMemory(InMemory),
    /// SQLite-backed durable store.
    Sqlite(SqliteStore),
}

impl StoreBackend {
    /// In-memory variant.
    pub fn in_memory() -> Self {
        Self::InMemory(InMemory::new())
    }

    /// SQLite variant at the given path.
    pub fn sqlite(path: &Path) -> Result<Self> {
        Ok(Self::Sqlite(SqliteStore::open(path)?))
    }

    /// Construct the backend named by the configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        match config.store.backend {
            StoreBackendKind::InMemory => {
                tracing::info!("using in-memory store");
                Ok(Self::in_memory())
            }
            StoreBackendKind::Sqlite => {
                let path = config.store_path();
                tracing::info!("using sqlite store at {}", path.display());
                Self::sqlite(&path)
            }
        }
    }
}

impl Staging for StoreBackend {
    fn append(
        &self,
        session: &str,
        kind: FragmentKind,
        role: Option<Role>,
        content: &str,
    ) -> Result<Fragment> {
        match self {
            Self::InMemory(s) => s.append(session, kind, role, content),
            Self::Sqlite(s) => s.append(session, kind, role, content),
        }
    }

    fn fragments(&self, session: &str) -> Result<Vec<Fragment>> {
        match self {
            Self::InMemory(s) => s.fragments(session),
            Self::Sqlite(s) => s.fragments(session),
        }
    }

    fn clear(&self, session: &str, through: Option<u64>) -> Result<usize> {
        match self {
            Self::InMemory(s) => s.clear(session, through),
            Self::Sqlite(s) => s.clear(session, through),
        }
    }
}

impl Workspace for StoreBackend {
    fn set(&self, session: &str, key: ConfigKey, value: &str) -> Result<i64> {
        match self {
            Self::InMemory(s) => s.set(session, key, value),
            Self::Sqlite(s) => s.set(session, key, value),
        }
    }

    fn get(&self, session: &str, key: ConfigKey) -> Result<Option<String>> {
        match self {
            Self::InMemory(s) => s.get(session, key),
            Self::Sqlite(s) => s.get(session, key),
        }
    }

    fn add_document(&self, session: &str, path: &str, content: &str) -> Result<i64> {
        match self {
            Self::InMemory(s) => s.add_document(session, path, content),
            Self::Sqlite(s) => s.add_document(session, path, content),
        }
    }

    fn documents(&self, session: &str) -> Result<Vec<Document>> {
        match self {
            Self::InMemory(s) => s.documents(session),
            Self::Sqlite(s) => s.documents(session),
        }
    }

    fn reset(&self, session: &str) -> Result<()> {
        match self {
            Self::InMemory(s) => s.reset(session),
            Self::Sqlite(s) => s.reset(session),
        }
    }
}
