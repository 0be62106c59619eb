//! Store: the persisted advocate roster.
//!
//! The store is the single source of truth; the executor reads from it and
//! never caches. Two implementations share the [`AdvocateStore`] contract:
//!
//! - [`SqliteStore`]: relational table plus a trigram search index.
//! - [`MemoryStore`]: a `Vec` in id order, for tests and small rosters.
//!
//! Both order results by identifier ascending and evaluate a [`Predicate`]
//! with exactly the semantics of [`Predicate::matches`].

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{CompiledFilter, IndexUse, SqliteStore};

use crate::config::{Backend, StoreConfig};
use crate::query::Predicate;
use crate::types::{Advocate, NewAdvocate};
use std::future::Future;
use std::path::{Path, PathBuf};

/// Errors raised by a store round-trip.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("connection pool is closed")]
    PoolClosed,

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("cannot create database directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read roster {path}: {source}")]
    Roster {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse roster {path}: {source}")]
    RosterFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only access to the roster, as needed by the search executor.
///
/// Implementations must be cheap to share across concurrent requests and
/// must not hold per-request state.
pub trait AdvocateStore: Send + Sync {
    /// Up to `limit` records matching `predicate`, in identifier order,
    /// after skipping the first `offset` matches.
    fn fetch_page(
        &self,
        predicate: &Predicate,
        limit: u32,
        offset: u64,
    ) -> impl Future<Output = Result<Vec<Advocate>, StoreError>> + Send;

    /// Number of records matching `predicate`, ignoring pagination.
    fn count(&self, predicate: &Predicate) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// AnyStore
// ---------------------------------------------------------------------------

/// A store chosen at runtime from [`StoreConfig::backend`].
#[derive(Debug, Clone)]
pub enum AnyStore {
    Sqlite(SqliteStore),
    Memory(MemoryStore),
}

impl AnyStore {
    /// Ingestion path: append records, assigning identifiers and creation
    /// timestamps. Not reachable from the search surface.
    pub async fn import(&self, records: Vec<NewAdvocate>) -> Result<Vec<Advocate>, StoreError> {
        match self {
            AnyStore::Sqlite(s) => s.import(records).await,
            AnyStore::Memory(s) => s.import(records),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            AnyStore::Sqlite(_) => Backend::Sqlite,
            AnyStore::Memory(_) => Backend::Memory,
        }
    }
}

impl AdvocateStore for AnyStore {
    async fn fetch_page(
        &self,
        predicate: &Predicate,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Advocate>, StoreError> {
        match self {
            AnyStore::Sqlite(s) => s.fetch_page(predicate, limit, offset).await,
            AnyStore::Memory(s) => s.fetch_page(predicate, limit, offset).await,
        }
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        match self {
            AnyStore::Sqlite(s) => s.count(predicate).await,
            AnyStore::Memory(s) => s.count(predicate).await,
        }
    }
}

/// Open the configured backend. The memory backend is populated from
/// `store.seed` when one is set.
pub async fn open_store(config: &StoreConfig) -> Result<AnyStore, StoreError> {
    match config.backend {
        Backend::Sqlite => {
            let store = SqliteStore::open(&config.path, config.pool_size, config.timeout()).await?;
            Ok(AnyStore::Sqlite(store))
        }
        Backend::Memory => {
            let store = MemoryStore::new();
            if let Some(seed) = config.seed_path() {
                let records = load_roster(seed)?;
                let imported = store.import(records)?;
                tracing::info!(seed = %seed.display(), count = imported.len(), "memory store seeded");
            }
            Ok(AnyStore::Memory(store))
        }
    }
}

/// Read a JSON array of [`NewAdvocate`] records from disk.
pub fn load_roster(path: &Path) -> Result<Vec<NewAdvocate>, StoreError> {
    let bytes = std::fs::read(path).map_err(|source| StoreError::Roster {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::RosterFormat {
        path: path.to_path_buf(),
        source,
    })
}
