//! SQLite roster with an FTS5 trigram search index.
//!
//! # Schema
//!
//! - `advocates`: one row per record, `id` is the stable sort key.
//! - `advocates_search`: FTS5 table (`tokenize = 'trigram'`) holding the
//!   case-folded first name, last name, city and degree of every advocate,
//!   with `rowid = advocates.id`. Fields stay in separate columns so a term
//!   can never match across a field boundary. The tokenizer runs with
//!   `case_sensitive 1`: rows and terms are folded by
//!   [`fold_case`] before they reach SQLite, and no second fold is applied.
//!
//! Schema version 2 switched the tokenizer to `case_sensitive 1`; opening a
//! version 1 database rebuilds the search index from `advocates`.
//!
//! # Index use
//!
//! Terms of three or more characters compile to an FTS5 phrase `MATCH`,
//! which the trigram index answers directly. Shorter terms cannot be split
//! into trigrams; they compile to an escaped `LIKE` over the folded columns,
//! which scans the index table. That fallback is reported by
//! [`CompiledFilter::index`] and logged at `debug`.
//!
//! # Concurrency
//!
//! `rusqlite::Connection` is blocking and not `Sync`, so the store keeps a
//! small pool of connections behind a semaphore and runs every statement on
//! `spawn_blocking`. Dropping a request future never leaks a connection: the
//! blocking task finishes and checks it back in.

use super::{AdvocateStore, StoreError};
use crate::query::{fold_case, Predicate, SearchField};
use crate::types::{Advocate, AdvocateId, NewAdvocate};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;

const SCHEMA_VERSION: i64 = 2;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS advocates (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name          TEXT    NOT NULL,
    last_name           TEXT    NOT NULL,
    city                TEXT    NOT NULL,
    degree              TEXT    NOT NULL,
    specialties         TEXT    NOT NULL DEFAULT '[]',
    years_of_experience INTEGER NOT NULL CHECK (years_of_experience >= 0),
    phone_number        INTEGER NOT NULL,
    created_at          TEXT    NOT NULL
);

CREATE VIRTUAL TABLE IF NOT EXISTS advocates_search USING fts5(
    first_name,
    last_name,
    city,
    degree,
    tokenize = 'trigram case_sensitive 1'
);
";

const SELECT_COLUMNS: &str = "a.id, a.first_name, a.last_name, a.city, a.degree, \
     a.specialties, a.years_of_experience, a.phone_number, a.created_at";

/// Shortest term the trigram tokenizer can look up.
const TRIGRAM_MIN_CHARS: usize = 3;

// ---------------------------------------------------------------------------
// Predicate compilation
// ---------------------------------------------------------------------------

/// How a compiled filter reaches the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexUse {
    /// No filter; the primary key order is walked directly.
    Unfiltered,
    /// Answered by the trigram index.
    Trigram,
    /// Term too short for trigrams; unindexed `LIKE` scan.
    Scan,
}

/// A [`Predicate`] compiled to a SQL `WHERE` fragment over `advocates a`.
///
/// The same value is spliced into both the page query and the count query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFilter {
    pub clause: String,
    pub params: Vec<String>,
    pub index: IndexUse,
}

impl CompiledFilter {
    pub fn compile(predicate: &Predicate) -> Self {
        let (fields, term) = match predicate {
            Predicate::MatchAll => {
                return Self {
                    clause: "1".to_string(),
                    params: Vec::new(),
                    index: IndexUse::Unfiltered,
                }
            }
            Predicate::SubstringOr { fields, term } => (fields, term),
        };

        if fields.is_empty() {
            return Self {
                clause: "0".to_string(),
                params: Vec::new(),
                index: IndexUse::Unfiltered,
            };
        }

        if term.char_len() >= TRIGRAM_MIN_CHARS {
            let phrase = term.fts_phrase();
            let expr = if fields.len() == SearchField::ALL.len() {
                phrase
            } else {
                let columns: Vec<&str> = fields.iter().map(|f| f.column()).collect();
                format!("{{{}}} : {phrase}", columns.join(" "))
            };
            return Self {
                clause: "a.id IN (SELECT rowid FROM advocates_search \
                         WHERE advocates_search MATCH ?)"
                    .to_string(),
                params: vec![expr],
                index: IndexUse::Trigram,
            };
        }

        let pattern = term.like_pattern();
        let likes: Vec<String> = fields
            .iter()
            .map(|f| format!("{} LIKE ? ESCAPE '\\'", f.column()))
            .collect();
        Self {
            clause: format!(
                "a.id IN (SELECT rowid FROM advocates_search WHERE {})",
                likes.join(" OR ")
            ),
            params: vec![pattern; fields.len()],
            index: IndexUse::Scan,
        }
    }
}

// ---------------------------------------------------------------------------
// Connection pool
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Pool {
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    /// `None` for a private in-memory database, which cannot be reopened.
    path: Option<PathBuf>,
    busy_timeout: Duration,
}

impl Pool {
    fn checkout(&self) -> Result<Connection, StoreError> {
        if let Some(conn) = self.idle.lock().unwrap_or_else(PoisonError::into_inner).pop() {
            return Ok(conn);
        }
        // A connection is only missing if a task panicked while holding it.
        match &self.path {
            Some(path) => {
                tracing::warn!(path = %path.display(), "replacing lost sqlite connection");
                open_connection(path, self.busy_timeout)
            }
            None => Err(StoreError::PoolClosed),
        }
    }

    fn checkin(&self, conn: Connection) {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).push(conn);
    }
}

/// SQLite-backed [`AdvocateStore`]. Clones share one connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Arc<Pool>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` with `pool_size`
    /// connections. The path `:memory:` opens a private database with a
    /// single connection.
    pub async fn open(
        path: impl AsRef<Path>,
        pool_size: usize,
        busy_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let in_memory = path.as_os_str() == ":memory:";
        let size = if in_memory { 1 } else { pool_size.max(1) };

        let open_path = path.clone();
        let conns = tokio::task::spawn_blocking(move || {
            if !in_memory {
                if let Some(parent) = open_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|source| StoreError::Directory {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
            }
            let first = open_connection(&open_path, busy_timeout)?;
            migrate(&first)?;
            let mut conns = vec![first];
            for _ in 1..size {
                conns.push(open_connection(&open_path, busy_timeout)?);
            }
            Ok::<_, StoreError>(conns)
        })
        .await??;

        tracing::debug!(path = %path.display(), pool_size = size, "sqlite store opened");

        Ok(Self {
            pool: Arc::new(Pool {
                idle: Mutex::new(conns),
                permits: Arc::new(Semaphore::new(size)),
                path: (!in_memory).then_some(path),
                busy_timeout,
            }),
        })
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:", 1, Duration::from_secs(5)).await
    }

    /// Ingestion path: insert records and their search-index rows in one
    /// transaction, returning them with their assigned identity.
    pub async fn import(&self, records: Vec<NewAdvocate>) -> Result<Vec<Advocate>, StoreError> {
        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            let now = Utc::now();
            let created = now.to_rfc3339_opts(SecondsFormat::Nanos, true);
            let mut imported = Vec::with_capacity(records.len());
            {
                let mut insert = tx.prepare_cached(
                    "INSERT INTO advocates (first_name, last_name, city, degree, specialties, \
                     years_of_experience, phone_number, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;
                let mut index = tx.prepare_cached(
                    "INSERT INTO advocates_search (rowid, first_name, last_name, city, degree) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;
                for record in records {
                    let phone = i64::try_from(record.phone_number).map_err(|_| {
                        StoreError::InvalidRecord(format!(
                            "phone number {} out of range",
                            record.phone_number
                        ))
                    })?;
                    let specialties = serde_json::to_string(&record.specialties)
                        .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

                    insert.execute(params![
                        record.first_name,
                        record.last_name,
                        record.city,
                        record.degree,
                        specialties,
                        i64::from(record.years_of_experience),
                        phone,
                        created,
                    ])?;
                    let id = tx.last_insert_rowid();
                    index.execute(params![
                        id,
                        fold_case(&record.first_name),
                        fold_case(&record.last_name),
                        fold_case(&record.city),
                        fold_case(&record.degree),
                    ])?;
                    imported.push(record.into_advocate(AdvocateId(id), now));
                }
            }
            tx.commit()?;
            Ok(imported)
        })
        .await
    }

    async fn with_conn<T, F>(&self, task: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let permit = Arc::clone(&self.pool.permits)
            .acquire_owned()
            .await
            .map_err(|_| StoreError::PoolClosed)?;
        let pool = Arc::clone(&self.pool);

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let conn = pool.checkout()?;
            let result = task(&conn);
            pool.checkin(conn);
            result
        })
        .await?
    }
}

impl AdvocateStore for SqliteStore {
    async fn fetch_page(
        &self,
        predicate: &Predicate,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Advocate>, StoreError> {
        let filter = CompiledFilter::compile(predicate);
        if filter.index == IndexUse::Scan {
            tracing::debug!(
                reason = "short_term",
                term_chars = predicate.term().map_or(0, |t| t.char_len()),
                "search term shorter than a trigram; falling back to unindexed scan"
            );
        }

        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {SELECT_COLUMNS} FROM advocates a WHERE {} \
                 ORDER BY a.id ASC LIMIT ? OFFSET ?",
                filter.clause
            );
            let mut values: Vec<Value> = filter.params.into_iter().map(Value::Text).collect();
            values.push(Value::Integer(i64::from(limit)));
            values.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));

            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), advocate_from_row)?;
            let advocates = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(advocates)
        })
        .await
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let filter = CompiledFilter::compile(predicate);

        self.with_conn(move |conn| {
            let sql = format!("SELECT COUNT(*) FROM advocates a WHERE {}", filter.clause);
            let mut stmt = conn.prepare_cached(&sql)?;
            let n: i64 = stmt.query_row(params_from_iter(filter.params.iter()), |row| row.get(0))?;
            Ok(u64::try_from(n).unwrap_or(0))
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Connection helpers
// ---------------------------------------------------------------------------

fn open_connection(path: &Path, busy_timeout: Duration) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA temp_store = MEMORY;
         PRAGMA foreign_keys = ON;",
    )?;
    Ok(conn)
}

fn migrate(conn: &Connection) -> Result<(), StoreError> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.unchecked_transaction()?;
    if version >= 1 {
        tx.execute_batch("DROP TABLE IF EXISTS advocates_search;")?;
    }
    tx.execute_batch(SCHEMA)?;
    let reindexed = if version >= 1 { rebuild_search_index(&tx)? } else { 0 };
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;

    tracing::info!(from = version, to = SCHEMA_VERSION, reindexed, "sqlite schema migrated");
    Ok(())
}

/// Refill `advocates_search` from `advocates`, folding every row.
fn rebuild_search_index(conn: &Connection) -> Result<usize, StoreError> {
    let mut select =
        conn.prepare("SELECT id, first_name, last_name, city, degree FROM advocates ORDER BY id")?;
    let mut insert = conn.prepare(
        "INSERT INTO advocates_search (rowid, first_name, last_name, city, degree) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;

    let mut rows = select.query([])?;
    let mut n = 0;
    while let Some(row) = rows.next()? {
        let id: i64 = row.get(0)?;
        let first: String = row.get(1)?;
        let last: String = row.get(2)?;
        let city: String = row.get(3)?;
        let degree: String = row.get(4)?;
        insert.execute(params![
            id,
            fold_case(&first),
            fold_case(&last),
            fold_case(&city),
            fold_case(&degree),
        ])?;
        n += 1;
    }
    Ok(n)
}

fn advocate_from_row(row: &Row<'_>) -> rusqlite::Result<Advocate> {
    fn conversion<E>(idx: usize, ty: Type) -> impl FnOnce(E) -> rusqlite::Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |e| rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(e))
    }

    let specialties: String = row.get(5)?;
    let years: i64 = row.get(6)?;
    let phone: i64 = row.get(7)?;
    let created_at: String = row.get(8)?;

    Ok(Advocate {
        id: AdvocateId(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        city: row.get(3)?,
        degree: row.get(4)?,
        specialties: serde_json::from_str(&specialties).map_err(conversion(5, Type::Text))?,
        years_of_experience: u32::try_from(years).map_err(conversion(6, Type::Integer))?,
        phone_number: u64::try_from(phone).map_err(conversion(7, Type::Integer))?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(conversion(8, Type::Text))?
            .with_timezone(&Utc),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
