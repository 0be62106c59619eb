//! advodir-core: advocate directory core library.
//!
//! This crate exposes the search pipeline layers as public modules, plus the
//! shared types used across all layers.
//!
//! # Architecture
//!
//! ```text
//! SearchRequest ──► Query builder ──► Predicate ──┬──► Store::fetch_page ──┐
//!                                                 └──► Store::count ───────┴──► SearchResponse
//! ```
//!
//! The executor owns no state beyond its store handle and a timeout, so a
//! single instance serves every concurrent request.

pub mod config;
pub mod query;
pub mod search;
pub mod store;
pub mod types;

pub use query::{Predicate, SearchField, SearchTerm};
pub use search::{SearchError, SearchExecutor};
pub use store::{AdvocateStore, AnyStore, MemoryStore, SqliteStore, StoreError};
pub use types::{Advocate, AdvocateId, NewAdvocate, SearchRequest, SearchResponse};
