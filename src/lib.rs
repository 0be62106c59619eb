//! advodir: advocate directory search service.
//!
//! Exposes the HTTP layer so that integration tests can build the router
//! directly. The search pipeline itself lives in [`advodir_core`], the
//! client side in [`advodir_client`].
//!
//! # Architecture
//!
//! ```text
//! HttpFetcher ──► GET /api/advocates ──► SearchExecutor ──► AdvocateStore
//!      ▲                                                      (sqlite | memory)
//! QueryCache / Pager
//! ```

pub mod server;

pub use server::{router, serve};
