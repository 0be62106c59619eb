//! advodir-client: roster API client for advodir.
//!
//! [`HttpFetcher`] talks to `GET /api/advocates`; [`QueryCache`] sits in
//! front of any [`Fetch`] implementation, deduplicating concurrent requests
//! per key and retaining the last good page; [`Pager`] tracks the page cursor.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod pager;

pub use cache::{CacheResult, QueryCache};
pub use error::ClientError;
pub use fetch::{Fetch, HttpFetcher};
pub use pager::Pager;
