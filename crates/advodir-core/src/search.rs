//! Search executor: one paginated roster search as a single async unit.
//!
//! [`SearchExecutor::execute`] builds one [`Predicate`], hands the same value
//! to the page fetch and to the count, runs both concurrently, and assembles a
//! [`SearchResponse`] only once both have succeeded. Either step failing (or
//! exceeding the configured timeout) fails the whole search; there is never a
//! page without its totals.
//!
//! The two steps are not wrapped in one snapshot. A write landing between
//! them can make `total_items` disagree with `data` for that one response;
//! this is accepted and not corrected.

use crate::query::Predicate;
use crate::store::{AdvocateStore, StoreError};
use crate::types::{total_pages, SearchRequest, SearchResponse};
use std::future::Future;
use std::time::Duration;

/// A failed search. Carries no partial result.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("store did not answer within {0:?}")]
    Timeout(Duration),
}

/// Runs searches against an explicitly supplied store.
///
/// Holds no per-request state; share one instance (behind an `Arc`) across
/// every concurrent request. Dropping an in-flight [`execute`] future is
/// always safe.
///
/// [`execute`]: SearchExecutor::execute
#[derive(Debug, Clone)]
pub struct SearchExecutor<S> {
    store: S,
    timeout: Duration,
}

impl<S: AdvocateStore> SearchExecutor<S> {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(store: S) -> Self {
        Self {
            store,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Bound each store step by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[tracing::instrument(
        name = "search",
        skip_all,
        fields(page = request.page(), page_size = request.page_size(), term_len = request.search().len())
    )]
    pub async fn execute(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let predicate = Predicate::build(request.search());

        let fetch = self.bounded(self.store.fetch_page(
            &predicate,
            request.page_size(),
            request.offset(),
        ));
        let count = self.bounded(self.store.count(&predicate));
        let (data, total_items) = tokio::try_join!(fetch, count).inspect_err(|e| {
            tracing::warn!(error = %e, "search failed");
        })?;

        let response = SearchResponse {
            data,
            total_pages: total_pages(total_items, request.page_size()),
            total_items,
        };
        tracing::debug!(
            returned = response.data.len(),
            total_items = response.total_items,
            total_pages = response.total_pages,
            "search complete"
        );
        Ok(response)
    }

    async fn bounded<T>(
        &self,
        step: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, SearchError> {
        match tokio::time::timeout(self.timeout, step).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(SearchError::Timeout(self.timeout)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
