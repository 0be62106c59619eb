//! Scripted stand-ins for the fetcher and the store.
//!
//! [`GatedFetcher`] holds every fetch until the test releases it, so a
//! harness can observe the cache while requests are in flight.
//! [`FlakyStore`] wraps a real store and fails or stalls on demand.

use advodir_client::{ClientError, Fetch};
use advodir_core::{
    Advocate, AdvocateStore, Predicate, SearchRequest, SearchResponse, StoreError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ---------------------------------------------------------------------------
// GatedFetcher
// ---------------------------------------------------------------------------

/// Answers each request with an empty page whose `total_items` is the page
/// number, but only after [`GatedFetcher::release`] is called for that page.
#[derive(Default)]
pub struct GatedFetcher {
    gates: Mutex<HashMap<u64, Arc<Notify>>>,
    calls: Mutex<Vec<SearchRequest>>,
    fail_next: AtomicBool,
}

impl GatedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn gate(&self, page: u64) -> Arc<Notify> {
        self.gates
            .lock()
            .unwrap()
            .entry(page)
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    /// Let the fetch for `page` complete. Stores a permit if nobody is
    /// waiting yet.
    pub fn release(&self, page: u64) {
        self.gate(page).notify_one();
    }

    /// Make the next completed fetch answer with a 500.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<SearchRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetch for GatedFetcher {
    async fn fetch(&self, request: &SearchRequest) -> Result<SearchResponse, ClientError> {
        self.calls.lock().unwrap().push(request.clone());
        let gate = self.gate(request.page());
        gate.notified().await;

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                message: Some("Failed to fetch advocates".into()),
            });
        }
        Ok(SearchResponse {
            data: vec![],
            total_pages: 5,
            total_items: request.page(),
        })
    }
}

// ---------------------------------------------------------------------------
// FlakyStore
// ---------------------------------------------------------------------------

/// Failure mode injected into a [`FlakyStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Healthy,
    FailFetch,
    FailCount,
    StallCount,
}

pub struct FlakyStore<S> {
    inner: S,
    fault: Mutex<Fault>,
    fetches: AtomicUsize,
}

impl<S: AdvocateStore> FlakyStore<S> {
    pub fn new(inner: S, fault: Fault) -> Self {
        Self {
            inner,
            fault: Mutex::new(fault),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn set_fault(&self, fault: Fault) {
        *self.fault.lock().unwrap() = fault;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn fault(&self) -> Fault {
        *self.fault.lock().unwrap()
    }
}

impl<S: AdvocateStore> AdvocateStore for FlakyStore<S> {
    async fn fetch_page(
        &self,
        predicate: &Predicate,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Advocate>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fault() == Fault::FailFetch {
            return Err(StoreError::PoolClosed);
        }
        self.inner.fetch_page(predicate, limit, offset).await
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        match self.fault() {
            Fault::FailCount => Err(StoreError::InvalidRecord("count exploded".into())),
            Fault::StallCount => std::future::pending().await,
            _ => self.inner.count(predicate).await,
        }
    }
}
