//! Keyed query cache with request deduplication.
//!
//! Every [`SearchRequest`] is its own key. At most one fetch per key is in
//! flight: concurrent [`QueryCache::get`] calls for the same key await one
//! shared future, while calls for different keys never wait on each other.
//!
//! While a new page loads, [`QueryCache::placeholder`] hands back the most
//! recent successful response so a caller can keep showing it. Failures are
//! returned to every waiter and then forgotten; the next `get` fetches again.
//!
//! # State per key
//!
//! ```text
//!   (absent) ──get──► InFlight ──ok──► Ready
//!      ▲                 │
//!      └──err / cancel───┘
//! ```
//!
//! A cancelled or superseded fetch that still completes never writes into
//! the map: each in-flight slot carries a generation number and only the
//! matching generation may settle it.
//!
//! Ready entries are bounded by [`QueryCache::with_capacity`]; past the bound
//! the least recently used one is evicted. In-flight entries and the
//! placeholder are never evicted.

use crate::error::ClientError;
use crate::fetch::Fetch;
use advodir_core::{SearchRequest, SearchResponse};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What every waiter on a key receives.
pub type CacheResult = Result<Arc<SearchResponse>, Arc<ClientError>>;

type SharedFetch = Shared<BoxFuture<'static, CacheResult>>;

enum Slot {
    InFlight { generation: u64, fetch: SharedFetch },
    Ready(Arc<SearchResponse>),
}

#[derive(Default)]
struct State {
    slots: HashMap<SearchRequest, Slot>,
    /// Keys of `Ready` slots, least recently used first.
    recency: VecDeque<SearchRequest>,
    capacity: usize,
    last_good: Option<Arc<SearchResponse>>,
    next_generation: u64,
}

impl State {
    fn touch(&mut self, request: &SearchRequest) {
        if let Some(pos) = self.recency.iter().position(|k| k == request) {
            if let Some(key) = self.recency.remove(pos) {
                self.recency.push_back(key);
            }
        }
    }

    fn store_ready(&mut self, request: &SearchRequest, response: Arc<SearchResponse>) {
        self.slots.insert(request.clone(), Slot::Ready(response));
        self.recency.retain(|k| k != request);
        self.recency.push_back(request.clone());
        while self.recency.len() > self.capacity {
            let Some(oldest) = self.recency.pop_front() else {
                break;
            };
            self.slots.remove(&oldest);
            tracing::trace!(page = oldest.page(), "evicted cached page");
        }
    }
}

/// Deduplicating cache in front of a [`Fetch`] implementation. Clones share
/// the same entries.
pub struct QueryCache<F> {
    fetcher: Arc<F>,
    state: Arc<Mutex<State>>,
}

impl<F> Clone for QueryCache<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            state: Arc::clone(&self.state),
        }
    }
}

impl<F: Fetch + 'static> QueryCache<F> {
    /// Ready entries kept by [`QueryCache::new`].
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(fetcher: F) -> Self {
        Self::with_capacity(fetcher, Self::DEFAULT_CAPACITY)
    }

    /// A cache keeping at most `capacity` completed responses (minimum 1).
    pub fn with_capacity(fetcher: F, capacity: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            state: Arc::new(Mutex::new(State {
                capacity: capacity.max(1),
                ..State::default()
            })),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The response for `request`, served from cache, joined onto an
    /// in-flight fetch, or fetched now.
    pub async fn get(&self, request: &SearchRequest) -> CacheResult {
        let (generation, fetch) = {
            let mut state = self.lock();
            match state.slots.get(request) {
                Some(Slot::Ready(response)) => {
                    let response = Arc::clone(response);
                    state.touch(request);
                    tracing::trace!(page = request.page(), "cache hit");
                    return Ok(response);
                }
                Some(Slot::InFlight { generation, fetch }) => (*generation, fetch.clone()),
                None => {
                    state.next_generation += 1;
                    let generation = state.next_generation;
                    let fetch = self.start(request.clone());
                    state.slots.insert(
                        request.clone(),
                        Slot::InFlight {
                            generation,
                            fetch: fetch.clone(),
                        },
                    );
                    (generation, fetch)
                }
            }
        };

        let result = fetch.await;
        self.settle(request, generation, &result);
        result
    }

    /// Forget an in-flight fetch for `request`. Callers already awaiting it
    /// still receive its outcome, but nothing is cached. Returns whether an
    /// in-flight entry existed.
    pub fn cancel(&self, request: &SearchRequest) -> bool {
        let mut state = self.lock();
        if matches!(state.slots.get(request), Some(Slot::InFlight { .. })) {
            state.slots.remove(request);
            tracing::debug!(page = request.page(), "in-flight fetch cancelled");
            true
        } else {
            false
        }
    }

    /// The most recent successful response for any key.
    pub fn placeholder(&self) -> Option<Arc<SearchResponse>> {
        self.lock().last_good.clone()
    }

    /// A completed response for exactly `request`, without fetching.
    pub fn peek(&self, request: &SearchRequest) -> Option<Arc<SearchResponse>> {
        match self.lock().slots.get(request) {
            Some(Slot::Ready(response)) => Some(Arc::clone(response)),
            _ => None,
        }
    }

    pub fn is_fetching(&self, request: &SearchRequest) -> bool {
        matches!(self.lock().slots.get(request), Some(Slot::InFlight { .. }))
    }

    /// Number of completed responses currently held.
    pub fn len(&self) -> usize {
        self.lock().recency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every completed entry. In-flight fetches and the placeholder are
    /// kept.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state
            .slots
            .retain(|_, slot| matches!(slot, Slot::InFlight { .. }));
        state.recency.clear();
    }

    fn start(&self, request: SearchRequest) -> SharedFetch {
        let fetcher = Arc::clone(&self.fetcher);
        async move {
            fetcher
                .fetch(&request)
                .await
                .map(Arc::new)
                .map_err(Arc::new)
        }
        .boxed()
        .shared()
    }

    fn settle(&self, request: &SearchRequest, generation: u64, result: &CacheResult) {
        let mut state = self.lock();
        let current = matches!(
            state.slots.get(request),
            Some(Slot::InFlight { generation: g, .. }) if *g == generation
        );
        if !current {
            return;
        }
        match result {
            Ok(response) => {
                state.last_good = Some(Arc::clone(response));
                state.store_ready(request, Arc::clone(response));
            }
            Err(e) => {
                tracing::debug!(page = request.page(), error = %e, "fetch failed, not cached");
                state.slots.remove(request);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
