//! Test builders: ergonomic constructors for advocates, stores and searches.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use advodir_core::{AnyStore, MemoryStore, NewAdvocate, SearchExecutor, SearchRequest, SqliteStore};

// ---------------------------------------------------------------------------
// AdvocateBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`NewAdvocate`] test fixtures.
///
/// # Example
///
/// ```rust
/// let ann = AdvocateBuilder::new("Ann", "Lee")
///     .city("Boston")
///     .degree("MD")
///     .specialty("Bipolar")
///     .build();
/// ```
pub struct AdvocateBuilder {
    inner: NewAdvocate,
}

impl AdvocateBuilder {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            inner: NewAdvocate {
                first_name: first_name.into(),
                last_name: last_name.into(),
                city: "Springfield".to_string(),
                degree: "MSW".to_string(),
                specialties: Vec::new(),
                years_of_experience: 5,
                phone_number: 5550100000,
            },
        }
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.inner.city = city.into();
        self
    }

    pub fn degree(mut self, degree: impl Into<String>) -> Self {
        self.inner.degree = degree.into();
        self
    }

    pub fn specialty(mut self, specialty: impl Into<String>) -> Self {
        self.inner.specialties.push(specialty.into());
        self
    }

    pub fn years(mut self, years: u32) -> Self {
        self.inner.years_of_experience = years;
        self
    }

    pub fn phone(mut self, phone: u64) -> Self {
        self.inner.phone_number = phone;
        self
    }

    pub fn build(self) -> NewAdvocate {
        self.inner
    }
}

/// Shorthand for the four searchable attributes.
pub fn advocate(first: &str, last: &str, city: &str, degree: &str) -> NewAdvocate {
    AdvocateBuilder::new(first, last).city(city).degree(degree).build()
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Which store implementation a parameterised test runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Sqlite,
}

/// Open an empty store of `kind` and import `roster` into it.
pub async fn store_with(kind: StoreKind, roster: Vec<NewAdvocate>) -> AnyStore {
    let store = match kind {
        StoreKind::Memory => AnyStore::Memory(MemoryStore::new()),
        StoreKind::Sqlite => AnyStore::Sqlite(
            SqliteStore::open_in_memory()
                .await
                .expect("in-memory sqlite store must open"),
        ),
    };
    store.import(roster).await.expect("roster import must succeed");
    store
}

pub async fn executor_with(kind: StoreKind, roster: Vec<NewAdvocate>) -> SearchExecutor<AnyStore> {
    SearchExecutor::new(store_with(kind, roster).await)
}

/// Shorthand for a search request.
pub fn search(page: u64, page_size: u32, term: &str) -> SearchRequest {
    SearchRequest::new(page, page_size, term)
}
