//! Core types for advodir-core.
//!
//! This module defines the data shared across every layer: the [`Advocate`]
//! record and its [`AdvocateId`], the [`NewAdvocate`] ingestion shape, and the
//! per-call [`SearchRequest`] / [`SearchResponse`] pair.

use crate::config::SearchConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned advocate identifier. Unique and immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvocateId(pub i64);

impl std::fmt::Display for AdvocateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directory record describing one professional advocate.
///
/// Every attribute is required except `specialties`, which defaults to an
/// empty list and is never absent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advocate {
    pub id: AdvocateId,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub degree: String,
    /// Ordered specialty labels, e.g. `["Bipolar", "LGBTQ"]`.
    #[serde(default)]
    pub specialties: Vec<String>,
    pub years_of_experience: u32,
    pub phone_number: u64,
    /// Assigned by the store at import time.
    pub created_at: DateTime<Utc>,
}

/// An advocate as handed to the ingestion path, before the store assigns an
/// identifier and creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdvocate {
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub degree: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub years_of_experience: u32,
    pub phone_number: u64,
}

impl NewAdvocate {
    /// Attach the store-assigned identity.
    pub fn into_advocate(self, id: AdvocateId, created_at: DateTime<Utc>) -> Advocate {
        Advocate {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            city: self.city,
            degree: self.degree,
            specialties: self.specialties,
            years_of_experience: self.years_of_experience,
            phone_number: self.phone_number,
            created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Search request
// ---------------------------------------------------------------------------

/// One paginated search call.
///
/// Constructed only through [`SearchRequest::new`] or
/// [`SearchRequest::from_params`], both of which guarantee `page >= 1` and
/// `page_size >= 1`. The request doubles as the client-side cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchRequest {
    page: u64,
    page_size: u32,
    search: String,
}

impl SearchRequest {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    /// Build a request, replacing a zero `page` or `page_size` with the
    /// built-in defaults.
    pub fn new(page: u64, page_size: u32, search: impl Into<String>) -> Self {
        Self {
            page: if page == 0 { Self::DEFAULT_PAGE } else { page },
            page_size: if page_size == 0 {
                Self::DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
            search: search.into(),
        }
    }

    /// Build a request from raw, untrusted transport parameters.
    ///
    /// Anything that does not parse as a positive integer takes the default
    /// (`page = 1`, `page_size = limits.default_page_size`). A page size above
    /// `limits.max_page_size` is clamped to the maximum. Never fails.
    pub fn from_params(
        page: Option<&str>,
        page_size: Option<&str>,
        search: Option<&str>,
        limits: &SearchConfig,
    ) -> Self {
        let page = parse_positive(page).unwrap_or(Self::DEFAULT_PAGE);
        let page_size = parse_positive(page_size)
            .unwrap_or(u64::from(limits.default_page_size))
            .min(u64::from(limits.max_page_size));
        let page_size = u32::try_from(page_size).unwrap_or(limits.max_page_size);
        Self::new(page, page_size, search.unwrap_or_default())
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Number of matching rows to skip: `(page - 1) * page_size`, saturating.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(u64::from(self.page_size))
    }

    /// The same search and page size, at a different page.
    pub fn with_page(&self, page: u64) -> Self {
        Self::new(page, self.page_size, self.search.clone())
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE, Self::DEFAULT_PAGE_SIZE, String::new())
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n >= 1)
}

// ---------------------------------------------------------------------------
// Search response
// ---------------------------------------------------------------------------

/// One page of matching advocates plus the totals for the whole filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub data: Vec<Advocate>,
    pub total_pages: u64,
    pub total_items: u64,
}

/// `ceil(total_items / page_size)`, and 0 when nothing matched.
pub fn total_pages(total_items: u64, page_size: u32) -> u64 {
    if total_items == 0 {
        0
    } else {
        total_items.div_ceil(u64::from(page_size.max(1)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
