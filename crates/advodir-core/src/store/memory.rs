//! In-memory roster. Evaluates predicates with a linear scan.

use super::{AdvocateStore, StoreError};
use crate::query::Predicate;
use crate::types::{Advocate, AdvocateId, NewAdvocate};
use chrono::Utc;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// Roster held in a `Vec`, always sorted by identifier. Clones share the
/// same underlying records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<Advocate>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-identified records. Duplicate identifiers
    /// are rejected.
    pub fn with_advocates(mut advocates: Vec<Advocate>) -> Result<Self, StoreError> {
        advocates.sort_by_key(|a| a.id);
        if let Some(pair) = advocates.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(StoreError::InvalidRecord(format!(
                "duplicate advocate id {}",
                pair[0].id
            )));
        }
        Ok(Self {
            records: Arc::new(RwLock::new(advocates)),
        })
    }

    /// Append records, assigning identifiers after the current maximum.
    /// Nothing is appended when the identifier space runs out.
    pub fn import(&self, records: Vec<NewAdvocate>) -> Result<Vec<Advocate>, StoreError> {
        let mut roster = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = match roster.last() {
            Some(a) => a.id.0.checked_add(1),
            None => Some(1),
        };
        let now = Utc::now();

        let mut imported = Vec::with_capacity(records.len());
        for record in records {
            let id = next.ok_or_else(|| {
                StoreError::InvalidRecord("advocate ids exhausted".to_string())
            })?;
            imported.push(record.into_advocate(AdvocateId(id), now));
            next = id.checked_add(1);
        }
        roster.extend(imported.iter().cloned());
        Ok(imported)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Advocate>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AdvocateStore for MemoryStore {
    async fn fetch_page(
        &self,
        predicate: &Predicate,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Advocate>, StoreError> {
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(self
            .read()
            .iter()
            .filter(|a| predicate.matches(a))
            .skip(skip)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        Ok(self.read().iter().filter(|a| predicate.matches(a)).count() as u64)
    }
}
