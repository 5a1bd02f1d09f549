use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::{HarvestSource, SuggestedSourcesPage};

/// Address of one cached backend projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReadModelKey {
    SuggestedSources { funder_id: String },
    ConfiguredSources { funder_id: String },
    FunderDetail { funder_id: String },
}

/// Cached payload for a read-model key.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadModelValue {
    Suggested(SuggestedSourcesPage),
    Sources(Vec<HarvestSource>),
}

#[derive(Debug, Default)]
struct CacheEntry {
    generation: u64,
    value: Option<ReadModelValue>,
}

/// Key-addressed read-model cache with explicit invalidation.
///
/// Each key carries a generation counter. Invalidation bumps the counter and
/// drops the cached value; a `store` that raced with an invalidation carries
/// a stale generation and is discarded, so stale data never overwrites a
/// fresher invalidation.
#[derive(Debug, Default)]
pub struct ReadModelCache {
    entries: Mutex<HashMap<ReadModelKey, CacheEntry>>,
}

impl ReadModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation for a key. Read before fetching, passed back to
    /// [`ReadModelCache::store`].
    pub fn generation(&self, key: &ReadModelKey) -> u64 {
        let entries = self.entries.lock().expect("cache lock");
        entries.get(key).map(|entry| entry.generation).unwrap_or(0)
    }

    pub fn get(&self, key: &ReadModelKey) -> Option<ReadModelValue> {
        let entries = self.entries.lock().expect("cache lock");
        entries.get(key).and_then(|entry| entry.value.clone())
    }

    /// Stores a fetched value. Returns false (and keeps nothing) when the
    /// key was invalidated after `generation` was read.
    pub fn store(&self, key: ReadModelKey, generation: u64, value: ReadModelValue) -> bool {
        let mut entries = self.entries.lock().expect("cache lock");
        let entry = entries.entry(key).or_default();
        if entry.generation != generation {
            return false;
        }
        entry.value = Some(value);
        true
    }

    /// Drops the cached value and bumps the generation so concurrent readers
    /// refetch.
    pub fn invalidate(&self, key: &ReadModelKey) {
        let mut entries = self.entries.lock().expect("cache lock");
        let entry = entries.entry(key.clone()).or_default();
        entry.generation += 1;
        entry.value = None;
    }
}
