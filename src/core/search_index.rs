//! Inverted index from compiled pattern terms to resource ids.
//!
//! Terms are filed in first-insertion order and each keeps its ids in
//! insertion order, so the first element of a search result is always the
//! earliest registered resource whose pattern accepts the path.
//!
//! The term list is frozen once registration ends. Results are memoized per
//! raw path in a concurrent cache, which is the only state mutated while
//! serving.
use std::{collections::HashMap, sync::Arc};

use regex::Regex;

use crate::{
    config::{CachePolicy, LRU_MIN_CAPACITY},
    core::{pattern::RoutePattern, resource::ResourceId},
    metrics,
};

/// Ordered ids under one search term.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    term: String,
    matcher: Regex,
    ids: Vec<ResourceId>,
}

impl IndexEntry {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn ids(&self) -> &[ResourceId] {
        &self.ids
    }
}

/// Path -> ids memo, unbounded or bounded with LRU-style eviction.
enum SearchCache {
    Unbounded(scc::HashMap<String, Arc<[ResourceId]>>),
    Lru(scc::HashCache<String, Arc<[ResourceId]>>),
}

impl SearchCache {
    fn new(policy: &CachePolicy) -> Self {
        match policy {
            CachePolicy::Unbounded => SearchCache::Unbounded(scc::HashMap::new()),
            CachePolicy::Lru { capacity } => {
                let effective = (*capacity).max(LRU_MIN_CAPACITY);
                if effective != *capacity {
                    tracing::debug!(
                        requested = capacity,
                        effective,
                        "LRU path cache raised to its minimum size"
                    );
                }
                SearchCache::Lru(scc::HashCache::with_capacity(0, effective))
            }
        }
    }

    fn get(&self, path: &str) -> Option<Arc<[ResourceId]>> {
        match self {
            SearchCache::Unbounded(map) => map.read_sync(path, |_, ids| ids.clone()),
            SearchCache::Lru(cache) => cache.get_sync(path).map(|entry| entry.get().clone()),
        }
    }

    fn put(&self, path: &str, ids: Arc<[ResourceId]>) {
        // A concurrent miss may have stored the same result first; either copy is equal.
        match self {
            SearchCache::Unbounded(map) => {
                let _ = map.insert_sync(path.to_string(), ids);
            }
            SearchCache::Lru(cache) => {
                let _ = cache.put_sync(path.to_string(), ids);
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            SearchCache::Unbounded(map) => map.len(),
            SearchCache::Lru(cache) => cache.len(),
        }
    }
}

pub struct SearchIndex {
    entries: Vec<IndexEntry>,
    positions: HashMap<String, usize>,
    cache: SearchCache,
}

impl SearchIndex {
    pub fn new(policy: &CachePolicy) -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
            cache: SearchCache::new(policy),
        }
    }

    /// File `id` under `pattern`'s search term. Duplicate pairs are kept.
    pub fn insert(&mut self, pattern: &RoutePattern, id: ResourceId) {
        let term = pattern.search_term();
        match self.positions.get(term) {
            Some(&position) => self.entries[position].ids.push(id),
            None => {
                self.positions.insert(term.to_string(), self.entries.len());
                self.entries.push(IndexEntry {
                    term: term.to_string(),
                    matcher: pattern.matcher().clone(),
                    ids: vec![id],
                });
            }
        }
    }

    /// Ids of every resource with a pattern accepting `path`, earliest first.
    ///
    /// Duplicates are not removed.
    pub fn search(&self, path: &str) -> Arc<[ResourceId]> {
        if let Some(ids) = self.cache.get(path) {
            tracing::trace!(path, "search cache hit");
            metrics::record_cache_lookup(true);
            return ids;
        }
        metrics::record_cache_lookup(false);

        let ids: Arc<[ResourceId]> = self
            .entries
            .iter()
            .filter(|entry| entry.matcher.is_match(path))
            .flat_map(|entry| entry.ids.iter().copied())
            .collect();

        tracing::trace!(path, matches = ids.len(), "search cache miss");
        self.cache.put(path, ids.clone());
        ids
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn term_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of paths currently memoized.
    pub fn cached_paths(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("entries", &self.entries)
            .field("cached_paths", &self.cached_paths())
            .finish()
    }
}
