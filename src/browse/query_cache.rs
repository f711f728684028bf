//! Keyed caches for paged results and one-shot lookups
//!
//! Both caches only track state; the controller performs the actual requests.
//! `begin_*` returns false when a request for the same key is already in
//! flight (or not needed), which is how concurrent triggers get coalesced.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

use crate::tmdb::{CatalogError, CatalogResult, Movie, PageResult};

/// Pages fetched so far for one key
#[derive(Debug, Default)]
pub struct InfiniteQuery {
    pages: BTreeMap<u32, PageResult>,
    in_flight: BTreeSet<u32>,
    error: Option<(u32, CatalogError)>,
}

impl InfiniteQuery {
    /// Page to request next: 1 when nothing is loaded, otherwise the page after the last one
    pub fn next_page_param(&self) -> Option<u32> {
        match self.pages.values().next_back() {
            None => Some(1),
            Some(last) => last.next_page(),
        }
    }

    pub fn has_next_page(&self) -> bool {
        !self.pages.is_empty() && self.next_page_param().is_some()
    }

    /// First page requested and nothing to show yet
    pub fn is_loading(&self) -> bool {
        self.pages.is_empty() && !self.in_flight.is_empty()
    }

    pub fn is_fetching_next_page(&self) -> bool {
        !self.pages.is_empty() && !self.in_flight.is_empty()
    }

    pub fn error(&self) -> Option<&CatalogError> {
        self.error.as_ref().map(|(_, e)| e)
    }

    pub fn failed_page(&self) -> Option<u32> {
        self.error.as_ref().map(|(page, _)| *page)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Result count the catalog reported for this key
    pub fn total_results(&self) -> Option<u32> {
        self.pages.values().next_back().map(|page| page.total_results)
    }

    /// All movies in page order
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.pages.values().flat_map(|page| page.results.iter())
    }
}

/// Paged results per key
///
/// Keys that go unused for a while are dropped by [`evict_idle`](Self::evict_idle).
#[derive(Debug)]
pub struct QueryCache<K> {
    entries: HashMap<K, InfiniteQuery>,
    last_used: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> Default for QueryCache<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            last_used: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> QueryCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&InfiniteQuery> {
        self.entries.get(key)
    }

    /// Mark `page` of `key` as requested.
    ///
    /// Returns false when that page is already loaded or in flight.
    pub fn begin_fetch(&mut self, key: &K, page: u32) -> bool {
        let entry = self.entries.entry(key.clone()).or_default();
        if entry.pages.contains_key(&page) || !entry.in_flight.insert(page) {
            return false;
        }
        if entry.failed_page() == Some(page) {
            entry.error = None;
        }
        true
    }

    /// Record that `key` is being looked at
    pub fn touch(&mut self, key: &K, now: Instant) {
        self.last_used.insert(key.clone(), now);
    }

    /// Drop keys other than `active` that were last used at least `idle_for`
    /// ago and have nothing in flight. Returns how many were dropped.
    pub fn evict_idle(&mut self, active: &K, now: Instant, idle_for: Duration) -> usize {
        let expired: Vec<K> = self
            .last_used
            .iter()
            .filter(|(key, used)| *key != active && now.saturating_duration_since(**used) >= idle_for)
            .filter(|(key, _)| self.entries.get(*key).is_none_or(|q| q.in_flight.is_empty()))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.last_used.remove(key);
        }
        expired.len()
    }

    /// Store the outcome of a request under the key it was made for
    pub fn complete(&mut self, key: &K, page: u32, result: CatalogResult<PageResult>) {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.in_flight.remove(&page);
        match result {
            Ok(data) => {
                entry.pages.insert(page, data);
                if entry.failed_page() == Some(page) {
                    entry.error = None;
                }
            }
            Err(e) => entry.error = Some((page, e)),
        }
    }
}

#[derive(Debug)]
enum LookupState<V> {
    InFlight,
    Ready { value: V, fetched_at: Instant },
    Failed,
}

/// Single-value results per key with an optional freshness window
#[derive(Debug)]
pub struct LookupCache<K, V> {
    stale_after: Option<Duration>,
    entries: HashMap<K, LookupState<V>>,
}

impl<K: Eq + Hash + Clone, V> LookupCache<K, V> {
    /// `stale_after: None` keeps values for the whole session
    pub fn new(stale_after: Option<Duration>) -> Self {
        Self {
            stale_after,
            entries: HashMap::new(),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.get(key) {
            Some(LookupState::Ready { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Mark `key` as requested; false if it's in flight or still fresh
    pub fn begin_fetch(&mut self, key: &K, now: Instant) -> bool {
        match self.entries.get(key) {
            Some(LookupState::InFlight) => false,
            Some(LookupState::Ready { fetched_at, .. })
                if self
                    .stale_after
                    .is_none_or(|stale| now.duration_since(*fetched_at) < stale) =>
            {
                false
            }
            _ => {
                self.entries.insert(key.clone(), LookupState::InFlight);
                true
            }
        }
    }

    pub fn complete(&mut self, key: &K, result: CatalogResult<V>, now: Instant) {
        let state = match result {
            Ok(value) => LookupState::Ready {
                value,
                fetched_at: now,
            },
            Err(_) => LookupState::Failed,
        };
        self.entries.insert(key.clone(), state);
    }
}
