//! Cache Store Module
//!
//! Key to entry mapping behind every memoized callable, plus the default
//! HashMap-backed implementation.

use std::collections::HashMap;

use crate::cache::{CacheEntry, ExpiryPolicy};

// == Cache Store Trait ==
/// Storage seam of a memoized callable.
///
/// Any implementation can be installed at runtime with
/// [`Memoized::set_cache`](crate::memo::Memoized::set_cache).
pub trait CacheStore<V>: Send {
    fn get(&self, key: &str) -> Option<&CacheEntry<V>>;

    /// In-place access for callers that want to edit a stored result.
    fn get_mut(&mut self, key: &str) -> Option<&mut CacheEntry<V>>;

    /// Stores an entry, replacing any previous one wholesale.
    fn set(&mut self, key: String, entry: CacheEntry<V>);

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    fn keys(&self) -> Vec<String>;

    /// Keeps only the entries for which `keep` returns true.
    fn retain(&mut self, keep: &mut dyn FnMut(&str, &CacheEntry<V>) -> bool);

    // == Purge Expired ==
    /// Removes every entry that is stale at `now`.
    ///
    /// Returns the number of entries removed.
    fn purge_expired(&mut self, policy: &ExpiryPolicy, now: u64) -> usize {
        let before = self.len();
        self.retain(&mut |_: &str, entry: &CacheEntry<V>| policy.is_valid(entry, now));
        before - self.len()
    }
}

// == Memory Store ==
/// Default in-process store.
#[derive(Debug)]
pub struct MemoryStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry<V>)> {
        self.entries.iter()
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<HashMap<String, CacheEntry<V>>> for MemoryStore<V> {
    fn from(entries: HashMap<String, CacheEntry<V>>) -> Self {
        Self { entries }
    }
}

impl<V: Send> CacheStore<V> for MemoryStore<V> {
    fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut CacheEntry<V>> {
        self.entries.get_mut(key)
    }

    fn set(&mut self, key: String, entry: CacheEntry<V>) {
        self.entries.insert(key, entry);
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        self.entries.remove(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&str, &CacheEntry<V>) -> bool) {
        self.entries.retain(|key, entry| keep(key, entry));
    }
}
