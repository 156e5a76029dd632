//! Per-run lookup cache.
//!
//! Resolvers memoize directory lookups for the duration of one coordinator
//! invocation. The cache must be initialized before use and flushed when the
//! run ends; while inactive it neither stores nor returns entries, so a
//! stale value can never leak into the next run.

use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LookupCache<K, V> {
    name: &'static str,
    entries: HashMap<K, V>,
    active: bool,
}

impl<K: Eq + Hash, V> LookupCache<K, V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: HashMap::new(),
            active: false,
        }
    }

    /// Start a run with an empty cache
    pub fn init(&mut self) {
        self.entries.clear();
        self.active = true;
    }

    /// End the run, dropping every entry; returns how many were held
    pub fn flush(&mut self) -> usize {
        let held = self.entries.len();
        self.entries.clear();
        self.active = false;
        debug!(cache = self.name, entries = held, "🧹 Lookup cache flushed");
        held
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        if !self.active {
            return None;
        }
        self.entries.get(key)
    }

    /// Write-once: returns false and keeps the existing value when `key` is
    /// already present, or when the cache is inactive
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if !self.active || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_once_per_key() {
        let mut cache: LookupCache<String, Option<String>> = LookupCache::new("source_owners");
        cache.init();

        assert!(cache.insert("src-1".to_string(), Some("owner-1".to_string())));
        assert!(!cache.insert("src-1".to_string(), Some("owner-2".to_string())));
        assert_eq!(cache.get(&"src-1".to_string()), Some(&Some("owner-1".to_string())));
    }

    #[test]
    fn test_inactive_cache_stores_nothing() {
        let mut cache: LookupCache<&str, u32> = LookupCache::new("test");
        assert!(!cache.insert("a", 1));
        assert!(cache.get(&"a").is_none());

        cache.init();
        cache.insert("a", 1);
        assert_eq!(cache.flush(), 1);
        assert!(cache.get(&"a").is_none());
        assert!(!cache.is_active());
    }
}
