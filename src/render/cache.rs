//! Capped interning cache.
//!
//! Hands out a stable index per distinct key, in first-seen order. Unlike an
//! evicting cache, indices are never reused: once the cap is reached new keys
//! are refused and the caller falls back to a default.

use std::collections::HashMap;
use std::hash::Hash;

/// Interns keys into dense indices `0..len()`, up to a fixed capacity.
#[derive(Debug, Clone)]
pub struct StyleCache<K: Hash + Eq + Clone> {
    index: HashMap<K, u32>,
    records: Vec<K>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone> StyleCache<K> {
    /// A capacity of 0 refuses every key.
    pub fn new(capacity: usize) -> Self {
        Self {
            index: HashMap::new(),
            records: Vec::new(),
            capacity,
        }
    }

    /// Index of `key`, inserting it if there is room. `None` when the key is
    /// new and the cache is full.
    pub fn intern(&mut self, key: &K) -> Option<u32> {
        if let Some(&i) = self.index.get(key) {
            return Some(i);
        }
        if self.records.len() >= self.capacity {
            return None;
        }
        let i = u32::try_from(self.records.len()).ok()?;
        self.index.insert(key.clone(), i);
        self.records.push(key.clone());
        Some(i)
    }

    /// Interned keys in index order.
    pub fn records(&self) -> &[K] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget every key. Indices restart at 0.
    pub fn clear(&mut self) {
        self.index.clear();
        self.records.clear();
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let mut cache: StyleCache<&str> = StyleCache::new(3);
        assert_eq!(cache.intern(&"a"), Some(0));
        assert_eq!(cache.intern(&"b"), Some(1));
        assert_eq!(cache.intern(&"a"), Some(0));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.records(), &["a", "b"]);
    }

    #[test]
    fn test_full_cache_refuses_new_keys() {
        let mut cache: StyleCache<u8> = StyleCache::new(2);
        cache.intern(&1);
        cache.intern(&2);
        assert_eq!(cache.len(), cache.capacity());
        assert_eq!(cache.intern(&3), None);
        assert_eq!(cache.intern(&2), Some(1));
    }

    #[test]
    fn test_zero_capacity() {
        let mut cache: StyleCache<u8> = StyleCache::new(0);
        assert_eq!(cache.intern(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_restarts_indices() {
        let mut cache: StyleCache<u8> = StyleCache::new(4);
        cache.intern(&7);
        cache.intern(&8);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.intern(&8), Some(0));
    }
}
