//! LFU (Least Frequently Used) cache implementation
//!
//! Three indices keyed by the cache key (value, frequency level, node handle)
//! and one ordering list per live frequency level. New and touched keys go to
//! the head of their level's list, so the tail of the lowest level is always
//! the least frequently and then least recently used entry. `min_frequency`
//! names that level, which makes eviction O(1).
//!
//! ```text
//!   level 1: head -> [d] <-> [c] <- tail     min_frequency = 1
//!   level 2: head -> [b] <- tail
//!   level 3: head -> [a] <- tail
//! ```

use std::collections::HashMap;

use ahash::RandomState;
use kestreldb::{DoublyLinkedList, HashKey, HashTable, NodeHandle, Result};
use tracing::{debug, trace, warn};

use crate::policy::{Cache, EvictionPolicy};
use crate::stats::CacheStats;
use crate::MAX_LOAD_FACTOR;

/// LFU cache with fixed capacity
pub struct LfuCache<K, V> {
    values: HashTable<K, V>,
    frequencies: HashTable<K, u64>,
    nodes: HashTable<K, NodeHandle>,
    /// Only non-empty levels are kept; level 0 never appears
    levels: HashMap<u64, DoublyLinkedList<K>, RandomState>,
    min_frequency: u64,
    capacity: i64,
    stats: CacheStats,
}

impl<K, V> LfuCache<K, V>
where
    K: HashKey + Eq + Clone,
{
    /// Create a new LFU cache with the given capacity
    ///
    /// A capacity of zero or below yields a cache that never stores anything.
    pub fn new(capacity: i64) -> Self {
        Self {
            values: HashTable::with_default_size(),
            frequencies: HashTable::with_default_size(),
            nodes: HashTable::with_default_size(),
            levels: HashMap::with_hasher(RandomState::new()),
            min_frequency: 0,
            capacity,
            stats: CacheStats::new(),
        }
    }

    /// Create a cache whose indices start with `index_size` buckets
    pub fn with_index_size(capacity: i64, index_size: usize) -> Result<Self> {
        Ok(Self {
            values: HashTable::new(index_size)?,
            frequencies: HashTable::new(index_size)?,
            nodes: HashTable::new(index_size)?,
            ..Self::new(capacity)
        })
    }

    /// Get a value from the cache, bumping its frequency
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.capacity <= 0 || !self.values.contains_key(key) {
            self.stats.record_miss();
            trace!("lfu miss");
            return None;
        }

        self.bump(key);
        self.stats.record_hit();
        self.values.get(key).ok()
    }

    /// Get a value without touching its frequency
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.values.get(key).ok()
    }

    /// Insert or overwrite a key-value pair
    ///
    /// Overwriting counts as an access. A new key always enters at
    /// frequency 1 and resets `min_frequency` to 1.
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity <= 0 {
            // Nothing may stay resident while the cache is disabled
            self.delete(&key);
            warn!(capacity = self.capacity, "put ignored: cache capacity is not positive");
            return;
        }

        if self.values.contains_key(&key) {
            self.values.set(key.clone(), value);
            self.bump(&key);
            self.stats.record_update();
            return;
        }

        if self.values.len() as i64 >= self.capacity {
            self.evict();
        }

        let handle = self.levels.entry(1).or_default().insert_to_head(key.clone());
        self.values.set(key.clone(), value);
        self.frequencies.set(key.clone(), 1);
        self.nodes.set(key, handle);
        self.min_frequency = 1;

        self.stats.record_insert();
        self.maybe_grow_indices();
    }

    /// Remove a key from the cache
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.values.delete(key).ok()?;
        let level = self.frequencies.delete(key);
        let handle = self.nodes.delete(key);
        debug_assert!(level.is_ok() && handle.is_ok(), "lfu indices out of sync");

        if let (Ok(level), Ok(handle)) = (level, handle) {
            self.detach(level, handle);
            if level == self.min_frequency && !self.levels.contains_key(&level) {
                self.min_frequency = self.lowest_level();
            }
        }

        Some(value)
    }

    /// Remove a key, returning whether it was present
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    /// Check for a key without touching its frequency
    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// Access count of a key; 1 right after insertion
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.frequencies.get(key).ok().copied()
    }

    /// Lowest level holding entries, 0 when empty
    pub fn min_frequency(&self) -> u64 {
        self.min_frequency
    }

    /// Number of frequency levels currently holding entries
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the cache capacity
    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Change the capacity, evicting least frequently used entries to fit
    pub fn set_capacity(&mut self, capacity: i64) {
        self.capacity = capacity;
        let bound = capacity.max(0) as usize;
        while self.values.len() > bound {
            if self.evict().is_none() {
                break;
            }
        }
        debug!(capacity, len = self.values.len(), "lfu capacity changed");
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.values.clear();
        self.frequencies.clear();
        self.nodes.clear();
        self.levels.clear();
        self.min_frequency = 0;
        debug!("lfu cache cleared");
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn bump(&mut self, key: &K) {
        let (level, handle) = match (self.frequencies.get(key), self.nodes.get(key)) {
            (Ok(&level), Ok(&handle)) => (level, handle),
            _ => {
                debug_assert!(false, "lfu indices out of sync");
                return;
            }
        };

        let Some(owned) = self.detach(level, handle) else {
            debug_assert!(false, "node missing from its level list");
            return;
        };

        let next = level + 1;
        let handle = self.levels.entry(next).or_default().insert_to_head(owned);
        if let Ok(slot) = self.frequencies.get_mut(key) {
            *slot = next;
        }
        if let Ok(slot) = self.nodes.get_mut(key) {
            *slot = handle;
        }

        if level == self.min_frequency && !self.levels.contains_key(&level) {
            self.min_frequency = self.lowest_level();
        }
        trace!(from = level, to = next, "lfu frequency bumped");
    }

    /// Unlink a node from its level, dropping the level once it empties
    fn detach(&mut self, level: u64, handle: NodeHandle) -> Option<K> {
        let list = self.levels.get_mut(&level)?;
        let key = list.remove(handle);
        if list.is_empty() {
            self.levels.remove(&level);
        }
        key
    }

    fn lowest_level(&self) -> u64 {
        self.levels.keys().copied().min().unwrap_or(0)
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let level = self.min_frequency;
        let list = self.levels.get_mut(&level)?;
        let key = list.delete_at_end()?;
        if list.is_empty() {
            self.levels.remove(&level);
            self.min_frequency = self.lowest_level();
        }

        let frequency = self.frequencies.delete(&key);
        let handle = self.nodes.delete(&key);
        debug_assert!(frequency.is_ok() && handle.is_ok(), "lfu indices out of sync");
        let value = self.values.delete(&key).ok()?;

        self.stats.record_eviction();
        debug!(level, len = self.values.len(), "evicted least frequently used entry");
        Some((key, value))
    }

    fn maybe_grow_indices(&mut self) {
        if self.values.len() <= self.values.size() * MAX_LOAD_FACTOR {
            return;
        }
        for result in [
            self.values.grow(),
            self.frequencies.grow(),
            self.nodes.grow(),
        ] {
            if let Err(e) = result {
                warn!(error = %e, "failed to grow lfu index");
            }
        }
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        assert_eq!(self.values.len(), self.frequencies.len());
        assert_eq!(self.values.len(), self.nodes.len());

        let listed: usize = self.levels.values().map(DoublyLinkedList::len).sum();
        assert_eq!(listed, self.values.len());

        for (&level, list) in &self.levels {
            assert!(level > 0);
            assert!(!list.is_empty());
            for key in list.iter() {
                assert_eq!(self.frequencies.get(key), Ok(&level));
                let handle = *self.nodes.get(key).unwrap();
                assert!(list.get(handle) == Some(key));
            }
        }

        assert_eq!(self.min_frequency, self.lowest_level());
    }
}

impl<K, V> Cache<K, V> for LfuCache<K, V>
where
    K: HashKey + Eq + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        LfuCache::get(self, key)
    }

    fn put(&mut self, key: K, value: V) {
        LfuCache::put(self, key, value)
    }

    fn delete(&mut self, key: &K) -> bool {
        LfuCache::delete(self, key)
    }

    fn clear(&mut self) {
        LfuCache::clear(self)
    }

    fn contains(&self, key: &K) -> bool {
        LfuCache::contains(self, key)
    }

    fn capacity(&self) -> i64 {
        self.capacity
    }

    fn set_capacity(&mut self, capacity: i64) {
        LfuCache::set_capacity(self, capacity)
    }

    fn len(&self) -> usize {
        LfuCache::len(self)
    }

    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::Lfu
    }

    fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn reset_stats(&mut self) {
        self.stats.reset();
    }
}
