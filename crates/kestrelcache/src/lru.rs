//! LRU (Least Recently Used) cache implementation
//!
//! A hash index maps each key to the handle of its node in an intrusive
//! list. The head of the list is the most recently used entry and the tail
//! is the next to be evicted, so every operation is O(1) apart from the
//! index chain scan.

use kestreldb::{DoublyLinkedList, HashKey, HashTable, NodeHandle, Result};
use tracing::{debug, trace, warn};

use crate::policy::{Cache, EvictionPolicy};
use crate::stats::CacheStats;
use crate::MAX_LOAD_FACTOR;

/// LRU cache with fixed capacity
pub struct LruCache<K, V> {
    index: HashTable<K, NodeHandle>,
    list: DoublyLinkedList<(K, V)>,
    capacity: i64,
    stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: HashKey + Eq + Clone,
{
    /// Create a new LRU cache with the given capacity
    ///
    /// A capacity of zero or below yields a cache that never stores anything.
    pub fn new(capacity: i64) -> Self {
        Self::from_index(capacity, HashTable::with_default_size())
    }

    /// Create a cache whose index starts with `index_size` buckets
    pub fn with_index_size(capacity: i64, index_size: usize) -> Result<Self> {
        Ok(Self::from_index(capacity, HashTable::new(index_size)?))
    }

    fn from_index(capacity: i64, index: HashTable<K, NodeHandle>) -> Self {
        Self {
            index,
            list: DoublyLinkedList::new(),
            capacity,
            stats: CacheStats::new(),
        }
    }

    /// Get a value from the cache, marking it most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let handle = match self.index.get(key).copied() {
            Ok(handle) if self.capacity > 0 => handle,
            _ => {
                self.stats.record_miss();
                trace!("lru miss");
                return None;
            }
        };

        let entry = self.list.remove(handle);
        debug_assert!(entry.is_some(), "index points at an unlinked node");
        let handle = self.list.insert_to_head(entry?);
        if let Ok(slot) = self.index.get_mut(key) {
            *slot = handle;
        }

        self.stats.record_hit();
        trace!("lru hit");
        self.list.get(handle).map(|(_, value)| value)
    }

    /// Get a value without touching recency
    pub fn peek(&self, key: &K) -> Option<&V> {
        let handle = *self.index.get(key).ok()?;
        self.list.get(handle).map(|(_, value)| value)
    }

    /// Insert a key-value pair into the cache
    pub fn put(&mut self, key: K, value: V) {
        if self.capacity <= 0 {
            // Nothing may stay resident while the cache is disabled
            self.delete(&key);
            warn!(capacity = self.capacity, "put ignored: cache capacity is not positive");
            return;
        }

        if let Ok(slot) = self.index.get_mut(&key) {
            let stale = self.list.remove(*slot);
            debug_assert!(stale.is_some(), "index points at an unlinked node");
            *slot = self.list.insert_to_head((key, value));
            self.stats.record_update();
            return;
        }

        if self.list.len() as i64 >= self.capacity {
            self.evict();
        }

        let handle = self.list.insert_to_head((key.clone(), value));
        self.index.set(key, handle);
        self.stats.record_insert();
        self.maybe_grow_index();
    }

    /// Remove a key from the cache
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let handle = self.index.delete(key).ok()?;
        let entry = self.list.remove(handle);
        debug_assert!(entry.is_some(), "index points at an unlinked node");
        entry.map(|(_, value)| value)
    }

    /// Remove a key, returning whether it was present
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    /// Check for a key without touching recency
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.list.len(), self.index.len());
        self.list.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Get the cache capacity
    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Change the capacity, evicting least recently used entries to fit
    pub fn set_capacity(&mut self, capacity: i64) {
        self.capacity = capacity;
        let bound = capacity.max(0) as usize;
        while self.list.len() > bound {
            self.evict();
        }
        debug!(capacity, len = self.list.len(), "lru capacity changed");
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
        debug!("lru cache cleared");
    }

    /// Iterate from most to least recently used
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.list.iter().map(|(key, value)| (key, value))
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let (key, value) = self.list.delete_at_end()?;
        let indexed = self.index.delete(&key);
        debug_assert!(indexed.is_ok(), "evicted node missing from index");

        self.stats.record_eviction();
        debug!(len = self.list.len(), "evicted least recently used entry");
        Some((key, value))
    }

    fn maybe_grow_index(&mut self) {
        if self.index.len() > self.index.size() * MAX_LOAD_FACTOR {
            if let Err(e) = self.index.grow() {
                warn!(error = %e, "failed to grow lru index");
            }
        }
    }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
where
    K: HashKey + Eq + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    fn put(&mut self, key: K, value: V) {
        LruCache::put(self, key, value)
    }

    fn delete(&mut self, key: &K) -> bool {
        LruCache::delete(self, key)
    }

    fn clear(&mut self) {
        LruCache::clear(self)
    }

    fn contains(&self, key: &K) -> bool {
        LruCache::contains(self, key)
    }

    fn capacity(&self) -> i64 {
        self.capacity
    }

    fn set_capacity(&mut self, capacity: i64) {
        LruCache::set_capacity(self, capacity)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn policy(&self) -> EvictionPolicy {
        EvictionPolicy::Lru
    }

    fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn reset_stats(&mut self) {
        self.stats.reset();
    }
}
