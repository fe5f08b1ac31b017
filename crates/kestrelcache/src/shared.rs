//! Thread-safe cache handle
//!
//! The caches themselves take `&mut self` on every call and hold no locks.
//! `SharedCache` puts one mutex around the whole cache so each operation,
//! and each closure passed to [`SharedCache::with`], runs without
//! interleaving.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::policy::{Cache, EvictionPolicy};
use crate::stats::CacheStats;

/// Cloneable, lock-protected handle to a cache
pub struct SharedCache<K, V> {
    inner: Arc<Mutex<Box<dyn Cache<K, V> + Send>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedCache<K, V> {
    /// Wrap a cache
    pub fn new<C>(cache: C) -> Self
    where
        C: Cache<K, V> + Send + 'static,
    {
        Self::from_boxed(Box::new(cache))
    }

    /// Wrap an already boxed cache
    pub fn from_boxed(cache: Box<dyn Cache<K, V> + Send>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Run several operations under one lock acquisition
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn Cache<K, V>) -> R) -> R {
        let mut cache = self.inner.lock();
        f(&mut **cache)
    }

    /// Get a copy of a value
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Insert or overwrite a key
    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    /// Remove a key, returning whether it was present
    pub fn delete(&self, key: &K) -> bool {
        self.inner.lock().delete(key)
    }

    /// Check for a key without recording an access
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Current number of entries
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> i64 {
        self.inner.lock().capacity()
    }

    /// Change the capacity, evicting down to it
    pub fn set_capacity(&self, capacity: i64) {
        self.inner.lock().set_capacity(capacity);
    }

    /// Which policy decides evictions
    pub fn policy(&self) -> EvictionPolicy {
        self.inner.lock().policy()
    }

    /// Snapshot of the activity counters
    pub fn stats(&self) -> CacheStats {
        *self.inner.lock().stats()
    }
}
