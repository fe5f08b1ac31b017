//! Cache construction settings

use kestreldb::{HashKey, Result, DEFAULT_TABLE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::lfu::LfuCache;
use crate::lru::LruCache;
use crate::policy::{Cache, EvictionPolicy};
use crate::shared::SharedCache;

/// Default number of entries a cache holds
pub const DEFAULT_CAPACITY: i64 = 128;

/// Settings for building a cache
///
/// Missing fields fall back to [`CacheConfig::default`] when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Which policy decides evictions
    pub policy: EvictionPolicy,
    /// Maximum number of entries; zero or below disables storage
    pub capacity: i64,
    /// Initial bucket count of the cache's hash indices
    pub index_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy: EvictionPolicy::Lru,
            capacity: DEFAULT_CAPACITY,
            index_size: DEFAULT_TABLE_SIZE,
        }
    }
}

impl CacheConfig {
    /// Default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the eviction policy
    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the capacity
    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the initial index bucket count
    pub fn with_index_size(mut self, index_size: usize) -> Self {
        self.index_size = index_size;
        self
    }

    /// Build a cache for the configured policy
    ///
    /// # Returns
    /// * `Err(Error::InvalidSize)` if `index_size` is zero
    pub fn build<K, V>(&self) -> Result<Box<dyn Cache<K, V> + Send>>
    where
        K: HashKey + Eq + Clone + Send + 'static,
        V: Send + 'static,
    {
        info!(policy = %self.policy, capacity = self.capacity, "building cache");

        let cache: Box<dyn Cache<K, V> + Send> = match self.policy {
            EvictionPolicy::Lru => Box::new(LruCache::with_index_size(self.capacity, self.index_size)?),
            EvictionPolicy::Lfu => Box::new(LfuCache::with_index_size(self.capacity, self.index_size)?),
        };
        Ok(cache)
    }

    /// Build a cache wrapped in a lock for sharing across threads
    pub fn build_shared<K, V>(&self) -> Result<SharedCache<K, V>>
    where
        K: HashKey + Eq + Clone + Send + 'static,
        V: Send + 'static,
    {
        Ok(SharedCache::from_boxed(self.build()?))
    }
}
