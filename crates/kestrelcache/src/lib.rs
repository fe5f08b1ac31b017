//! # kestrelcache
//!
//! Eviction policies for the Kestrel key-value store.
//!
//! ## Architecture
//! - **LruCache**: hash index + one ordering list, recency = list position
//! - **LfuCache**: value, frequency and node indices + one ordering list per
//!   frequency level, with a `min_frequency` cursor for O(1) eviction
//! - **SharedCache**: one mutex around a boxed cache for concurrent callers
//!
//! Both policies implement [`Cache`], so a policy can be picked at runtime
//! through [`CacheConfig`].

#![warn(missing_docs)]

mod config;
mod lfu;
mod lru;
mod policy;
mod shared;
mod stats;

pub use config::{CacheConfig, DEFAULT_CAPACITY};
pub use lfu::LfuCache;
pub use lru::LruCache;
pub use policy::{Cache, EvictionPolicy, ParsePolicyError};
pub use shared::SharedCache;
pub use stats::CacheStats;

/// Indices double once they hold this many entries per bucket
pub(crate) const MAX_LOAD_FACTOR: usize = 2;
