//! The cache contract shared by every eviction policy

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::CacheStats;

/// Eviction policy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Least Recently Used
    #[default]
    Lru,
    /// Least Frequently Used, recency as tie-break
    Lfu,
}

/// Unrecognised policy name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown eviction policy '{0}' (expected 'lru' or 'lfu')")]
pub struct ParsePolicyError(String);

impl FromStr for EvictionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "lfu" => Ok(EvictionPolicy::Lfu),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Lru => write!(f, "lru"),
            EvictionPolicy::Lfu => write!(f, "lfu"),
        }
    }
}

/// Bounded key-value cache
///
/// Absent keys are ordinary misses: `get` returns `None` and `delete`
/// returns `false`. A capacity of zero or below disables storage; it is
/// checked on every call.
pub trait Cache<K, V> {
    /// Look up a key, recording the access for the eviction policy
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Insert or overwrite a key, evicting first if the cache is full
    fn put(&mut self, key: K, value: V);

    /// Remove a key, returning whether it was present
    fn delete(&mut self, key: &K) -> bool;

    /// Drop every entry
    fn clear(&mut self);

    /// Check for a key without recording an access
    fn contains(&self, key: &K) -> bool;

    /// Maximum number of entries
    fn capacity(&self) -> i64;

    /// Change the capacity, evicting down to it
    fn set_capacity(&mut self, capacity: i64);

    /// Current number of entries
    fn len(&self) -> usize;

    /// Check if the cache holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Which policy decides evictions
    fn policy(&self) -> EvictionPolicy;

    /// Activity counters for this instance
    fn stats(&self) -> &CacheStats;

    /// Zero the activity counters
    fn reset_stats(&mut self);
}

impl<K, V, C> Cache<K, V> for Box<C>
where
    C: Cache<K, V> + ?Sized,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        (**self).get(key)
    }

    fn put(&mut self, key: K, value: V) {
        (**self).put(key, value)
    }

    fn delete(&mut self, key: &K) -> bool {
        (**self).delete(key)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn contains(&self, key: &K) -> bool {
        (**self).contains(key)
    }

    fn capacity(&self) -> i64 {
        (**self).capacity()
    }

    fn set_capacity(&mut self, capacity: i64) {
        (**self).set_capacity(capacity)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn policy(&self) -> EvictionPolicy {
        (**self).policy()
    }

    fn stats(&self) -> &CacheStats {
        (**self).stats()
    }

    fn reset_stats(&mut self) {
        (**self).reset_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("lru".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::Lru);
        assert_eq!("LFU".parse::<EvictionPolicy>().unwrap(), EvictionPolicy::Lfu);
        assert!("fifo".parse::<EvictionPolicy>().is_err());
    }

    #[test]
    fn test_policy_display_round_trip() {
        for policy in [EvictionPolicy::Lru, EvictionPolicy::Lfu] {
            assert_eq!(policy.to_string().parse::<EvictionPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_policy_serde() {
        let json = serde_json::to_string(&EvictionPolicy::Lfu).unwrap();
        assert_eq!(json, "\"lfu\"");
        let policy: EvictionPolicy = serde_json::from_str("\"lru\"").unwrap();
        assert_eq!(policy, EvictionPolicy::Lru);
    }
}
