//! Separate-chaining hash table
//!
//! Each bucket is a chain of `(key, value)` pairs. Lookups scan the chain
//! linearly, so every operation costs O(chain length). The table never
//! resizes itself; callers decide when to call [`HashTable::resize`].

use tracing::debug;

use crate::error::{Error, Result};
use crate::key::HashKey;

/// Default bucket count used by the cache indices
pub const DEFAULT_TABLE_SIZE: usize = 1024;

/// Hash table keyed by [`HashKey`] types
#[derive(Debug, Clone)]
pub struct HashTable<K, V> {
    buckets: Vec<Vec<(K, V)>>,
    len: usize,
}

impl<K, V> HashTable<K, V>
where
    K: HashKey + Eq,
{
    /// Create a table with `size` buckets
    ///
    /// # Returns
    /// * `Err(Error::InvalidSize)` if `size` is zero
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidSize(size));
        }

        Ok(Self {
            buckets: Self::create_buckets(size),
            len: 0,
        })
    }

    /// Create a table with [`DEFAULT_TABLE_SIZE`] buckets
    pub fn with_default_size() -> Self {
        Self {
            buckets: Self::create_buckets(DEFAULT_TABLE_SIZE),
            len: 0,
        }
    }

    fn create_buckets(size: usize) -> Vec<Vec<(K, V)>> {
        let mut buckets = Vec::with_capacity(size);
        buckets.resize_with(size, Vec::new);
        buckets
    }

    fn bucket_of(&self, key: &K) -> usize {
        let slot = key.slot(self.buckets.len());
        debug_assert!(slot < self.buckets.len(), "slot out of range");
        slot
    }

    /// Insert or update a key, returning the previous value if any
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let idx = self.bucket_of(&key);
        let bucket = &mut self.buckets[idx];

        if let Some((_, existing)) = bucket.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(existing, value));
        }

        bucket.push((key, value));
        self.len += 1;
        None
    }

    /// Look up a key
    pub fn get(&self, key: &K) -> Result<&V> {
        let idx = self.bucket_of(key);
        self.buckets[idx]
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .ok_or(Error::NotFound)
    }

    /// Look up a key for in-place modification
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V> {
        let idx = self.bucket_of(key);
        self.buckets[idx]
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .ok_or(Error::NotFound)
    }

    /// Remove a key, returning its value
    pub fn delete(&mut self, key: &K) -> Result<V> {
        let idx = self.bucket_of(key);
        let bucket = &mut self.buckets[idx];

        let pos = bucket
            .iter()
            .position(|(k, _)| k == key)
            .ok_or(Error::NotFound)?;

        self.len -= 1;
        // Chain order carries no meaning, so swap_remove is fine
        Ok(bucket.swap_remove(pos).1)
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_ok()
    }

    /// Rebuild the table with `new_size` buckets, rehashing every pair
    ///
    /// Fails before touching any bucket if `new_size` is zero.
    pub fn resize(&mut self, new_size: usize) -> Result<()> {
        if new_size == 0 {
            return Err(Error::InvalidSize(new_size));
        }

        let old = std::mem::replace(&mut self.buckets, Self::create_buckets(new_size));
        for (key, value) in old.into_iter().flatten() {
            let idx = key.slot(new_size);
            self.buckets[idx].push((key, value));
        }

        debug!(new_size, entries = self.len, "hash table resized");
        Ok(())
    }

    /// Double the bucket count
    pub fn grow(&mut self) -> Result<()> {
        self.resize(self.buckets.len() * 2)
    }

    /// Number of stored pairs
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    /// Length of the longest chain
    pub fn max_chain_len(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Remove every pair, keeping the bucket count
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Iterate over all pairs in bucket order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|(k, v)| (k, v)))
    }

    /// Iterate over all keys in bucket order
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }
}

impl<K, V> Default for HashTable<K, V>
where
    K: HashKey + Eq,
{
    fn default() -> Self {
        Self::with_default_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    fn table() -> HashTable<Key, String> {
        HashTable::new(10).unwrap()
    }

    #[test]
    fn test_new() {
        let t = table();
        assert_eq!(t.size(), 10);
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
    }

    #[test]
    fn test_default_size() {
        let t: HashTable<Key, u32> = HashTable::default();
        assert_eq!(t.size(), DEFAULT_TABLE_SIZE);
    }

    #[test]
    fn test_new_zero_size() {
        let result: Result<HashTable<Key, u32>> = HashTable::new(0);
        assert_eq!(result.unwrap_err(), Error::InvalidSize(0));
    }

    #[test]
    fn test_set_and_get() {
        let mut t = table();
        assert_eq!(t.set(Key::from("name"), "John".to_string()), None);

        assert_eq!(t.get(&Key::from("name")).unwrap(), "John");
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_set_existing_key() {
        let mut t = table();
        t.set(Key::from("name"), "John".to_string());
        let previous = t.set(Key::from("name"), "Jane".to_string());

        assert_eq!(previous.as_deref(), Some("John"));
        assert_eq!(t.get(&Key::from("name")).unwrap(), "Jane");
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let t = table();
        assert_eq!(t.get(&Key::from("nonexistent")), Err(Error::NotFound));
    }

    #[test]
    fn test_delete() {
        let mut t = table();
        t.set(Key::from("name"), "John".to_string());

        assert_eq!(t.delete(&Key::from("name")).unwrap(), "John");
        assert_eq!(t.get(&Key::from("name")), Err(Error::NotFound));
        assert!(t.is_empty());
    }

    #[test]
    fn test_delete_missing() {
        let mut t = table();
        assert_eq!(t.delete(&Key::from("nonexistent")), Err(Error::NotFound));
    }

    #[test]
    fn test_collisions_share_a_chain() {
        let mut t: HashTable<i64, &str> = HashTable::new(4).unwrap();
        t.set(1, "one");
        t.set(5, "five");
        t.set(9, "nine");

        assert_eq!(t.max_chain_len(), 3);
        assert_eq!(t.get(&5).unwrap(), &"five");

        t.delete(&5).unwrap();
        assert_eq!(t.get(&1).unwrap(), &"one");
        assert_eq!(t.get(&9).unwrap(), &"nine");
        assert_eq!(t.get(&5), Err(Error::NotFound));
    }

    #[test]
    fn test_mixed_key_types() {
        let mut t = table();
        t.set(Key::Int(42), "int".to_string());
        t.set(Key::from("42"), "str".to_string());

        assert_eq!(t.get(&Key::Int(42)).unwrap(), "int");
        assert_eq!(t.get(&Key::from("42")).unwrap(), "str");
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_resize_preserves_entries() {
        let mut t = table();
        t.set(Key::from("name"), "John".to_string());
        t.set(Key::from("age"), "30".to_string());
        t.set(Key::from("city"), "New York".to_string());
        t.set(Key::Int(7), "seven".to_string());

        t.resize(20).unwrap();

        assert_eq!(t.size(), 20);
        assert_eq!(t.len(), 4);
        assert_eq!(t.get(&Key::from("name")).unwrap(), "John");
        assert_eq!(t.get(&Key::from("age")).unwrap(), "30");
        assert_eq!(t.get(&Key::from("city")).unwrap(), "New York");
        assert_eq!(t.get(&Key::Int(7)).unwrap(), "seven");
    }

    #[test]
    fn test_resize_zero_fails_without_change() {
        let mut t = table();
        t.set(Key::from("name"), "John".to_string());

        assert_eq!(t.resize(0), Err(Error::InvalidSize(0)));
        assert_eq!(t.size(), 10);
        assert_eq!(t.get(&Key::from("name")).unwrap(), "John");
    }

    #[test]
    fn test_grow_doubles() {
        let mut t: HashTable<u64, u64> = HashTable::new(8).unwrap();
        for i in 0..100 {
            t.set(i, i * 2);
        }
        t.grow().unwrap();

        assert_eq!(t.size(), 16);
        for i in 0..100 {
            assert_eq!(t.get(&i).unwrap(), &(i * 2));
        }
    }

    #[test]
    fn test_get_mut() {
        let mut t: HashTable<String, Vec<u8>> = HashTable::new(16).unwrap();
        t.set("k".to_string(), vec![1]);
        t.get_mut(&"k".to_string()).unwrap().push(2);

        assert_eq!(t.get(&"k".to_string()).unwrap(), &vec![1, 2]);
    }

    #[test]
    fn test_clear_and_iter() {
        let mut t: HashTable<i64, i64> = HashTable::new(3).unwrap();
        for i in 0..6 {
            t.set(i, -i);
        }

        let mut keys: Vec<_> = t.keys().copied().collect();
        keys.sort();
        assert_eq!(keys, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(t.iter().count(), 6);

        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.size(), 3);
        assert_eq!(t.iter().count(), 0);
    }
}
