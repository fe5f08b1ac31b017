//! Keys and the slot hash function
//!
//! Integer keys hash to `key mod size`. String keys hash by concatenating
//! the decimal character codes of every non-space character into one large
//! integer and taking it mod `size`. The modulus is folded in digit by digit,
//! so the large integer never exists in memory.

use std::fmt;

/// Types that can be placed into a [`HashTable`](crate::HashTable) slot
pub trait HashKey {
    /// Map the key into `[0, size)`. `size` is never zero.
    fn slot(&self, size: usize) -> usize;
}

/// A store key: integer or string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Integer key
    Int(i64),
    /// String key
    Str(String),
}

fn int_slot(key: i64, size: usize) -> usize {
    // rem_euclid keeps negative keys inside the table
    (key as i128).rem_euclid(size as i128) as usize
}

fn str_slot(key: &str, size: usize) -> usize {
    let size = size as u128;
    let mut acc: u128 = 0;
    for ch in key.chars().filter(|c| *c != ' ') {
        let code = ch as u32;
        // Scale by 10^digits(code) before adding so the digits concatenate
        let mut scale: u128 = 10;
        while scale <= code as u128 {
            scale *= 10;
        }
        acc = (acc * (scale % size) + code as u128 % size) % size;
    }
    acc as usize
}

impl HashKey for Key {
    fn slot(&self, size: usize) -> usize {
        match self {
            Key::Int(i) => int_slot(*i, size),
            Key::Str(s) => str_slot(s, size),
        }
    }
}

impl HashKey for i64 {
    fn slot(&self, size: usize) -> usize {
        int_slot(*self, size)
    }
}

impl HashKey for u64 {
    fn slot(&self, size: usize) -> usize {
        (*self % size as u64) as usize
    }
}

impl HashKey for String {
    fn slot(&self, size: usize) -> usize {
        str_slot(self, size)
    }
}

impl HashKey for &str {
    fn slot(&self, size: usize) -> usize {
        str_slot(self, size)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{}", i),
            Key::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_slot() {
        assert_eq!(Key::Int(42).slot(10), 2);
        assert_eq!(42i64.slot(10), 2);
        assert_eq!(Key::Int(-1).slot(10), 9);
    }

    #[test]
    fn test_str_slot_matches_concatenation() {
        // "ab" -> "9798" -> 9798 % 1000 = 798
        assert_eq!(Key::from("ab").slot(1000), 798);
        // spaces are skipped: "a b" hashes like "ab"
        assert_eq!(Key::from("a b").slot(1000), 798);
        // "test" -> 116101115116 % 97
        assert_eq!("test".slot(97), (116101115116u64 % 97) as usize);
    }

    #[test]
    fn test_str_slot_in_range() {
        for size in [1usize, 7, 10, 1024] {
            for key in ["", "   ", "name", "a much longer key with spaces", "ünïcode"] {
                assert!(key.slot(size) < size);
            }
        }
    }

    #[test]
    fn test_empty_string_slot() {
        assert_eq!("".slot(10), 0);
        assert_eq!("   ".slot(10), 0);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::Int(7).to_string(), "7");
        assert_eq!(Key::from("abc").to_string(), "abc");
    }
}
