//! # kestreldb
//!
//! Core data structures for the Kestrel in-memory key-value store.
//!
//! ## Components
//! - **HashTable**: separate chaining, custom slot hash, explicit resize
//! - **DoublyLinkedList**: sentinel-bounded list over a node arena with
//!   O(1) removal of any node through a [`NodeHandle`]
//! - **Key**: integer or string store key

#![warn(missing_docs)]

mod error;
mod hash_table;
mod key;
mod list;

pub use error::{Error, Result};
pub use hash_table::{HashTable, DEFAULT_TABLE_SIZE};
pub use key::{HashKey, Key};
pub use list::{DoublyLinkedList, Iter, NodeHandle};
