//! # kestrelql
//!
//! Line-oriented query layer for the Kestrel key-value store.
//!
//! A query line such as `SET user:1 "Ada Lovelace"` is split into tokens by
//! the [`lexer`], checked against the command table in [`command`] and run
//! by a [`Session`] against a [`Database`]. Results come back as [`Reply`]
//! values that print the way `redis-cli` shows them.

#![warn(missing_docs)]

pub mod command;
pub mod lexer;
mod reply;
mod session;

pub use command::Command;
pub use lexer::{tokenize, Token, TokenKind};
pub use reply::Reply;
pub use session::{Database, Session};
