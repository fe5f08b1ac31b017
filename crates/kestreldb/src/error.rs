//! Error types for kestreldb

use thiserror::Error;

/// Result type alias for kestrel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the data structures, caches and query layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Key not found
    #[error("Key not found")]
    NotFound,

    /// Key is neither an integer nor a string
    #[error("Invalid key type: {0} (expected integer or string)")]
    InvalidKeyType(String),

    /// Hash table sized to zero buckets
    #[error("Invalid table size: {0} (must be greater than 0)")]
    InvalidSize(usize),

    /// Query text could not be tokenized
    #[error("Parse error at position {position}: {message}")]
    Parse {
        /// Byte offset into the query line
        position: usize,
        /// What went wrong
        message: String,
    },

    /// Command name not recognised
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// Command recognised but not provided by this store
    #[error("command '{0}' is not supported")]
    Unsupported(String),

    /// Argument count outside the command's bounds
    #[error("wrong number of arguments for '{command}' command: {message}")]
    WrongArity {
        /// Command name
        command: String,
        /// Which bound was violated
        message: String,
    },

    /// MULTI/EXEC/DISCARD used out of order
    #[error("{0}")]
    Transaction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::NotFound.to_string(), "Key not found");
        assert_eq!(
            Error::InvalidSize(0).to_string(),
            "Invalid table size: 0 (must be greater than 0)"
        );
        assert_eq!(
            Error::Parse { position: 4, message: "unterminated string".to_string() }.to_string(),
            "Parse error at position 4: unterminated string"
        );
    }
}
