//! Command replies and their text rendering
//!
//! Rendering follows the familiar interactive style:
//! ```text
//! OK
//! (nil)
//! (integer) 3
//! "hello"
//! (error) ERR unknown command 'FROB'
//! 1) OK
//! 2) "hello"
//! ```

use std::fmt;

use kestreldb::Error;

/// Result of executing one command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Plain success
    Ok,
    /// Missing value
    Nil,
    /// Integer result
    Integer(i64),
    /// String value
    Bulk(String),
    /// Status text such as `PONG` or `QUEUED`
    Status(String),
    /// Failure message
    Error(String),
    /// One reply per queued command
    Array(Vec<Reply>),
}

impl Reply {
    /// Check whether this reply reports a failure
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        match self {
            Reply::Array(items) if !items.is_empty() => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, "\n{:indent$}", "", indent = indent)?;
                    }
                    let prefix = format!("{}) ", i + 1);
                    write!(f, "{}", prefix)?;
                    item.write_indented(f, indent + prefix.len())?;
                }
                Ok(())
            }
            Reply::Array(_) => write!(f, "(empty array)"),
            Reply::Ok => write!(f, "OK"),
            Reply::Nil => write!(f, "(nil)"),
            Reply::Integer(i) => write!(f, "(integer) {}", i),
            Reply::Bulk(s) => write!(f, "{:?}", s),
            Reply::Status(s) => write!(f, "{}", s),
            Reply::Error(e) => write!(f, "(error) {}", e),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

impl From<Error> for Reply {
    fn from(err: Error) -> Self {
        Reply::Error(format!("ERR {}", err))
    }
}
