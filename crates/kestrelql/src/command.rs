//! Command table and typed commands
//!
//! Every command declares its arity. Arguments are checked and keys are
//! converted when the line is parsed, so a queued transaction only ever
//! holds commands that can run.

use kestreldb::{Error, Key, Result};

use crate::lexer::{tokenize, Token, TokenKind};

/// Name, arity and help text of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Upper-case command name
    pub name: &'static str,
    /// Fewest arguments accepted
    pub min_args: usize,
    /// Most arguments accepted, `None` for unbounded
    pub max_args: Option<usize>,
    /// One-line help
    pub description: &'static str,
}

impl CommandSpec {
    /// Check an argument count against the declared bounds
    pub fn validate_args(&self, count: usize) -> Result<()> {
        if count < self.min_args {
            return Err(Error::WrongArity {
                command: self.name.to_string(),
                message: format!("requires at least {} argument(s)", self.min_args),
            });
        }
        if let Some(max) = self.max_args {
            if count > max {
                return Err(Error::WrongArity {
                    command: self.name.to_string(),
                    message: format!("takes at most {} argument(s)", max),
                });
            }
        }
        Ok(())
    }
}

const fn spec(
    name: &'static str,
    min_args: usize,
    max_args: Option<usize>,
    description: &'static str,
) -> CommandSpec {
    CommandSpec {
        name,
        min_args,
        max_args,
        description,
    }
}

/// Every command this store answers
pub const COMMANDS: &[CommandSpec] = &[
    spec("SET", 2, Some(2), "Set key to hold a string value"),
    spec("GET", 1, Some(1), "Get the value of key"),
    spec("DEL", 1, None, "Delete one or more keys"),
    spec("EXISTS", 1, None, "Count how many of the given keys exist"),
    spec("APPEND", 2, Some(2), "Append a value to key"),
    spec("FLUSHDB", 0, Some(0), "Remove all keys"),
    spec("INFO", 0, Some(0), "Show cache policy and statistics"),
    spec("PING", 0, Some(1), "Return PONG, or echo the argument"),
    spec("MULTI", 0, Some(0), "Start queueing commands"),
    spec("EXEC", 0, Some(0), "Run all queued commands"),
    spec("DISCARD", 0, Some(0), "Drop all queued commands"),
];

/// Commands of the wider protocol that this store does not provide
pub const UNSUPPORTED: &[&str] = &["EXPIRE", "TTL", "KEYS"];

/// Find a command by upper-case name
pub fn lookup(name: &str) -> Result<&'static CommandSpec> {
    if let Some(spec) = COMMANDS.iter().find(|spec| spec.name == name) {
        return Ok(spec);
    }
    if UNSUPPORTED.contains(&name) {
        return Err(Error::Unsupported(name.to_string()));
    }
    Err(Error::UnknownCommand(name.to_string()))
}

/// A parsed, validated command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// SET key value
    Set {
        /// Target key
        key: Key,
        /// New value
        value: String,
    },
    /// GET key
    Get(Key),
    /// DEL key [key ...]
    Del(Vec<Key>),
    /// EXISTS key [key ...]
    Exists(Vec<Key>),
    /// APPEND key value
    Append {
        /// Target key
        key: Key,
        /// Suffix to append
        value: String,
    },
    /// FLUSHDB
    FlushDb,
    /// INFO
    Info,
    /// PING [message]
    Ping(Option<String>),
    /// MULTI
    Multi,
    /// EXEC
    Exec,
    /// DISCARD
    Discard,
}

impl Command {
    /// Tokenize and validate one query line
    pub fn parse(line: &str) -> Result<Self> {
        let tokens = tokenize(line)?;
        let (head, args) = tokens.split_first().ok_or_else(|| Error::Parse {
            position: 0,
            message: "empty query".to_string(),
        })?;

        if head.kind != TokenKind::Command {
            return Err(Error::Parse {
                position: head.position,
                message: format!("expected a command name, found '{}'", head.value),
            });
        }

        let spec = lookup(&head.value)?;
        spec.validate_args(args.len())?;
        Self::from_args(spec.name, args)
    }

    fn from_args(name: &str, args: &[Token]) -> Result<Self> {
        let key = |idx: usize| Key::try_from(&args[idx]);
        let keys = || args.iter().map(Key::try_from).collect::<Result<Vec<_>>>();

        Ok(match name {
            "SET" => Command::Set {
                key: key(0)?,
                value: args[1].value.clone(),
            },
            "GET" => Command::Get(key(0)?),
            "DEL" => Command::Del(keys()?),
            "EXISTS" => Command::Exists(keys()?),
            "APPEND" => Command::Append {
                key: key(0)?,
                value: args[1].value.clone(),
            },
            "FLUSHDB" => Command::FlushDb,
            "INFO" => Command::Info,
            "PING" => Command::Ping(args.first().map(|t| t.value.clone())),
            "MULTI" => Command::Multi,
            "EXEC" => Command::Exec,
            "DISCARD" => Command::Discard,
            other => return Err(Error::UnknownCommand(other.to_string())),
        })
    }

    /// Upper-case name of this command
    pub fn name(&self) -> &'static str {
        match self {
            Command::Set { .. } => "SET",
            Command::Get(_) => "GET",
            Command::Del(_) => "DEL",
            Command::Exists(_) => "EXISTS",
            Command::Append { .. } => "APPEND",
            Command::FlushDb => "FLUSHDB",
            Command::Info => "INFO",
            Command::Ping(_) => "PING",
            Command::Multi => "MULTI",
            Command::Exec => "EXEC",
            Command::Discard => "DISCARD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set() {
        let cmd = Command::parse(r#"set user:1 "Ada Lovelace""#).unwrap();
        assert_eq!(
            cmd,
            Command::Set {
                key: Key::from("user:1"),
                value: "Ada Lovelace".to_string(),
            }
        );
        assert_eq!(cmd.name(), "SET");
    }

    #[test]
    fn test_parse_integer_key() {
        assert_eq!(Command::parse("GET 42").unwrap(), Command::Get(Key::Int(42)));
    }

    #[test]
    fn test_parse_multi_key() {
        assert_eq!(
            Command::parse("DEL a 2 c").unwrap(),
            Command::Del(vec![Key::from("a"), Key::Int(2), Key::from("c")])
        );
    }

    #[test]
    fn test_parse_arity() {
        assert!(matches!(
            Command::parse("GET"),
            Err(Error::WrongArity { command, .. }) if command == "GET"
        ));
        assert!(matches!(Command::parse("GET a b"), Err(Error::WrongArity { .. })));
        assert!(matches!(Command::parse("PING a b"), Err(Error::WrongArity { .. })));
        assert_eq!(Command::parse("PING").unwrap(), Command::Ping(None));
    }

    #[test]
    fn test_parse_bad_key_type() {
        assert!(matches!(
            Command::parse("GET 1.5"),
            Err(Error::InvalidKeyType(_))
        ));
        assert!(matches!(
            Command::parse("DEL a --force"),
            Err(Error::InvalidKeyType(_))
        ));
    }

    #[test]
    fn test_parse_unknown_and_unsupported() {
        assert_eq!(
            Command::parse("FROB x"),
            Err(Error::UnknownCommand("FROB".to_string()))
        );
        assert_eq!(
            Command::parse("expire k 10"),
            Err(Error::Unsupported("EXPIRE".to_string()))
        );
        assert_eq!(
            Command::parse("KEYS *"),
            Err(Error::Unsupported("KEYS".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_and_non_command() {
        assert!(matches!(Command::parse("   "), Err(Error::Parse { position: 0, .. })));
        assert!(matches!(Command::parse("\"SET\" a b"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_every_spec_parses() {
        for spec in COMMANDS {
            let line = std::iter::once(spec.name)
                .chain(std::iter::repeat("k").take(spec.min_args))
                .collect::<Vec<_>>()
                .join(" ");
            assert_eq!(Command::parse(&line).unwrap().name(), spec.name);
        }
    }
}
