//! Command execution against a shared cache
//!
//! A [`Database`] owns the cache and can be cloned freely; every clone sees
//! the same entries. Each client drives it through its own [`Session`],
//! which holds the MULTI/EXEC queue for that client.

use kestrelcache::{Cache, CacheConfig, SharedCache};
use kestreldb::{Error, Key, Result};
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::reply::Reply;

/// Shared store handle
#[derive(Clone)]
pub struct Database {
    cache: SharedCache<Key, String>,
}

impl Database {
    /// Build the store's cache from `config`
    pub fn new(config: &CacheConfig) -> Result<Self> {
        Ok(Self {
            cache: config.build_shared()?,
        })
    }

    /// Start a client session
    pub fn session(&self) -> Session {
        Session {
            db: self.clone(),
            queue: None,
        }
    }

    /// Current number of keys
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Direct access to the underlying cache
    pub fn cache(&self) -> &SharedCache<Key, String> {
        &self.cache
    }
}

/// One client's view of a [`Database`]
pub struct Session {
    db: Database,
    queue: Option<Vec<Command>>,
}

impl Session {
    /// Parse and run one query line
    ///
    /// Parse and validation failures come back as error replies; inside a
    /// transaction they leave the queue untouched.
    pub fn execute(&mut self, line: &str) -> Reply {
        match Command::parse(line) {
            Ok(command) => self.dispatch(command),
            Err(e) => {
                warn!(error = %e, "rejected query");
                Reply::from(e)
            }
        }
    }

    /// Check whether MULTI has been issued without EXEC or DISCARD
    pub fn in_transaction(&self) -> bool {
        self.queue.is_some()
    }

    /// Run an already parsed command
    pub fn dispatch(&mut self, command: Command) -> Reply {
        debug!(command = command.name(), queued = self.in_transaction(), "dispatching command");

        match command {
            Command::Multi => self.multi(),
            Command::Exec => self.exec(),
            Command::Discard => self.discard(),
            command => match self.queue.as_mut() {
                Some(queue) => {
                    queue.push(command);
                    Reply::Status("QUEUED".to_string())
                }
                None => self.db.cache.with(|cache| apply(cache, &command)),
            },
        }
    }

    fn multi(&mut self) -> Reply {
        if self.queue.is_some() {
            return Reply::from(Error::Transaction("MULTI calls can not be nested".to_string()));
        }
        self.queue = Some(Vec::new());
        Reply::Ok
    }

    fn discard(&mut self) -> Reply {
        match self.queue.take() {
            Some(queue) => {
                debug!(dropped = queue.len(), "transaction discarded");
                Reply::Ok
            }
            None => Reply::from(Error::Transaction("DISCARD without MULTI".to_string())),
        }
    }

    fn exec(&mut self) -> Reply {
        let Some(queue) = self.queue.take() else {
            return Reply::from(Error::Transaction("EXEC without MULTI".to_string()));
        };

        info!(queued = queue.len(), "executing transaction");
        // One lock for the whole batch so no other session interleaves
        let replies = self
            .db
            .cache
            .with(|cache| queue.iter().map(|command| apply(cache, command)).collect::<Vec<_>>());
        Reply::Array(replies)
    }
}

/// Run a data command against the cache
fn apply(cache: &mut dyn Cache<Key, String>, command: &Command) -> Reply {
    match command {
        Command::Set { key, value } => {
            cache.put(key.clone(), value.clone());
            Reply::Ok
        }
        Command::Get(key) => match cache.get(key) {
            Some(value) => Reply::Bulk(value.clone()),
            None => Reply::Nil,
        },
        Command::Del(keys) => {
            Reply::Integer(keys.iter().filter(|key| cache.delete(key)).count() as i64)
        }
        Command::Exists(keys) => {
            Reply::Integer(keys.iter().filter(|key| cache.contains(key)).count() as i64)
        }
        Command::Append { key, value } => {
            let mut current = cache.get(key).cloned().unwrap_or_default();
            current.push_str(value);
            let len = current.len() as i64;
            cache.put(key.clone(), current);
            Reply::Integer(len)
        }
        Command::FlushDb => {
            cache.clear();
            Reply::Ok
        }
        Command::Info => Reply::Bulk(info(cache)),
        Command::Ping(None) => Reply::Status("PONG".to_string()),
        Command::Ping(Some(message)) => Reply::Bulk(message.clone()),
        Command::Multi | Command::Exec | Command::Discard => Reply::from(Error::Transaction(
            format!("{} is not allowed inside a transaction", command.name()),
        )),
    }
}

fn info(cache: &dyn Cache<Key, String>) -> String {
    let stats = cache.stats();
    format!(
        "# Cache\n\
         version:{}\n\
         policy:{}\n\
         capacity:{}\n\
         keys:{}\n\
         \n\
         # Stats\n\
         hits:{}\n\
         misses:{}\n\
         hit_ratio:{:.2}\n\
         inserts:{}\n\
         updates:{}\n\
         evictions:{}\n",
        env!("CARGO_PKG_VERSION"),
        cache.policy(),
        cache.capacity(),
        cache.len(),
        stats.hits(),
        stats.misses(),
        stats.hit_ratio(),
        stats.inserts(),
        stats.updates(),
        stats.evictions(),
    )
}
