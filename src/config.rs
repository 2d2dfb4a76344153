//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// What a mutating call does when its durable write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistFailurePolicy {
    /// Return `CacheError::Persist` and keep the previous state
    #[default]
    ReturnError,
    /// Log the failure and abort the process
    Abort,
}

/// Cache manager configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Path of the durable store file
    pub store_path: PathBuf,
    /// Key of the durable slot this manager owns
    pub key: String,
    /// Reaction to a failed durable write
    pub persist_failure: PersistFailurePolicy,
}

impl CacheConfig {
    /// Creates a config for `store_path`/`key` with the default failure policy.
    pub fn new(store_path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            store_path: store_path.into(),
            key: key.into(),
            persist_failure: PersistFailurePolicy::default(),
        }
    }

    /// Sets the persist failure policy.
    pub fn with_persist_failure(mut self, policy: PersistFailurePolicy) -> Self {
        self.persist_failure = policy;
        self
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_STORE_PATH` - Durable store file (default: db/enemy.redb)
    /// - `CACHE_KEY` - Durable slot key (default: enemy)
    /// - `CACHE_ABORT_ON_PERSIST_FAILURE` - `true`/`1` aborts on failed writes (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let abort = lookup("CACHE_ABORT_ON_PERSIST_FAILURE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            store_path: lookup("CACHE_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            key: lookup("CACHE_KEY").unwrap_or(defaults.key),
            persist_failure: if abort {
                PersistFailurePolicy::Abort
            } else {
                PersistFailurePolicy::ReturnError
            },
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new("db/enemy.redb", "enemy")
    }
}

/// HTTP server configuration for the sample binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server port
    pub server_port: u16,
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            server_port: lookup("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { server_port: 3000 }
    }
}
