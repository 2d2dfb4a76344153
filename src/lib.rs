//! Safe Cache - A durably-backed identity cache
//!
//! Keeps an ordered collection of records in memory and mirrors the whole
//! collection to a single key of an embedded redb store after every mutation.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheManager, CacheRecord, Enemy};
pub use config::{CacheConfig, PersistFailurePolicy, ServerConfig};
pub use error::{CacheError, Result};
