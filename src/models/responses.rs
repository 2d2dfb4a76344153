//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, Enemy};

/// Response body for PUT /enemy
#[derive(Debug, Clone, Serialize)]
pub struct InsertResponse {
    /// Outcome message
    pub message: String,
    /// Identity of the record
    pub address: String,
    /// False when the identity was already cached
    pub inserted: bool,
}

impl InsertResponse {
    /// Creates a new InsertResponse
    pub fn new(address: impl Into<String>, inserted: bool) -> Self {
        let address = address.into();
        let message = if inserted {
            format!("Enemy '{}' inserted", address)
        } else {
            format!("Enemy '{}' already cached", address)
        };
        Self {
            message,
            address,
            inserted,
        }
    }
}

/// Response body for POST /enemy
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse {
    /// Outcome message
    pub message: String,
    /// The stored record
    pub enemy: Enemy,
}

impl UpdateResponse {
    /// Creates a new UpdateResponse
    pub fn new(enemy: Enemy) -> Self {
        Self {
            message: format!("Enemy '{}' updated", enemy.address),
            enemy,
        }
    }
}

/// Response body for DELETE /enemy/:address
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    /// Outcome message
    pub message: String,
    /// Identity that was removed
    pub address: String,
    /// False when nothing matched
    pub removed: bool,
}

impl RemoveResponse {
    /// Creates a new RemoveResponse
    pub fn new(address: impl Into<String>, removed: bool) -> Self {
        let address = address.into();
        let message = if removed {
            format!("Enemy '{}' removed", address)
        } else {
            format!("Enemy '{}' was not cached", address)
        };
        Self {
            message,
            address,
            removed,
        }
    }
}

/// Response body for GET /has/:address
#[derive(Debug, Clone, Serialize)]
pub struct HasResponse {
    /// Identity looked up
    pub address: String,
    /// Whether it is cached
    pub present: bool,
}

/// Response body for GET /enemies
#[derive(Debug, Clone, Serialize)]
pub struct EnemiesResponse {
    /// Number of cached records
    pub count: usize,
    /// Records in collection order
    pub enemies: Vec<Enemy>,
}

impl EnemiesResponse {
    /// Creates a new EnemiesResponse from a snapshot
    pub fn new(enemies: Vec<Enemy>) -> Self {
        Self {
            count: enemies.len(),
            enemies,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Durable slot key
    pub key: String,
    /// Current persistence counters
    #[serde(flatten)]
    pub stats: CacheStats,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
