//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::Enemy;

/// Maximum accepted address length in bytes
pub const MAX_ADDRESS_LENGTH: usize = 256;

/// Request body for inserting or updating an enemy (PUT/POST /enemy)
///
/// # Fields
/// - `address`: Identity of the record
/// - `old`: Payload stored alongside the identity
#[derive(Debug, Clone, Deserialize)]
pub struct EnemyRequest {
    /// Identity of the record
    pub address: String,
    /// Payload
    #[serde(default)]
    pub old: i64,
}

impl EnemyRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.address.is_empty() {
            return Some("Address cannot be empty".to_string());
        }
        if self.address.len() > MAX_ADDRESS_LENGTH {
            return Some(format!(
                "Address exceeds maximum length of {} bytes",
                MAX_ADDRESS_LENGTH
            ));
        }
        None
    }

    /// Converts the request into the cached record.
    pub fn into_enemy(self) -> Enemy {
        Enemy::new(self.address, self.old)
    }
}
