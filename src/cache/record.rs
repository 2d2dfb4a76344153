//! Cache Record Module
//!
//! Defines the identity capability every cached type provides, plus the
//! sample `Enemy` record served by the binary.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

// == Cache Record ==
/// A value the cache can hold.
///
/// The cache never inspects a record beyond its identity. Two records with
/// the same identity are the same slot: inserting the second is a no-op,
/// updating replaces the first.
pub trait CacheRecord: Serialize + DeserializeOwned + Clone {
    /// Stable, caller-assigned identity used for deduplication,
    /// replacement and deletion matching.
    fn cache_id(&self) -> &str;
}

// == Enemy ==
/// Sample record keyed by address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    /// Identity of the record
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    /// Arbitrary payload, zero when absent
    #[serde(default)]
    pub old: i64,
}

impl Enemy {
    /// Creates a new Enemy
    pub fn new(address: impl Into<String>, old: i64) -> Self {
        Self {
            address: address.into(),
            old,
        }
    }
}

impl CacheRecord for Enemy {
    fn cache_id(&self) -> &str {
        &self.address
    }
}
