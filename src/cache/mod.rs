//! Cache Module
//!
//! Provides the durably-backed identity cache: an ordered in-memory
//! collection mirrored in full to one key of an embedded store.

mod codec;
mod durable;
mod manager;
mod record;
mod stats;


// Re-export public types
pub use codec::{decode_snapshot, encode_snapshot, LoadOutcome};
pub use durable::DurableSlot;
pub use manager::CacheManager;
pub use record::{CacheRecord, Enemy};
pub use stats::CacheStats;
