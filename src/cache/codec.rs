//! Snapshot Codec Module
//!
//! Encodes the whole collection as one JSON array and decodes it back on load.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::cache::CacheRecord;

// == Load Outcome ==
/// Result of decoding whatever the durable slot held at load time.
#[derive(Debug)]
pub enum LoadOutcome<T> {
    /// The key has never been written
    Missing,
    /// Bytes are present but are not a collection of `T`
    Undecodable(serde_json::Error),
    /// A collection was decoded
    Loaded(Vec<T>),
}

impl<T: CacheRecord> LoadOutcome<T> {
    /// Resolves the outcome into the collection the manager starts with.
    ///
    /// Missing and undecodable snapshots both warm-start empty. Duplicate
    /// identities in a decoded snapshot keep their first occurrence.
    pub fn into_records(self, key: &str) -> Vec<T> {
        match self {
            LoadOutcome::Missing => Vec::new(),
            LoadOutcome::Undecodable(err) => {
                warn!(key, error = %err, "Snapshot is undecodable, starting empty");
                Vec::new()
            }
            LoadOutcome::Loaded(records) => {
                let (records, dropped) = dedupe(records);
                if dropped > 0 {
                    warn!(key, dropped, "Snapshot held duplicate identities");
                }
                records
            }
        }
    }
}

// == Encode ==
/// Serializes the entire collection.
pub fn encode_snapshot<T: Serialize>(records: &[T]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(records)
}

// == Decode ==
/// Classifies the raw slot contents.
pub fn decode_snapshot<T: CacheRecord>(bytes: Option<&[u8]>) -> LoadOutcome<T> {
    match bytes {
        None => LoadOutcome::Missing,
        Some(bytes) => match serde_json::from_slice::<Vec<T>>(bytes) {
            Ok(records) => LoadOutcome::Loaded(records),
            Err(err) => LoadOutcome::Undecodable(err),
        },
    }
}

/// Drops later records whose identity was already seen, preserving order.
fn dedupe<T: CacheRecord>(records: Vec<T>) -> (Vec<T>, usize) {
    let total = records.len();
    let mut seen = HashSet::with_capacity(total);
    let kept: Vec<T> = records
        .into_iter()
        .filter(|record| seen.insert(record.cache_id().to_string()))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}
