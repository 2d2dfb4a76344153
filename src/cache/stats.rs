//! Cache Statistics Module
//!
//! Tracks durable writes and insert collisions for one cache manager.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing the manager's persistence activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of records currently in the collection
    pub total_records: usize,
    /// Number of committed whole-collection writes
    pub persists: u64,
    /// Number of writes that failed to commit
    pub persist_failures: u64,
    /// Number of inserts skipped because the identity was already present
    pub duplicate_inserts: u64,
    /// Size in bytes of the last committed snapshot
    pub last_snapshot_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Persist ==
    /// Counts a committed write of `bytes` bytes.
    pub fn record_persist(&mut self, bytes: usize) {
        self.persists += 1;
        self.last_snapshot_bytes = bytes;
    }

    // == Record Persist Failure ==
    /// Increments the failed write counter.
    pub fn record_persist_failure(&mut self) {
        self.persist_failures += 1;
    }

    // == Record Duplicate ==
    /// Increments the skipped insert counter.
    pub fn record_duplicate(&mut self) {
        self.duplicate_inserts += 1;
    }

    // == Update Record Count ==
    /// Updates the total records count.
    pub fn set_total_records(&mut self, count: usize) {
        self.total_records = count;
    }
}
