//! Cache Manager Module
//!
//! Owns the in-memory collection and mirrors all of it to one durable slot
//! after every mutation.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info};

use crate::cache::codec::{decode_snapshot, encode_snapshot};
use crate::cache::{CacheRecord, CacheStats, DurableSlot};
use crate::config::{CacheConfig, PersistFailurePolicy};
use crate::error::{CacheError, Result};

/// Collection plus counters, guarded together.
#[derive(Debug)]
struct State<T> {
    records: Vec<T>,
    stats: CacheStats,
}

// == Cache Manager ==
/// Ordered, identity-deduplicated collection backed by a single durable key.
///
/// Every mutating call holds the lock across the in-memory change and the
/// full rewrite of the durable slot. When a mutating call returns `Ok`, a
/// fresh manager opened on the same path and key loads exactly the
/// collection this one holds.
///
/// Mutations are staged on a copy and only become visible after the write
/// commits, so a failed call leaves memory and the store at the prior state.
#[derive(Debug)]
pub struct CacheManager<T> {
    slot: DurableSlot,
    policy: PersistFailurePolicy,
    state: Mutex<State<T>>,
}

impl<T: CacheRecord> CacheManager<T> {
    // == Constructor ==
    /// Opens the store at `store_path` and loads the collection under `key`.
    ///
    /// A missing or undecodable snapshot yields an empty collection. Fails
    /// with `CacheError::StoreOpen` only when the store itself is unusable.
    pub fn open(store_path: impl Into<PathBuf>, key: impl Into<String>) -> Result<Self> {
        Self::with_config(&CacheConfig::new(store_path, key))
    }

    /// Opens a manager described by `config`.
    pub fn with_config(config: &CacheConfig) -> Result<Self> {
        let slot = DurableSlot::new(config.store_path.clone(), config.key.clone());
        let bytes = slot.read().map_err(|source| CacheError::StoreOpen {
            path: slot.path().to_path_buf(),
            source,
        })?;
        let records = decode_snapshot::<T>(bytes.as_deref()).into_records(slot.key());

        info!(
            key = slot.key(),
            path = %slot.path().display(),
            records = records.len(),
            "Cache loaded from durable store"
        );

        let mut stats = CacheStats::new();
        stats.set_total_records(records.len());

        Ok(Self {
            slot,
            policy: config.persist_failure,
            state: Mutex::new(State { records, stats }),
        })
    }

    // == Contains ==
    /// Returns true if a record with identity `id` is cached.
    pub fn contains(&self, id: &str) -> bool {
        position(&self.state().records, id).is_some()
    }

    // == Get ==
    /// Returns a copy of the record with identity `id`.
    pub fn get(&self, id: &str) -> Option<T> {
        let state = self.state();
        position(&state.records, id).map(|idx| state.records[idx].clone())
    }

    // == Snapshot ==
    /// Returns a copy of the collection in its current order.
    ///
    /// The copy is isolated from later mutations.
    pub fn snapshot(&self) -> Vec<T> {
        self.state().records.clone()
    }

    // == Insert ==
    /// Appends `record` unless its identity is already cached.
    ///
    /// Returns `Ok(false)` on a collision; nothing is replaced and nothing is
    /// written. Returns `Ok(true)` once the extended collection is durable.
    pub fn insert(&self, record: T) -> Result<bool> {
        let mut state = self.state();
        if position(&state.records, record.cache_id()).is_some() {
            debug!(key = self.key(), id = record.cache_id(), "Insert skipped, identity present");
            state.stats.record_duplicate();
            return Ok(false);
        }

        let mut next = state.records.clone();
        next.push(record);
        self.commit(&mut state, next)?;
        Ok(true)
    }

    // == Remove ==
    /// Removes every record with identity `id`, keeping the order of the rest.
    ///
    /// The collection is rewritten even when nothing matched. Returns whether
    /// a record was removed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut state = self.state();
        let next: Vec<T> = state
            .records
            .iter()
            .filter(|record| record.cache_id() != id)
            .cloned()
            .collect();
        let removed = next.len() != state.records.len();
        self.commit(&mut state, next)?;
        Ok(removed)
    }

    // == Update ==
    /// Replaces the record sharing `record`'s identity, or inserts it.
    ///
    /// Remove and append happen under one lock with a single write, so no
    /// reader ever sees the identity missing. The record moves to the end.
    pub fn update(&self, record: T) -> Result<()> {
        let mut state = self.state();
        let mut next: Vec<T> = state
            .records
            .iter()
            .filter(|existing| existing.cache_id() != record.cache_id())
            .cloned()
            .collect();
        next.push(record);
        self.commit(&mut state, next)
    }

    // == Length ==
    /// Returns the number of cached records.
    pub fn len(&self) -> usize {
        self.state().records.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.state().records.is_empty()
    }

    // == Stats ==
    /// Returns current persistence statistics.
    pub fn stats(&self) -> CacheStats {
        self.state().stats.clone()
    }

    /// Returns the durable key this manager owns.
    pub fn key(&self) -> &str {
        self.slot.key()
    }

    /// Returns the durable store path.
    pub fn store_path(&self) -> &Path {
        self.slot.path()
    }

    fn state(&self) -> MutexGuard<'_, State<T>> {
        // The collection is only replaced wholesale, so a poisoned guard still holds a valid state
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Commit ==
    /// Persists `next` and, once committed, makes it the live collection.
    fn commit(&self, state: &mut State<T>, next: Vec<T>) -> Result<()> {
        match self.persist(&next) {
            Ok(bytes) => {
                state.records = next;
                state.stats.record_persist(bytes);
                state.stats.set_total_records(state.records.len());
                Ok(())
            }
            Err(err) => {
                state.stats.record_persist_failure();
                error!(key = self.key(), error = %err, "Durable write failed");
                if self.policy == PersistFailurePolicy::Abort {
                    std::process::abort();
                }
                Err(err)
            }
        }
    }

    // == Persist ==
    /// Rewrites the whole durable slot with `records`. Returns the bytes written.
    fn persist(&self, records: &[T]) -> Result<usize> {
        let bytes = encode_snapshot(records).map_err(|source| CacheError::Encode {
            key: self.key().to_string(),
            source,
        })?;
        self.slot.write(&bytes).map_err(|source| CacheError::Persist {
            key: self.key().to_string(),
            source,
        })?;

        debug!(key = self.key(), records = records.len(), bytes = bytes.len(), "Snapshot persisted");
        Ok(bytes.len())
    }
}

/// Index of the record with identity `id`.
fn position<T: CacheRecord>(records: &[T], id: &str) -> Option<usize> {
    records.iter().position(|record| record.cache_id() == id)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Enemy;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::process::{Command, Stdio};
    use std::sync::Arc;
    use std::thread;
    use tempfile::{tempdir, TempDir};

    fn open_in(dir: &TempDir) -> CacheManager<Enemy> {
        CacheManager::open(dir.path().join("cache.redb"), "enemy").unwrap()
    }

    fn stored(dir: &TempDir) -> Option<Vec<u8>> {
        DurableSlot::new(dir.path().join("cache.redb"), "enemy")
            .read()
            .unwrap()
    }

    #[test]
    fn test_open_fresh_store_is_empty() {
        let dir = tempdir().unwrap();
        let cache = open_in(&dir);

        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert!(!cache.contains("A"));
        assert!(cache.snapshot().is_empty());
        assert_eq!(cache.key(), "enemy");
        assert_eq!(stored(&dir), None, "Opening must not write");
    }

    #[test]
    fn test_insert_appends_and_persists() {
        let dir = tempdir().unwrap();
        let cache = open_in(&dir);

        assert!(cache.insert(Enemy::new("A", 1)).unwrap());
        assert!(cache.insert(Enemy::new("B", 2)).unwrap());

        assert_eq!(cache.snapshot(), vec![Enemy::new("A", 1), Enemy::new("B", 2)]);
        assert!(cache.contains("A"));
        assert_eq!(cache.get("B"), Some(Enemy::new("B", 2)));
        assert_eq!(cache.stats().persists, 2);
        assert_eq!(
            stored(&dir).unwrap(),
            br#"[{"address":"A","old":1},{"address":"B","old":2}]"#
        );
    }

    #[test]
    fn test_duplicate_insert_is_noop_without_write() {
        let dir = tempdir().unwrap();
        let cache = open_in(&dir);
        cache.insert(Enemy::new("A", 1)).unwrap();
        let before = stored(&dir);

        assert!(!cache.insert(Enemy::new("A", 42)).unwrap());

        assert_eq!(cache.snapshot(), vec![Enemy::new("A", 1)]);
        let stats = cache.stats();
        assert_eq!(stats.persists, 1);
        assert_eq!(stats.duplicate_inserts, 1);
        assert_eq!(stored(&dir), before);
    }

    #[test]
    fn test_remove_absent_still_persists() {
        let dir = tempdir().unwrap();
        let cache = open_in(&dir);

        assert!(!cache.remove("ghost").unwrap());

        assert!(cache.is_empty());
        assert_eq!(cache.stats().persists, 1);
        assert_eq!(stored(&dir).unwrap(), b"[]");
    }

    #[test]
    fn test_remove_keeps_order_of_remainder() {
        let dir = tempdir().unwrap();
        let cache = open_in(&dir);
        for (id, old) in [("A", 1), ("B", 2), ("C", 3)] {
            cache.insert(Enemy::new(id, old)).unwrap();
        }

        assert!(cache.remove("B").unwrap());

        assert_eq!(cache.snapshot(), vec![Enemy::new("A", 1), Enemy::new("C", 3)]);
        assert_eq!(open_in(&dir).snapshot(), cache.snapshot());
    }

    #[test]
    fn test_update_replaces_and_moves_to_end() {
        let dir = tempdir().unwrap();
        let cache = open_in(&dir);
        cache.insert(Enemy::new("A", 1)).unwrap();
        cache.insert(Enemy::new("B", 2)).unwrap();

        cache.update(Enemy::new("A", 99)).unwrap();

        assert_eq!(cache.snapshot(), vec![Enemy::new("B", 2), Enemy::new("A", 99)]);
        assert_eq!(cache.len(), 2);
        // one write for the whole update
        assert_eq!(cache.stats().persists, 3);
    }

    #[test]
    fn test_update_absent_inserts() {
        let dir = tempdir().unwrap();
        let cache = open_in(&dir);

        cache.update(Enemy::new("A", 5)).unwrap();

        assert_eq!(cache.snapshot(), vec![Enemy::new("A", 5)]);
        assert_eq!(open_in(&dir).snapshot(), vec![Enemy::new("A", 5)]);
    }

    #[test]
    fn test_snapshot_is_isolated_copy() {
        let dir = tempdir().unwrap();
        let cache = open_in(&dir);
        cache.insert(Enemy::new("A", 1)).unwrap();

        let snapshot = cache.snapshot();
        cache.remove("A").unwrap();

        assert_eq!(snapshot, vec![Enemy::new("A", 1)]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_undecodable_snapshot_starts_empty() {
        let dir = tempdir().unwrap();
        DurableSlot::new(dir.path().join("cache.redb"), "enemy")
            .write(b"{corrupt")
            .unwrap();

        let cache = open_in(&dir);
        assert!(cache.is_empty());

        cache.insert(Enemy::new("A", 1)).unwrap();
        assert_eq!(open_in(&dir).snapshot(), vec![Enemy::new("A", 1)]);
    }

    #[test]
    fn test_open_fails_when_store_is_held() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.redb");
        let _held = redb::Database::create(&path).unwrap();

        let result = CacheManager::<Enemy>::open(&path, "enemy");
        assert!(matches!(result, Err(CacheError::StoreOpen { .. })));
    }

    #[test]
    fn test_failed_persist_keeps_previous_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.redb");
        let cache = open_in(&dir);
        cache.insert(Enemy::new("A", 1)).unwrap();

        {
            let _held = redb::Database::create(&path).unwrap();

            let err = cache.insert(Enemy::new("B", 2)).unwrap_err();
            assert!(matches!(err, CacheError::Persist { .. }));
            assert!(cache.remove("A").unwrap_err().is_persist_failure());
            assert!(cache.update(Enemy::new("A", 9)).unwrap_err().is_persist_failure());

            assert_eq!(cache.snapshot(), vec![Enemy::new("A", 1)]);
            assert_eq!(cache.stats().persist_failures, 3);
        }

        assert_eq!(open_in(&dir).snapshot(), vec![Enemy::new("A", 1)]);
        assert!(cache.insert(Enemy::new("B", 2)).unwrap());
    }

    /// Directory handed to the child process by the abort policy test.
    const ABORT_CHILD_DIR: &str = "SAFE_CACHE_ABORT_CHILD_DIR";

    /// Runs only when spawned by `test_abort_policy_aborts_on_failed_persist`.
    #[test]
    fn abort_policy_child_process() {
        let Some(dir) = std::env::var_os(ABORT_CHILD_DIR) else {
            return;
        };
        let path = PathBuf::from(dir).join("cache.redb");
        let config =
            CacheConfig::new(&path, "enemy").with_persist_failure(PersistFailurePolicy::Abort);
        let cache = CacheManager::<Enemy>::with_config(&config).unwrap();

        let _held = redb::Database::create(&path).unwrap();
        let _ = cache.insert(Enemy::new("B", 2));

        // only reached if the failed write did not abort
        std::process::exit(0);
    }

    #[test]
    fn test_abort_policy_aborts_on_failed_persist() {
        let dir = tempdir().unwrap();
        open_in(&dir).insert(Enemy::new("A", 1)).unwrap();

        let status = Command::new(std::env::current_exe().unwrap())
            .args([
                "cache::manager::tests::abort_policy_child_process",
                "--exact",
                "--test-threads=1",
            ])
            .env(ABORT_CHILD_DIR, dir.path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .unwrap();

        assert!(!status.success(), "Child should abort, got {:?}", status);
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            // SIGABRT
            assert_eq!(status.signal(), Some(6));
        }

        assert_eq!(open_in(&dir).snapshot(), vec![Enemy::new("A", 1)]);
    }

    #[test]
    fn test_distinct_keys_share_a_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.redb");
        let enemies = CacheManager::<Enemy>::open(&path, "enemy").unwrap();
        let friends = CacheManager::<Enemy>::open(&path, "friend").unwrap();

        enemies.insert(Enemy::new("A", 1)).unwrap();
        friends.insert(Enemy::new("Z", 26)).unwrap();

        let reopened = CacheManager::<Enemy>::open(&path, "enemy").unwrap();
        assert_eq!(reopened.snapshot(), vec![Enemy::new("A", 1)]);
    }

    #[test]
    fn test_concurrent_inserts_stay_unique() {
        let dir = tempdir().unwrap();
        let cache = Arc::new(open_in(&dir));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..10 {
                        cache.insert(Enemy::new(format!("id{}", i), i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 10);
        assert_eq!(cache.stats().persists, 10);
        assert_eq!(cache.stats().duplicate_inserts, 30);
        assert_eq!(open_in(&dir).len(), 10);
    }

    #[test]
    fn test_update_never_exposes_missing_identity() {
        let dir = tempdir().unwrap();
        let cache = Arc::new(open_in(&dir));
        cache.insert(Enemy::new("A", 0)).unwrap();
        let done = Arc::new(AtomicBool::new(false));

        let reader = {
            let cache = Arc::clone(&cache);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    assert!(cache.contains("A"), "Update exposed a missing identity");
                }
            })
        };

        for old in 1..=20 {
            cache.update(Enemy::new("A", old)).unwrap();
        }
        done.store(true, Ordering::Release);
        reader.join().unwrap();

        assert_eq!(cache.snapshot(), vec![Enemy::new("A", 20)]);
    }
}
