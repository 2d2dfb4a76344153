//! Durable Slot Module
//!
//! One key in an embedded redb store. The store is opened and closed on
//! every call; no handle outlives a read or a write.

use std::fs;
use std::path::{Path, PathBuf};

use redb::{Database, TableDefinition, TableError};

/// Table holding every manager's snapshot, one row per key.
const SNAPSHOTS: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

// == Durable Slot ==
/// Location of one persisted collection: a store file plus the key inside it.
#[derive(Debug, Clone)]
pub struct DurableSlot {
    /// Path of the redb database file
    path: PathBuf,
    /// Key this slot owns inside the store
    key: String,
}

impl DurableSlot {
    // == Constructor ==
    /// Creates a slot handle. Nothing is opened until `read` or `write`.
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Returns the store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the key owned by this slot.
    pub fn key(&self) -> &str {
        &self.key
    }

    // == Open ==
    /// Opens the store, creating the file and its parent directory if absent.
    ///
    /// Fails with `DatabaseAlreadyOpen` while another handle holds the file.
    fn open(&self) -> Result<Database, redb::Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(redb::Error::Io)?;
            }
        }
        Ok(Database::create(&self.path)?)
    }

    // == Read ==
    /// Fetches the bytes stored under the key inside a read transaction.
    ///
    /// Returns `None` when the key, or the whole table, has never been written.
    pub fn read(&self) -> Result<Option<Vec<u8>>, redb::Error> {
        let db = self.open()?;
        let txn = db.begin_read()?;
        let table = match txn.open_table(SNAPSHOTS) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let value = table.get(self.key.as_str())?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    // == Write ==
    /// Replaces the bytes under the key in a read-write transaction.
    ///
    /// Either the commit lands or the previous bytes remain.
    pub fn write(&self, bytes: &[u8]) -> Result<(), redb::Error> {
        let db = self.open()?;
        let txn = db.begin_write()?;
        {
            let mut table = txn.open_table(SNAPSHOTS)?;
            table.insert(self.key.as_str(), bytes)?;
        }
        txn.commit()?;
        Ok(())
    }
}
