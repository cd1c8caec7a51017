// Copyright 2026 IAMServer Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! TTL-aware key-value store backed by redb.
//!
//! Every value is stored inside an envelope: an 8-byte big-endian expiry
//! timestamp (unix milliseconds, 0 = never expires) followed by the payload.
//! Reads treat expired entries as absent; [`KvStore::reap_expired`] deletes
//! them for good. Write transactions are serializable and atomic across
//! keys; dropping a transaction without committing aborts it.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::StorageError;

const ENTRIES: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");

/// Length of the expiry header prepended to every stored value.
const EXPIRY_HEADER_LEN: usize = 8;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn encode_entry(payload: &[u8], expires_at: u64) -> Vec<u8> {
    let mut raw = Vec::with_capacity(EXPIRY_HEADER_LEN + payload.len());
    raw.extend_from_slice(&expires_at.to_be_bytes());
    raw.extend_from_slice(payload);
    raw
}

/// Returns the payload of a stored entry, or `None` if the entry has expired.
/// Entries too short to carry the header are treated as expired.
fn live_payload(raw: &[u8], now: u64) -> Option<&[u8]> {
    if raw.len() < EXPIRY_HEADER_LEN {
        return None;
    }
    let mut header = [0u8; EXPIRY_HEADER_LEN];
    header.copy_from_slice(&raw[..EXPIRY_HEADER_LEN]);
    let expires_at = u64::from_be_bytes(header);
    if expires_at != 0 && now >= expires_at {
        return None;
    }
    Some(&raw[EXPIRY_HEADER_LEN..])
}

/// Read operations shared by read and write transactions.
pub trait KvRead {
    /// Returns the value stored under `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Returns whether a live value exists under `key`.
    fn contains(&self, key: &str) -> Result<bool, StorageError>;

    /// Returns all live `(key, value)` pairs whose key starts with `prefix`,
    /// in key order.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError>;

    /// Returns all live keys starting with `prefix`, without copying values.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Counts live keys starting with `prefix`. Only the expiry header of
    /// each entry is inspected.
    fn count_prefix(&self, prefix: &str) -> Result<usize, StorageError> {
        Ok(self.keys_with_prefix(prefix)?.len())
    }
}

/// A TTL-aware key-value store over a single redb database file.
pub struct KvStore {
    db: Database,
}

impl KvStore {
    /// Creates or opens a store at the given path.
    ///
    /// The parent directory is created if missing; redb requires a write
    /// transaction to create the table, so one is committed up front.
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let db = Database::create(db_path).map_err(|e| StorageError::Database(e.to_string()))?;

        let write_txn = db.begin_write().map_err(|e| StorageError::Database(e.to_string()))?;
        {
            let _table = write_txn
                .open_table(ENTRIES)
                .map_err(|e| StorageError::Database(e.to_string()))?;
        }
        write_txn.commit().map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(Self { db })
    }

    /// Begins a read-only transaction with a consistent snapshot.
    pub fn read(&self) -> Result<ReadTxn, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(ReadTxn { txn })
    }

    /// Begins a write transaction. All reads within it observe its own
    /// uncommitted writes; nothing is visible to others until `commit`.
    pub fn write(&self) -> Result<WriteTxn, StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(WriteTxn { txn })
    }

    /// Deletes every expired entry and returns how many were removed.
    pub fn reap_expired(&self) -> Result<usize, StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Database(e.to_string()))?;
        let removed;
        {
            let mut table =
                txn.open_table(ENTRIES).map_err(|e| StorageError::Database(e.to_string()))?;
            let now = now_millis();

            let mut dead = Vec::new();
            for item in table.iter().map_err(|e| StorageError::Database(e.to_string()))? {
                let (key, value) = item.map_err(|e| StorageError::Database(e.to_string()))?;
                if live_payload(value.value(), now).is_none() {
                    dead.push(key.value().to_string());
                }
            }

            for key in &dead {
                table
                    .remove(key.as_str())
                    .map_err(|e| StorageError::Database(e.to_string()))?;
            }
            removed = dead.len();
        }
        txn.commit().map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(removed)
    }

    /// Closes the store. Committed writes are already durable; this drops
    /// the database handle and releases the file lock.
    pub fn close(self) -> Result<(), StorageError> {
        drop(self.db);
        Ok(())
    }
}

/// A read-only snapshot transaction.
pub struct ReadTxn {
    txn: redb::ReadTransaction,
}

impl KvRead for ReadTxn {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let table =
            self.txn.open_table(ENTRIES).map_err(|e| StorageError::Database(e.to_string()))?;
        read_one(&table, key)
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        let table =
            self.txn.open_table(ENTRIES).map_err(|e| StorageError::Database(e.to_string()))?;
        contains_one(&table, key)
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
        let table =
            self.txn.open_table(ENTRIES).map_err(|e| StorageError::Database(e.to_string()))?;
        scan(&table, prefix)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let table =
            self.txn.open_table(ENTRIES).map_err(|e| StorageError::Database(e.to_string()))?;
        scan_keys(&table, prefix)
    }
}

/// A serializable write transaction. Dropped without [`WriteTxn::commit`],
/// all of its writes are discarded.
pub struct WriteTxn {
    txn: redb::WriteTransaction,
}

impl WriteTxn {
    /// Stores a value that never expires.
    pub fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.set_raw(key, encode_entry(value, 0))
    }

    /// Stores a value that becomes unreadable once `ttl` has elapsed.
    pub fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StorageError> {
        let expires_at = now_millis().saturating_add(ttl.as_millis() as u64);
        self.set_raw(key, encode_entry(value, expires_at))
    }

    fn set_raw(&self, key: &str, raw: Vec<u8>) -> Result<(), StorageError> {
        let mut table =
            self.txn.open_table(ENTRIES).map_err(|e| StorageError::Database(e.to_string()))?;
        table
            .insert(key, raw.as_slice())
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    /// Removes a key. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut table =
            self.txn.open_table(ENTRIES).map_err(|e| StorageError::Database(e.to_string()))?;
        table.remove(key).map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    /// Commits the transaction, making all writes durable and visible.
    pub fn commit(self) -> Result<(), StorageError> {
        self.txn.commit().map_err(|e| StorageError::Database(e.to_string()))
    }
}

impl KvRead for WriteTxn {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let table =
            self.txn.open_table(ENTRIES).map_err(|e| StorageError::Database(e.to_string()))?;
        read_one(&table, key)
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        let table =
            self.txn.open_table(ENTRIES).map_err(|e| StorageError::Database(e.to_string()))?;
        contains_one(&table, key)
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
        let table =
            self.txn.open_table(ENTRIES).map_err(|e| StorageError::Database(e.to_string()))?;
        scan(&table, prefix)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let table =
            self.txn.open_table(ENTRIES).map_err(|e| StorageError::Database(e.to_string()))?;
        scan_keys(&table, prefix)
    }
}

fn read_one<T>(table: &T, key: &str) -> Result<Option<Vec<u8>>, StorageError>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(key) {
        // Copy the payload out of the AccessGuard before the guard is dropped
        Ok(Some(value)) => Ok(live_payload(value.value(), now_millis()).map(<[u8]>::to_vec)),
        Ok(None) => Ok(None),
        Err(e) => Err(StorageError::Database(e.to_string())),
    }
}

fn contains_one<T>(table: &T, key: &str) -> Result<bool, StorageError>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(key) {
        Ok(Some(value)) => Ok(live_payload(value.value(), now_millis()).is_some()),
        Ok(None) => Ok(false),
        Err(e) => Err(StorageError::Database(e.to_string())),
    }
}

fn scan<T>(table: &T, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let now = now_millis();
    let mut results = Vec::new();
    for item in table.range(prefix..).map_err(|e| StorageError::Database(e.to_string()))? {
        let (key, value) = item.map_err(|e| StorageError::Database(e.to_string()))?;
        let key_str = key.value();
        if !key_str.starts_with(prefix) {
            break;
        }
        if let Some(payload) = live_payload(value.value(), now) {
            results.push((key_str.to_string(), payload.to_vec()));
        }
    }
    Ok(results)
}

fn scan_keys<T>(table: &T, prefix: &str) -> Result<Vec<String>, StorageError>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let now = now_millis();
    let mut results = Vec::new();
    for item in table.range(prefix..).map_err(|e| StorageError::Database(e.to_string()))? {
        let (key, value) = item.map_err(|e| StorageError::Database(e.to_string()))?;
        let key_str = key.value();
        if !key_str.starts_with(prefix) {
            break;
        }
        if live_payload(value.value(), now).is_some() {
            results.push(key_str.to_string());
        }
    }
    Ok(results)
}
