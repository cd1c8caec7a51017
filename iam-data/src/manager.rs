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

//! The data manager: owns the system and token datastores.

use std::path::Path;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use iam_core::keys::KEY_DELIMITER;
use iam_core::{EntityKind, KvRead, KvStore, WriteTxn};

use crate::error::IamError;
use crate::matcher::{RegexpMatcher, DEFAULT_PATTERN_CACHE};

/// Name reserved for the system principal that bootstrap runs as.
pub const SYSTEM_USER: &str = "System";

/// The principal an operation runs as.
///
/// [`Context::user`] is the only public constructor; the crate-private
/// bootstrap context is the single path that bypasses the self-authorizer,
/// and only [`crate::manager::Manager::bootstrap`] can reach it.
#[derive(Debug, Clone)]
pub struct Context {
    name: String,
    bootstrap: bool,
}

impl Context {
    /// A context acting as the named user. Every administrative operation
    /// run under it is checked against the user's effective policy set.
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bootstrap: false,
        }
    }

    pub(crate) fn bootstrap() -> Self {
        Self {
            name: SYSTEM_USER.to_string(),
            bootstrap: true,
        }
    }

    /// Name of the principal, used for attribution fields.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_bootstrap(&self) -> bool {
        self.bootstrap
    }
}

/// The data manager. Owns the entity datastore (`systemdb`), the token
/// datastore (`tokendb`), and the shared pattern matcher.
///
/// All methods take `&self`; the manager is meant to be shared behind an
/// `Arc` across request handlers.
pub struct Manager {
    pub(crate) systemdb: KvStore,
    pub(crate) tokendb: KvStore,
    pub(crate) matcher: RegexpMatcher,
}

impl Manager {
    /// Opens (or creates) the two datastores.
    pub fn open(systemdb_path: &Path, tokendb_path: &Path) -> Result<Self, IamError> {
        let systemdb = KvStore::open(systemdb_path)?;
        let tokendb = KvStore::open(tokendb_path)?;
        info!(systemdb = %systemdb_path.display(), tokendb = %tokendb_path.display(), "datastores opened");

        Ok(Self {
            systemdb,
            tokendb,
            matcher: RegexpMatcher::new(DEFAULT_PATTERN_CACHE),
        })
    }

    /// Closes both datastores. A failure on either close is surfaced as a
    /// composite error after both have been attempted.
    pub fn close(self) -> Result<(), IamError> {
        let syserr = self.systemdb.close().err();
        let tokerr = self.tokendb.close().err();

        if syserr.is_some() || tokerr.is_some() {
            return Err(IamError::CloseFailed(format!(
                "Syserr: {:?} / Tokerr: {:?}",
                syserr, tokerr
            )));
        }
        Ok(())
    }

    /// Deletes expired records from both datastores, returning how many were
    /// removed. Intended to be driven periodically by the server.
    pub fn reap_expired(&self) -> Result<usize, IamError> {
        let mut removed = self.systemdb.reap_expired()?;
        removed += self.tokendb.reap_expired()?;
        Ok(removed)
    }
}

/// Whether `name` is usable as an entity name: non-empty and free of the
/// key delimiter, so the key codec stays injective.
pub(crate) fn valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(KEY_DELIMITER)
}

/// Merged, sorted, duplicate-free union of two name lists.
pub(crate) fn merge_names(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut all: Vec<String> = existing.iter().chain(incoming.iter()).cloned().collect();
    all.sort();
    all.dedup();
    all
}

/// Removes every occurrence of `name` from the list, preserving order.
pub(crate) fn remove_name(list: &mut Vec<String>, name: &str) {
    list.retain(|n| n != name);
}

/// 20 random bytes from the OS RNG, hex-encoded. Used for token ids and the
/// generated admin password.
pub(crate) fn random_id() -> String {
    let mut bytes = [0u8; 20];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Loads and deserializes a record, or `None` if absent (or expired).
pub(crate) fn get_record<T: DeserializeOwned, R: KvRead>(
    txn: &R,
    kind: EntityKind,
    name: &str,
) -> Result<Option<T>, IamError> {
    match txn.get(&kind.key(name))? {
        Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
        None => Ok(None),
    }
}

/// Loads a record that must exist, mapping absence to [`IamError::NotFound`].
pub(crate) fn require_record<T: DeserializeOwned, R: KvRead>(
    txn: &R,
    kind: EntityKind,
    name: &str,
) -> Result<T, IamError> {
    get_record(txn, kind, name)?.ok_or_else(|| IamError::NotFound {
        kind,
        name: name.to_string(),
    })
}

/// Serializes and stores a record.
pub(crate) fn put_record<T: Serialize>(
    txn: &WriteTxn,
    kind: EntityKind,
    name: &str,
    value: &T,
) -> Result<(), IamError> {
    let encoded = serde_json::to_vec(value)?;
    txn.set(&kind.key(name), &encoded)?;
    Ok(())
}

/// Serializes and stores a record that expires after `ttl`.
pub(crate) fn put_record_with_ttl<T: Serialize>(
    txn: &WriteTxn,
    kind: EntityKind,
    name: &str,
    value: &T,
    ttl: Duration,
) -> Result<(), IamError> {
    let encoded = serde_json::to_vec(value)?;
    txn.set_with_ttl(&kind.key(name), &encoded, ttl)?;
    Ok(())
}
