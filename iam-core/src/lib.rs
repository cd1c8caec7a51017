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

//! Storage substrate for the IAM server.
//!
//! This crate owns the two low-level concerns every other crate builds on:
//! the entity key codec ([`keys`]) and a transactional, TTL-aware key-value
//! store ([`kv`]) backed by redb.

pub mod error;
pub mod keys;
pub mod kv;

pub use error::StorageError;
pub use keys::EntityKind;
pub use kv::{KvRead, KvStore, ReadTxn, WriteTxn};
