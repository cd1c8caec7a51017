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

//! Key codec for the entity keyspace.
//!
//! Every persisted record lives under a key of the form `Kind:name`. Prefix
//! scans always use the kind plus the trailing delimiter, so that `Resource:`
//! can never match keys of another kind that happens to share a prefix
//! (e.g. `Role:`).

use std::fmt;

/// Separator between the entity kind and the entity name in a key.
/// Entity names must not contain this character.
pub const KEY_DELIMITER: char = ':';

/// The kinds of records stored in the system and token databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Group,
    Role,
    Policy,
    Resource,
    Token,
    TotpEnrollment,
}

impl EntityKind {
    /// Namespace string used in keys for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Group => "Group",
            EntityKind::Role => "Role",
            EntityKind::Policy => "Policy",
            EntityKind::Resource => "Resource",
            EntityKind::Token => "Token",
            EntityKind::TotpEnrollment => "TotpEnrollment",
        }
    }

    /// Full key for a named record of this kind.
    pub fn key(self, name: &str) -> String {
        format!("{}{}{}", self.as_str(), KEY_DELIMITER, name)
    }

    /// Iteration prefix for this kind, including the trailing delimiter.
    pub fn prefix(self) -> String {
        format!("{}{}", self.as_str(), KEY_DELIMITER)
    }

    /// Strips the kind prefix from a key, yielding the record name.
    /// Returns `None` if the key belongs to a different kind.
    pub fn strip<'a>(self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.as_str())?.strip_prefix(KEY_DELIMITER)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
