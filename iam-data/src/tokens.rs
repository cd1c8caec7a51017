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

//! Bearer token issuance and lookup.
//!
//! Tokens live in their own datastore, written with a TTL equal to their
//! lifetime so the substrate evicts them on schedule. They cannot be
//! revoked; they expire.

use std::time::Duration;

use chrono::Utc;

use iam_core::EntityKind;

use crate::error::IamError;
use crate::manager::{get_record, put_record_with_ttl, random_id, require_record, Manager};
use crate::models::{Token, User};

impl Manager {
    /// Mints a new token for the given user.
    ///
    /// The user must exist, be enabled, and not be tombstoned.
    pub fn new_token(&self, user: &User, expires_after: Duration) -> Result<Token, IamError> {
        {
            let txn = self.systemdb.read()?;
            let stored: User = require_record(&txn, EntityKind::User, &user.name)?;
            if !stored.enabled || stored.deleted.is_some() {
                return Err(IamError::InvalidCredentials);
            }
        }

        let now = Utc::now();
        let token = Token {
            id: random_id(),
            user: user.name.clone(),
            created: now,
            expires: now + chrono::Duration::milliseconds(expires_after.as_millis() as i64),
        };

        let txn = self.tokendb.write()?;
        put_record_with_ttl(&txn, EntityKind::Token, &token.id, &token, expires_after)?;
        txn.commit()?;

        Ok(token)
    }

    /// Resolves a token id to its user.
    ///
    /// Internally distinguishes an unknown token from an expired one; both
    /// read as 401 at the API boundary. A token whose user has been
    /// disabled or tombstoned in the meantime no longer authenticates.
    pub fn user_for_token(&self, token_id: &str) -> Result<User, IamError> {
        let txn = self.tokendb.read()?;
        let token: Token =
            get_record(&txn, EntityKind::Token, token_id)?.ok_or(IamError::TokenUnknown)?;

        if Utc::now() >= token.expires {
            return Err(IamError::TokenExpired);
        }

        let sys = self.systemdb.read()?;
        let user: User =
            get_record(&sys, EntityKind::User, &token.user)?.ok_or(IamError::TokenUnknown)?;

        if !user.enabled || user.deleted.is_some() {
            return Err(IamError::TokenUnknown);
        }

        Ok(user)
    }
}
