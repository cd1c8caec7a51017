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

//! User operations: create, read, soft-delete, credential verification.

use std::time::Duration;

use chrono::Utc;

use iam_core::{EntityKind, KvRead};

use crate::authz::SystemAction;
use crate::error::IamError;
use crate::manager::{
    get_record, put_record, put_record_with_ttl, remove_name, require_record, valid_name, Context,
    Manager,
};
use crate::models::{Group, Policy, Role, User};

/// How long a deleted user's tombstone stays readable: one week.
pub const TOMBSTONE_TTL: Duration = Duration::from_secs(168 * 60 * 60);

impl Manager {
    /// Adds a user to the system.
    ///
    /// The password is bcrypt-hashed before the transaction opens; the user
    /// starts enabled with empty group/policy/role sets.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `InvalidName`, `AlreadyExists`, `Hash`.
    pub fn add_user(
        &self,
        ctx: &Context,
        name: &str,
        description: &str,
        password: &str,
    ) -> Result<User, IamError> {
        self.authorize(ctx, SystemAction::AddUser)?;

        if !valid_name(name) {
            return Err(IamError::InvalidName { name: name.to_string() });
        }

        // Hashing is slow; keep it outside the write transaction
        let secret_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

        let txn = self.systemdb.write()?;
        if txn.contains(&EntityKind::User.key(name))? {
            return Err(IamError::AlreadyExists {
                kind: EntityKind::User,
                name: name.to_string(),
            });
        }

        let now = Utc::now();
        let user = User {
            name: name.to_string(),
            description: description.to_string(),
            enabled: true,
            secret_hash,
            totp_enabled: false,
            totp_secret: String::new(),
            created: now,
            created_by: ctx.name().to_string(),
            updated: now,
            updated_by: ctx.name().to_string(),
            deleted: None,
            deleted_by: None,
            groups: vec![],
            policies: vec![],
            roles: vec![],
        };

        put_record(&txn, EntityKind::User, name, &user)?;
        txn.commit()?;

        Ok(user)
    }

    /// Gets a user from the system.
    pub fn get_user(&self, ctx: &Context, name: &str) -> Result<User, IamError> {
        self.authorize(ctx, SystemAction::GetUser)?;

        let txn = self.systemdb.read()?;
        require_record(&txn, EntityKind::User, name)
    }

    /// Gets all users in the system, tombstones included while their TTL
    /// lasts.
    pub fn get_all_users(&self, ctx: &Context) -> Result<Vec<User>, IamError> {
        self.authorize(ctx, SystemAction::GetAllUsers)?;

        let txn = self.systemdb.read()?;
        let mut users = Vec::new();
        for (_, raw) in txn.scan_prefix(&EntityKind::User.prefix())? {
            users.push(serde_json::from_slice(&raw)?);
        }
        Ok(users)
    }

    /// Soft-deletes a user.
    ///
    /// The record is tombstoned (disabled, back-references cleared, deletion
    /// attributed) and rewritten with a one-week TTL. In the same
    /// transaction the user is removed from every group, role, and policy
    /// that still references them, so no dangling edges survive the commit.
    pub fn delete_user(&self, ctx: &Context, name: &str) -> Result<User, IamError> {
        self.authorize(ctx, SystemAction::DeleteUser)?;

        let txn = self.systemdb.write()?;
        let mut user: User = require_record(&txn, EntityKind::User, name)?;

        // Detach from neighbours; a missing neighbour is a torn attachment
        // and is skipped
        for group_name in &user.groups {
            if let Some(mut group) = get_record::<Group, _>(&txn, EntityKind::Group, group_name)? {
                remove_name(&mut group.users, name);
                put_record(&txn, EntityKind::Group, group_name, &group)?;
            }
        }
        for role_name in &user.roles {
            if let Some(mut role) = get_record::<Role, _>(&txn, EntityKind::Role, role_name)? {
                remove_name(&mut role.users, name);
                put_record(&txn, EntityKind::Role, role_name, &role)?;
            }
        }
        for policy_name in &user.policies {
            if let Some(mut policy) = get_record::<Policy, _>(&txn, EntityKind::Policy, policy_name)? {
                remove_name(&mut policy.users, name);
                put_record(&txn, EntityKind::Policy, policy_name, &policy)?;
            }
        }

        let now = Utc::now();
        user.enabled = false;
        user.groups.clear();
        user.roles.clear();
        user.policies.clear();
        user.deleted = Some(now);
        user.deleted_by = Some(ctx.name().to_string());
        user.updated = now;
        user.updated_by = ctx.name().to_string();

        put_record_with_ttl(&txn, EntityKind::User, name, &user, TOMBSTONE_TTL)?;
        txn.commit()?;

        Ok(user)
    }

    /// Gets a user given a set of credentials.
    ///
    /// Every failure mode — unknown user, tombstoned or disabled user,
    /// undecodable record, wrong password — collapses to the single
    /// [`IamError::InvalidCredentials`] so callers cannot probe for which
    /// part was wrong.
    pub fn get_user_with_credentials(&self, name: &str, secret: &str) -> Result<User, IamError> {
        let user = self
            .load_credential_user(name)
            .map_err(|_| IamError::InvalidCredentials)?;

        if !user.enabled || user.deleted.is_some() {
            return Err(IamError::InvalidCredentials);
        }

        let matches = bcrypt::verify(secret, &user.secret_hash).unwrap_or(false);
        if !matches {
            return Err(IamError::InvalidCredentials);
        }

        Ok(user)
    }

    fn load_credential_user(&self, name: &str) -> Result<User, IamError> {
        let txn = self.systemdb.read()?;
        require_record(&txn, EntityKind::User, name)
    }
}
