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

//! Role operations.

use chrono::Utc;

use iam_core::{EntityKind, KvRead};

use crate::authz::SystemAction;
use crate::error::IamError;
use crate::manager::{merge_names, put_record, require_record, valid_name, Context, Manager};
use crate::models::{Group, Policy, Role, User};

impl Manager {
    /// Adds a role to the system.
    pub fn add_role(&self, ctx: &Context, name: &str, description: &str) -> Result<Role, IamError> {
        self.authorize(ctx, SystemAction::AddRole)?;

        if !valid_name(name) {
            return Err(IamError::InvalidName { name: name.to_string() });
        }

        let txn = self.systemdb.write()?;
        if txn.contains(&EntityKind::Role.key(name))? {
            return Err(IamError::AlreadyExists {
                kind: EntityKind::Role,
                name: name.to_string(),
            });
        }

        let now = Utc::now();
        let role = Role {
            name: name.to_string(),
            description: description.to_string(),
            created: now,
            created_by: ctx.name().to_string(),
            updated: now,
            updated_by: ctx.name().to_string(),
            policies: vec![],
            users: vec![],
            groups: vec![],
        };

        put_record(&txn, EntityKind::Role, name, &role)?;
        txn.commit()?;

        Ok(role)
    }

    /// Gets a role from the system.
    pub fn get_role(&self, ctx: &Context, name: &str) -> Result<Role, IamError> {
        self.authorize(ctx, SystemAction::GetRole)?;

        let txn = self.systemdb.read()?;
        require_record(&txn, EntityKind::Role, name)
    }

    /// Gets all roles in the system.
    pub fn get_all_roles(&self, ctx: &Context) -> Result<Vec<Role>, IamError> {
        self.authorize(ctx, SystemAction::GetAllRoles)?;

        let txn = self.systemdb.read()?;
        let mut roles = Vec::new();
        for (_, raw) in txn.scan_prefix(&EntityKind::Role.prefix())? {
            roles.push(serde_json::from_slice(&raw)?);
        }
        Ok(roles)
    }

    /// Attaches policies to a role, tracking the relationship at the role
    /// level and at the policy level.
    pub fn attach_policies_to_role(
        &self,
        ctx: &Context,
        role_name: &str,
        policy_names: &[String],
    ) -> Result<Role, IamError> {
        self.authorize(ctx, SystemAction::AttachPoliciesToRole)?;

        let txn = self.systemdb.write()?;
        let mut role: Role = require_record(&txn, EntityKind::Role, role_name)?;

        let mut affected: Vec<Policy> = Vec::with_capacity(policy_names.len());
        for policy_name in policy_names {
            affected.push(require_record(&txn, EntityKind::Policy, policy_name)?);
        }

        role.policies = merge_names(&role.policies, policy_names);
        put_record(&txn, EntityKind::Role, role_name, &role)?;

        for mut policy in affected {
            policy.roles = merge_names(&policy.roles, &[role_name.to_string()]);
            put_record(&txn, EntityKind::Policy, &policy.name, &policy)?;
        }

        txn.commit()?;
        Ok(role)
    }

    /// Attaches a role to the given users.
    pub fn attach_role_to_users(
        &self,
        ctx: &Context,
        role_name: &str,
        user_names: &[String],
    ) -> Result<Role, IamError> {
        self.authorize(ctx, SystemAction::AttachRoleToUsers)?;

        let txn = self.systemdb.write()?;
        let mut role: Role = require_record(&txn, EntityKind::Role, role_name)?;

        let mut affected: Vec<User> = Vec::with_capacity(user_names.len());
        for user_name in user_names {
            affected.push(require_record(&txn, EntityKind::User, user_name)?);
        }

        role.users = merge_names(&role.users, user_names);
        put_record(&txn, EntityKind::Role, role_name, &role)?;

        for mut user in affected {
            user.roles = merge_names(&user.roles, &[role_name.to_string()]);
            put_record(&txn, EntityKind::User, &user.name, &user)?;
        }

        txn.commit()?;
        Ok(role)
    }

    /// Attaches a role to the given groups.
    pub fn attach_role_to_groups(
        &self,
        ctx: &Context,
        role_name: &str,
        group_names: &[String],
    ) -> Result<Role, IamError> {
        self.authorize(ctx, SystemAction::AttachRoleToGroups)?;

        let txn = self.systemdb.write()?;
        let mut role: Role = require_record(&txn, EntityKind::Role, role_name)?;

        let mut affected: Vec<Group> = Vec::with_capacity(group_names.len());
        for group_name in group_names {
            affected.push(require_record(&txn, EntityKind::Group, group_name)?);
        }

        role.groups = merge_names(&role.groups, group_names);
        put_record(&txn, EntityKind::Role, role_name, &role)?;

        for mut group in affected {
            group.roles = merge_names(&group.roles, &[role_name.to_string()]);
            put_record(&txn, EntityKind::Group, &group.name, &group)?;
        }

        txn.commit()?;
        Ok(role)
    }
}
