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

//! Group operations.

use chrono::Utc;

use iam_core::{EntityKind, KvRead};

use crate::authz::SystemAction;
use crate::error::IamError;
use crate::manager::{
    merge_names, put_record, require_record, valid_name, Context, Manager,
};
use crate::models::{Group, User};

impl Manager {
    /// Adds a group to the system.
    pub fn add_group(&self, ctx: &Context, name: &str, description: &str) -> Result<Group, IamError> {
        self.authorize(ctx, SystemAction::AddGroup)?;

        if !valid_name(name) {
            return Err(IamError::InvalidName { name: name.to_string() });
        }

        let txn = self.systemdb.write()?;
        if txn.contains(&EntityKind::Group.key(name))? {
            return Err(IamError::AlreadyExists {
                kind: EntityKind::Group,
                name: name.to_string(),
            });
        }

        let now = Utc::now();
        let group = Group {
            name: name.to_string(),
            description: description.to_string(),
            created: now,
            created_by: ctx.name().to_string(),
            updated: now,
            updated_by: ctx.name().to_string(),
            users: vec![],
            policies: vec![],
            roles: vec![],
        };

        put_record(&txn, EntityKind::Group, name, &group)?;
        txn.commit()?;

        Ok(group)
    }

    /// Gets a group from the system.
    pub fn get_group(&self, ctx: &Context, name: &str) -> Result<Group, IamError> {
        self.authorize(ctx, SystemAction::GetGroup)?;

        let txn = self.systemdb.read()?;
        require_record(&txn, EntityKind::Group, name)
    }

    /// Gets all groups in the system.
    pub fn get_all_groups(&self, ctx: &Context) -> Result<Vec<Group>, IamError> {
        self.authorize(ctx, SystemAction::GetAllGroups)?;

        let txn = self.systemdb.read()?;
        let mut groups = Vec::new();
        for (_, raw) in txn.scan_prefix(&EntityKind::Group.prefix())? {
            groups.push(serde_json::from_slice(&raw)?);
        }
        Ok(groups)
    }

    /// Adds users to a group, tracking the membership on both sides.
    ///
    /// The group and every named user must exist; nothing is written
    /// otherwise. Both edge lists are merged as sorted, deduplicated unions,
    /// so repeating the call changes nothing.
    pub fn add_users_to_group(
        &self,
        ctx: &Context,
        group_name: &str,
        user_names: &[String],
    ) -> Result<Group, IamError> {
        self.authorize(ctx, SystemAction::AddUsersToGroup)?;

        let txn = self.systemdb.write()?;
        let mut group: Group = require_record(&txn, EntityKind::Group, group_name)?;

        // Validate every user before writing anything
        let mut affected: Vec<User> = Vec::with_capacity(user_names.len());
        for user_name in user_names {
            affected.push(require_record(&txn, EntityKind::User, user_name)?);
        }

        group.users = merge_names(&group.users, user_names);
        put_record(&txn, EntityKind::Group, group_name, &group)?;

        for mut user in affected {
            user.groups = merge_names(&user.groups, &[group_name.to_string()]);
            put_record(&txn, EntityKind::User, &user.name, &user)?;
        }

        txn.commit()?;
        Ok(group)
    }
}
