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

//! Policy operations and the effective-policy resolver.

use std::collections::BTreeMap;

use chrono::Utc;

use iam_core::{EntityKind, KvRead};

use crate::authz::SystemAction;
use crate::error::IamError;
use crate::manager::{
    get_record, merge_names, put_record, require_record, valid_name, Context, Manager,
};
use crate::models::{Group, Policy, Role, User};

impl Manager {
    /// Adds a policy to the system.
    ///
    /// Validation on creation: the effect must be `allow` or `deny`, the
    /// resource and action lists must be non-empty, and every resource
    /// element that is not a `<regex>` pattern must name an existing
    /// resource.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `InvalidName`, `AlreadyExists`, `InvalidPolicy`.
    pub fn add_policy(
        &self,
        ctx: &Context,
        name: &str,
        effect: &str,
        resources: Vec<String>,
        actions: Vec<String>,
    ) -> Result<Policy, IamError> {
        self.authorize(ctx, SystemAction::AddPolicy)?;

        if !valid_name(name) {
            return Err(IamError::InvalidName { name: name.to_string() });
        }
        if effect != Policy::ALLOW && effect != Policy::DENY {
            return Err(IamError::InvalidPolicy(
                "policy must have 'allow' or 'deny' effect".to_string(),
            ));
        }
        if resources.is_empty() || actions.is_empty() {
            return Err(IamError::InvalidPolicy(
                "policy must have 'resources' and 'actions' associated with it".to_string(),
            ));
        }

        let txn = self.systemdb.write()?;
        if txn.contains(&EntityKind::Policy.key(name))? {
            return Err(IamError::AlreadyExists {
                kind: EntityKind::Policy,
                name: name.to_string(),
            });
        }

        // Literal resource names have to exist; regex patterns are accepted
        // unchecked
        for resource in &resources {
            if resource.contains(['<', '>']) {
                continue;
            }
            if !txn.contains(&EntityKind::Resource.key(resource))? {
                return Err(IamError::InvalidPolicy(format!(
                    "resource '{resource}' doesn't exist"
                )));
            }
        }

        let now = Utc::now();
        let policy = Policy {
            name: name.to_string(),
            effect: effect.to_string(),
            resources,
            actions,
            created: now,
            created_by: ctx.name().to_string(),
            updated: now,
            updated_by: ctx.name().to_string(),
            roles: vec![],
            users: vec![],
            groups: vec![],
        };

        put_record(&txn, EntityKind::Policy, name, &policy)?;
        txn.commit()?;

        Ok(policy)
    }

    /// Gets a policy from the system.
    pub fn get_policy(&self, ctx: &Context, name: &str) -> Result<Policy, IamError> {
        self.authorize(ctx, SystemAction::GetPolicy)?;

        let txn = self.systemdb.read()?;
        require_record(&txn, EntityKind::Policy, name)
    }

    /// Gets all policies in the system.
    pub fn get_all_policies(&self, ctx: &Context) -> Result<Vec<Policy>, IamError> {
        self.authorize(ctx, SystemAction::GetAllPolicies)?;

        let txn = self.systemdb.read()?;
        let mut policies = Vec::new();
        for (_, raw) in txn.scan_prefix(&EntityKind::Policy.prefix())? {
            policies.push(serde_json::from_slice(&raw)?);
        }
        Ok(policies)
    }

    /// Attaches a policy to the given users.
    pub fn attach_policy_to_users(
        &self,
        ctx: &Context,
        policy_name: &str,
        user_names: &[String],
    ) -> Result<Policy, IamError> {
        self.authorize(ctx, SystemAction::AttachPolicyToUsers)?;

        let txn = self.systemdb.write()?;
        let mut policy: Policy = require_record(&txn, EntityKind::Policy, policy_name)?;

        let mut affected: Vec<User> = Vec::with_capacity(user_names.len());
        for user_name in user_names {
            affected.push(require_record(&txn, EntityKind::User, user_name)?);
        }

        policy.users = merge_names(&policy.users, user_names);
        put_record(&txn, EntityKind::Policy, policy_name, &policy)?;

        for mut user in affected {
            user.policies = merge_names(&user.policies, &[policy_name.to_string()]);
            put_record(&txn, EntityKind::User, &user.name, &user)?;
        }

        txn.commit()?;
        Ok(policy)
    }

    /// Attaches a policy to the given groups.
    pub fn attach_policy_to_groups(
        &self,
        ctx: &Context,
        policy_name: &str,
        group_names: &[String],
    ) -> Result<Policy, IamError> {
        self.authorize(ctx, SystemAction::AttachPolicyToGroups)?;

        let txn = self.systemdb.write()?;
        let mut policy: Policy = require_record(&txn, EntityKind::Policy, policy_name)?;

        let mut affected: Vec<Group> = Vec::with_capacity(group_names.len());
        for group_name in group_names {
            affected.push(require_record(&txn, EntityKind::Group, group_name)?);
        }

        policy.groups = merge_names(&policy.groups, group_names);
        put_record(&txn, EntityKind::Policy, policy_name, &policy)?;

        for mut group in affected {
            group.policies = merge_names(&group.policies, &[policy_name.to_string()]);
            put_record(&txn, EntityKind::Group, &group.name, &group)?;
        }

        txn.commit()?;
        Ok(policy)
    }

    /// Gets the effective policy set for a user, for callers outside the
    /// self-authorizer. Authorized as its own administrative verb.
    pub fn get_policies_for_user(
        &self,
        ctx: &Context,
        user_name: &str,
    ) -> Result<BTreeMap<String, Policy>, IamError> {
        self.authorize(ctx, SystemAction::GetPoliciesForUser)?;
        self.effective_policies(user_name)
    }

    /// Resolves the effective policy set for a user. Chains include:
    /// user → policies, user → role → policies, user → group → policies,
    /// and user → group → role → policies.
    ///
    /// Performs no authorization itself — the self-authorizer is built on
    /// top of it. Missing intermediate groups, roles, and policies are
    /// tolerated silently so a torn attachment cannot wedge every
    /// evaluation for the user.
    pub(crate) fn effective_policies(
        &self,
        user_name: &str,
    ) -> Result<BTreeMap<String, Policy>, IamError> {
        let txn = self.systemdb.read()?;
        let user: User = require_record(&txn, EntityKind::User, user_name)?;

        let mut policies_in_effect: Vec<String> = user.policies.clone();
        let mut roles_in_effect: Vec<String> = user.roles.clone();

        for group_name in &user.groups {
            if let Some(group) = get_record::<Group, _>(&txn, EntityKind::Group, group_name)? {
                policies_in_effect.extend(group.policies.iter().cloned());
                roles_in_effect.extend(group.roles.iter().cloned());
            }
        }

        roles_in_effect.sort();
        roles_in_effect.dedup();
        for role_name in &roles_in_effect {
            if let Some(role) = get_record::<Role, _>(&txn, EntityKind::Role, role_name)? {
                policies_in_effect.extend(role.policies.iter().cloned());
            }
        }

        policies_in_effect.sort();
        policies_in_effect.dedup();
        let mut effective = BTreeMap::new();
        for policy_name in &policies_in_effect {
            if let Some(policy) = get_record::<Policy, _>(&txn, EntityKind::Policy, policy_name)? {
                effective.insert(policy.name.clone(), policy);
            }
        }

        Ok(effective)
    }
}
