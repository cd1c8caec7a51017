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

//! System overview counts and name search.
//!
//! Both queries are gated per entity kind by the corresponding `GetAll*`
//! verb: kinds the caller may not enumerate are silently omitted (zero
//! counts, empty match lists).

use regex::Regex;

use iam_core::{EntityKind, KvRead};

use crate::authz::SystemAction;
use crate::error::IamError;
use crate::manager::{Context, Manager};
use crate::models::{SearchResults, SystemOverview};

impl Manager {
    /// Gets per-kind record counts via key-only prefix iteration.
    pub fn get_overview(&self, ctx: &Context) -> Result<SystemOverview, IamError> {
        let txn = self.systemdb.read()?;
        let mut overview = SystemOverview::default();

        if self.can(ctx, SystemAction::GetAllUsers) {
            overview.user_count = txn.count_prefix(&EntityKind::User.prefix())?;
        }
        if self.can(ctx, SystemAction::GetAllGroups) {
            overview.group_count = txn.count_prefix(&EntityKind::Group.prefix())?;
        }
        if self.can(ctx, SystemAction::GetAllRoles) {
            overview.role_count = txn.count_prefix(&EntityKind::Role.prefix())?;
        }
        if self.can(ctx, SystemAction::GetAllPolicies) {
            overview.policy_count = txn.count_prefix(&EntityKind::Policy.prefix())?;
        }
        if self.can(ctx, SystemAction::GetAllResources) {
            overview.resource_count = txn.count_prefix(&EntityKind::Resource.prefix())?;
        }

        Ok(overview)
    }

    /// Finds entity names matching the search expression,
    /// case-insensitively.
    pub fn search(&self, ctx: &Context, expression: &str) -> Result<SearchResults, IamError> {
        let pattern = Regex::new(&format!("(?i){expression}"))
            .map_err(|e| IamError::InvalidSearch(e.to_string()))?;

        let txn = self.systemdb.read()?;
        let mut results = SearchResults::default();

        if self.can(ctx, SystemAction::GetAllUsers) {
            results.users = matching_names(&txn, EntityKind::User, &pattern)?;
        }
        if self.can(ctx, SystemAction::GetAllGroups) {
            results.groups = matching_names(&txn, EntityKind::Group, &pattern)?;
        }
        if self.can(ctx, SystemAction::GetAllRoles) {
            results.roles = matching_names(&txn, EntityKind::Role, &pattern)?;
        }
        if self.can(ctx, SystemAction::GetAllPolicies) {
            results.policies = matching_names(&txn, EntityKind::Policy, &pattern)?;
        }
        if self.can(ctx, SystemAction::GetAllResources) {
            results.resources = matching_names(&txn, EntityKind::Resource, &pattern)?;
        }

        Ok(results)
    }

    fn can(&self, ctx: &Context, action: SystemAction) -> bool {
        self.authorize(ctx, action).is_ok()
    }
}

/// Names under the kind's prefix whose name part matches the pattern.
fn matching_names(
    txn: &impl KvRead,
    kind: EntityKind,
    pattern: &Regex,
) -> Result<Vec<String>, IamError> {
    let keys = txn.keys_with_prefix(&kind.prefix())?;
    Ok(keys
        .iter()
        .filter_map(|key| kind.strip(key))
        .filter(|name| pattern.is_match(name))
        .map(str::to_string)
        .collect())
}
