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

//! Resource operations.

use chrono::Utc;

use iam_core::{EntityKind, KvRead};

use crate::authz::SystemAction;
use crate::error::IamError;
use crate::manager::{merge_names, put_record, require_record, valid_name, Context, Manager};
use crate::models::Resource;

impl Manager {
    /// Adds a resource to the system.
    pub fn add_resource(
        &self,
        ctx: &Context,
        name: &str,
        description: &str,
    ) -> Result<Resource, IamError> {
        self.authorize(ctx, SystemAction::AddResource)?;

        if !valid_name(name) {
            return Err(IamError::InvalidName { name: name.to_string() });
        }

        let txn = self.systemdb.write()?;
        if txn.contains(&EntityKind::Resource.key(name))? {
            return Err(IamError::AlreadyExists {
                kind: EntityKind::Resource,
                name: name.to_string(),
            });
        }

        let now = Utc::now();
        let resource = Resource {
            name: name.to_string(),
            description: description.to_string(),
            created: now,
            created_by: ctx.name().to_string(),
            updated: now,
            updated_by: ctx.name().to_string(),
            actions: vec![],
        };

        put_record(&txn, EntityKind::Resource, name, &resource)?;
        txn.commit()?;

        Ok(resource)
    }

    /// Gets a resource from the system.
    pub fn get_resource(&self, ctx: &Context, name: &str) -> Result<Resource, IamError> {
        self.authorize(ctx, SystemAction::GetResource)?;

        let txn = self.systemdb.read()?;
        require_record(&txn, EntityKind::Resource, name)
    }

    /// Gets all resources in the system.
    pub fn get_all_resources(&self, ctx: &Context) -> Result<Vec<Resource>, IamError> {
        self.authorize(ctx, SystemAction::GetAllResources)?;

        let txn = self.systemdb.read()?;
        let mut resources = Vec::new();
        for (_, raw) in txn.scan_prefix(&EntityKind::Resource.prefix())? {
            resources.push(serde_json::from_slice(&raw)?);
        }
        Ok(resources)
    }

    /// Adds actions to a resource's informational action list.
    pub fn add_actions_to_resource(
        &self,
        ctx: &Context,
        resource_name: &str,
        actions: &[String],
    ) -> Result<Resource, IamError> {
        self.authorize(ctx, SystemAction::AddActionToResource)?;

        let txn = self.systemdb.write()?;
        let mut resource: Resource = require_record(&txn, EntityKind::Resource, resource_name)?;

        resource.actions = merge_names(&resource.actions, actions);
        put_record(&txn, EntityKind::Resource, resource_name, &resource)?;

        txn.commit()?;
        Ok(resource)
    }
}
