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

//! One-shot system bootstrap.

use tracing::info;

use crate::authz::{SystemAction, SYSTEM_RESOURCE};
use crate::error::IamError;
use crate::manager::{random_id, Context, Manager};
use crate::models::{Policy, User};

/// Name of the administrator account created by bootstrap.
pub const ADMIN_USER: &str = "admin";

/// Name of the administrators group created by bootstrap.
pub const ADMIN_GROUP: &str = "Administrators";

/// Name of the all-powerful policy created by bootstrap.
pub const ADMIN_POLICY: &str = "Administer everything";

/// Name of the system administrator role created by bootstrap.
pub const SYS_ADMIN_ROLE: &str = "sys_admin";

/// Pattern matching every resource or action.
const WILDCARD: &str = "<.*>";

fn step(name: &'static str) -> impl FnOnce(IamError) -> IamError {
    move |source| IamError::Bootstrap {
        step: name,
        source: Box::new(source),
    }
}

impl Manager {
    /// Sets up an empty system: admin user, `Administrators` group, the
    /// `System` resource carrying every administrative verb, the
    /// `Administer everything` policy, and the `sys_admin` role wiring them
    /// together.
    ///
    /// Runs under the crate-private bootstrap context — the only code path
    /// that bypasses the self-authorizer. Not idempotent: re-running fails
    /// on the first duplicate, and a mid-sequence failure leaves whatever
    /// already committed.
    ///
    /// Returns the admin user and the generated admin password. The
    /// password is not recoverable afterwards.
    pub fn bootstrap(&self) -> Result<(User, String), IamError> {
        let ctx = Context::bootstrap();

        let admin_password = random_id();
        let admin = self
            .add_user(&ctx, ADMIN_USER, "System administrator", &admin_password)
            .map_err(step("creating the admin user"))?;

        let group = self
            .add_group(&ctx, ADMIN_GROUP, "Users who can fully administer the system")
            .map_err(step("creating the Administrators group"))?;
        self.add_users_to_group(&ctx, &group.name, &[admin.name.clone()])
            .map_err(step("adding the admin user to the Administrators group"))?;

        self.add_resource(&ctx, SYSTEM_RESOURCE, "The system resource")
            .map_err(step("creating the system resource"))?;
        let verbs: Vec<String> =
            SystemAction::ALL.iter().map(|a| a.as_str().to_string()).collect();
        self.add_actions_to_resource(&ctx, SYSTEM_RESOURCE, &verbs)
            .map_err(step("registering the system actions"))?;

        self.add_policy(
            &ctx,
            ADMIN_POLICY,
            Policy::ALLOW,
            vec![WILDCARD.to_string()],
            vec![WILDCARD.to_string()],
        )
        .map_err(step("creating the 'administer everything' policy"))?;

        let role = self
            .add_role(&ctx, SYS_ADMIN_ROLE, "System administrator role")
            .map_err(step("creating the sys_admin role"))?;
        self.attach_policies_to_role(&ctx, &role.name, &[ADMIN_POLICY.to_string()])
            .map_err(step("attaching policies to the sys_admin role"))?;
        self.attach_role_to_groups(&ctx, &role.name, &[group.name.clone()])
            .map_err(step("attaching the sys_admin role to the Administrators group"))?;

        // Re-read so the returned record reflects the group membership
        let admin = self
            .get_user(&ctx, ADMIN_USER)
            .map_err(step("reading back the admin user"))?;

        info!(user = ADMIN_USER, "system bootstrap complete");
        Ok((admin, admin_password))
    }
}
