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

//! Decision engine and self-authorizer.
//!
//! [`SystemAction`] is the authoritative enumeration of the administrative
//! verbs: the per-operation authorization checks and the bootstrap seeding
//! of the `System` resource both derive from it, so the two can never drift.

use std::collections::BTreeMap;

use crate::error::IamError;
use crate::manager::{Context, Manager};
use crate::matcher::RegexpMatcher;
use crate::models::{Policy, Request, User};

/// Name of the resource administrative requests are evaluated against.
pub const SYSTEM_RESOURCE: &str = "System";

/// The administrative verbs. Every entity-store operation authorizes against
/// exactly one of these, and bootstrap registers all of them as actions on
/// the `System` resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemAction {
    AddUser,
    GetUser,
    GetAllUsers,
    DeleteUser,
    AddGroup,
    GetGroup,
    GetAllGroups,
    AddUsersToGroup,
    AddResource,
    GetResource,
    GetAllResources,
    AddActionToResource,
    AddRole,
    GetRole,
    GetAllRoles,
    AttachPoliciesToRole,
    AttachRoleToUsers,
    AttachRoleToGroups,
    AddPolicy,
    GetPolicy,
    GetAllPolicies,
    AttachPolicyToUsers,
    AttachPolicyToGroups,
    GetPoliciesForUser,
}

impl SystemAction {
    /// Every administrative verb, in declaration order.
    pub const ALL: [SystemAction; 24] = [
        SystemAction::AddUser,
        SystemAction::GetUser,
        SystemAction::GetAllUsers,
        SystemAction::DeleteUser,
        SystemAction::AddGroup,
        SystemAction::GetGroup,
        SystemAction::GetAllGroups,
        SystemAction::AddUsersToGroup,
        SystemAction::AddResource,
        SystemAction::GetResource,
        SystemAction::GetAllResources,
        SystemAction::AddActionToResource,
        SystemAction::AddRole,
        SystemAction::GetRole,
        SystemAction::GetAllRoles,
        SystemAction::AttachPoliciesToRole,
        SystemAction::AttachRoleToUsers,
        SystemAction::AttachRoleToGroups,
        SystemAction::AddPolicy,
        SystemAction::GetPolicy,
        SystemAction::GetAllPolicies,
        SystemAction::AttachPolicyToUsers,
        SystemAction::AttachPolicyToGroups,
        SystemAction::GetPoliciesForUser,
    ];

    /// The verb as it appears in policies and on the `System` resource.
    pub fn as_str(self) -> &'static str {
        match self {
            SystemAction::AddUser => "AddUser",
            SystemAction::GetUser => "GetUser",
            SystemAction::GetAllUsers => "GetAllUsers",
            SystemAction::DeleteUser => "DeleteUser",
            SystemAction::AddGroup => "AddGroup",
            SystemAction::GetGroup => "GetGroup",
            SystemAction::GetAllGroups => "GetAllGroups",
            SystemAction::AddUsersToGroup => "AddUsersToGroup",
            SystemAction::AddResource => "AddResource",
            SystemAction::GetResource => "GetResource",
            SystemAction::GetAllResources => "GetAllResources",
            SystemAction::AddActionToResource => "AddActionToResource",
            SystemAction::AddRole => "AddRole",
            SystemAction::GetRole => "GetRole",
            SystemAction::GetAllRoles => "GetAllRoles",
            SystemAction::AttachPoliciesToRole => "AttachPoliciesToRole",
            SystemAction::AttachRoleToUsers => "AttachRoleToUsers",
            SystemAction::AttachRoleToGroups => "AttachRoleToGroups",
            SystemAction::AddPolicy => "AddPolicy",
            SystemAction::GetPolicy => "GetPolicy",
            SystemAction::GetAllPolicies => "GetAllPolicies",
            SystemAction::AttachPolicyToUsers => "AttachPolicyToUsers",
            SystemAction::AttachPolicyToGroups => "AttachPolicyToGroups",
            SystemAction::GetPoliciesForUser => "GetPoliciesForUser",
        }
    }

    /// The synthetic request the self-authorizer evaluates for this verb.
    pub fn request(self) -> Request {
        Request {
            resource: SYSTEM_RESOURCE.to_string(),
            action: self.as_str().to_string(),
        }
    }
}

/// Outcome of evaluating a request against a policy set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// At least one allow policy matched and no deny policy did.
    Allowed,
    /// A deny-effect policy matched; overrides any allows.
    ExplicitDeny,
    /// No policy matched; denied by default.
    ImplicitDeny,
}

/// Evaluates a request against a policy set under deny-overrides semantics.
///
/// Any matching deny terminates evaluation; with no matching policy the
/// request is implicitly denied. Matcher failures abort the evaluation
/// rather than degrading to a deny.
pub fn evaluate(
    matcher: &RegexpMatcher,
    request: &Request,
    policies: &BTreeMap<String, Policy>,
) -> Result<Decision, IamError> {
    let mut allowed = false;

    for policy in policies.values() {
        if !matcher.matches(&policy.actions, &request.action)? {
            continue;
        }
        if !matcher.matches(&policy.resources, &request.resource)? {
            continue;
        }

        // A matching deny overrides all allow policies
        if policy.effect != Policy::ALLOW {
            return Ok(Decision::ExplicitDeny);
        }

        allowed = true;
    }

    if allowed {
        Ok(Decision::Allowed)
    } else {
        Ok(Decision::ImplicitDeny)
    }
}

/// Error-typed form of [`evaluate`]: `Ok(())` when allowed, otherwise
/// [`IamError::RequestForcefullyDenied`] (explicit deny) or
/// [`IamError::RequestDenied`] (no matching policy).
pub fn policies_allow(
    matcher: &RegexpMatcher,
    request: &Request,
    policies: &BTreeMap<String, Policy>,
) -> Result<(), IamError> {
    match evaluate(matcher, request, policies)? {
        Decision::Allowed => Ok(()),
        Decision::ExplicitDeny => Err(IamError::RequestForcefullyDenied),
        Decision::ImplicitDeny => Err(IamError::RequestDenied),
    }
}

impl Manager {
    /// The self-authorizer: resolves the context user's effective policies
    /// and evaluates the synthetic request for the given verb. Called at the
    /// top of every administrative operation.
    pub(crate) fn authorize(&self, ctx: &Context, action: SystemAction) -> Result<(), IamError> {
        if ctx.is_bootstrap() {
            return Ok(());
        }

        let denied = || IamError::Unauthorized {
            user: ctx.name().to_string(),
            action: action.as_str().to_string(),
        };

        // A context user that cannot be resolved has no policies
        let policies = self.effective_policies(ctx.name()).map_err(|e| match e {
            IamError::Matcher(_) | IamError::Storage(_) => e,
            _ => denied(),
        })?;

        match evaluate(&self.matcher, &action.request(), &policies)? {
            Decision::Allowed => Ok(()),
            Decision::ExplicitDeny | Decision::ImplicitDeny => Err(denied()),
        }
    }

    /// Evaluates an arbitrary request for a user: resolver then decision
    /// engine. This is what the authorize endpoint serves.
    pub fn authorize_request(&self, user: &User, request: &Request) -> Result<Decision, IamError> {
        let policies = match self.effective_policies(&user.name) {
            Ok(policies) => policies,
            Err(IamError::NotFound { .. }) => return Ok(Decision::ImplicitDeny),
            Err(e) => return Err(e),
        };
        evaluate(&self.matcher, request, &policies)
    }

    /// Boolean convenience over [`Manager::authorize_request`]; evaluation
    /// failures read as "not authorized".
    pub fn is_user_request_authorized(&self, user: &User, request: &Request) -> bool {
        matches!(self.authorize_request(user, request), Ok(Decision::Allowed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn policy(name: &str, effect: &str, resources: &[&str], actions: &[&str]) -> Policy {
        Policy {
            name: name.to_string(),
            effect: effect.to_string(),
            resources: resources.iter().map(|s| s.to_string()).collect(),
            actions: actions.iter().map(|s| s.to_string()).collect(),
            created: Utc::now(),
            created_by: "test".to_string(),
            updated: Utc::now(),
            updated_by: "test".to_string(),
            roles: vec![],
            users: vec![],
            groups: vec![],
        }
    }

    fn set(policies: Vec<Policy>) -> BTreeMap<String, Policy> {
        policies.into_iter().map(|p| (p.name.clone(), p)).collect()
    }

    #[test]
    fn test_default_deny() {
        let m = RegexpMatcher::default();
        let req = Request {
            resource: "Serenity".to_string(),
            action: "Embark".to_string(),
        };
        assert_eq!(evaluate(&m, &req, &BTreeMap::new()).unwrap(), Decision::ImplicitDeny);
    }

    #[test]
    fn test_allow_when_action_and_resource_match() {
        let m = RegexpMatcher::default();
        let policies = set(vec![policy(
            "RegularShip",
            Policy::ALLOW,
            &["Serenity"],
            &["Find", "Open", "Embark", "Disembark"],
        )]);

        let embark = Request {
            resource: "Serenity".to_string(),
            action: "Embark".to_string(),
        };
        assert_eq!(evaluate(&m, &embark, &policies).unwrap(), Decision::Allowed);

        let fly = Request {
            resource: "Serenity".to_string(),
            action: "Fly".to_string(),
        };
        assert_eq!(evaluate(&m, &fly, &policies).unwrap(), Decision::ImplicitDeny);

        let other_ship = Request {
            resource: "Alliance Cruiser".to_string(),
            action: "Embark".to_string(),
        };
        assert_eq!(evaluate(&m, &other_ship, &policies).unwrap(), Decision::ImplicitDeny);
    }

    #[test]
    fn test_deny_overrides_allow() {
        let m = RegexpMatcher::default();
        let policies = set(vec![
            policy("RegularShip", Policy::ALLOW, &["Serenity"], &["Embark"]),
            policy("DenyAll", Policy::DENY, &["Serenity"], &["<.*>"]),
        ]);

        let req = Request {
            resource: "Serenity".to_string(),
            action: "Embark".to_string(),
        };
        assert_eq!(evaluate(&m, &req, &policies).unwrap(), Decision::ExplicitDeny);
        assert!(matches!(
            policies_allow(&m, &req, &policies),
            Err(IamError::RequestForcefullyDenied)
        ));
    }

    #[test]
    fn test_deny_does_not_leak_to_orthogonal_requests() {
        let m = RegexpMatcher::default();
        let policies = set(vec![
            policy("DenyAll", Policy::DENY, &["Serenity"], &["<.*>"]),
            policy("Healthcare", Policy::ALLOW, &["Healthcare"], &["PresentHMOcard"]),
        ]);

        let req = Request {
            resource: "Healthcare".to_string(),
            action: "PresentHMOcard".to_string(),
        };
        assert_eq!(evaluate(&m, &req, &policies).unwrap(), Decision::Allowed);
    }

    #[test]
    fn test_matcher_error_is_fatal() {
        let m = RegexpMatcher::default();
        let policies = set(vec![policy("Broken", Policy::ALLOW, &["<.*>"], &["<[oops>"])]);

        let req = Request {
            resource: "Serenity".to_string(),
            action: "Embark".to_string(),
        };
        assert!(matches!(evaluate(&m, &req, &policies), Err(IamError::Matcher(_))));
    }

    #[test]
    fn test_system_action_table_is_complete() {
        assert_eq!(SystemAction::ALL.len(), 24);
        let req = SystemAction::AttachPolicyToGroups.request();
        assert_eq!(req.resource, SYSTEM_RESOURCE);
        assert_eq!(req.action, "AttachPolicyToGroups");
    }
}
