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

//! IAM data models.
//!
//! All named entities use their `name` as the primary key within their kind.
//! The `groups`/`policies`/`roles`/`users` vectors are denormalized
//! back-references: every edge is stored on both of its endpoints, kept
//! sorted and duplicate-free by the entity store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account.
///
/// Deleting a user leaves a tombstone: `enabled` is cleared, the
/// back-reference sets are emptied, `deleted`/`deleted_by` are set, and the
/// record itself is written with a one-week TTL.
///
/// Note: `secret_hash` and `totp_secret` are persisted but filtered out of
/// API responses via the [`UserResponse`] DTO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user name (primary key).
    pub name: String,

    /// Free-form description.
    pub description: String,

    /// Disabled users cannot authenticate or use tokens.
    pub enabled: bool,

    /// bcrypt digest of the user's password.
    pub secret_hash: String,

    /// Whether the user finished TOTP enrollment.
    pub totp_enabled: bool,

    /// Base32 TOTP secret (empty until enrollment finishes).
    pub totp_secret: String,

    /// Creation timestamp and attribution.
    pub created: DateTime<Utc>,
    pub created_by: String,

    /// Last-update timestamp and attribution.
    pub updated: DateTime<Utc>,
    pub updated_by: String,

    /// Tombstone marker; `None` while the user is live.
    pub deleted: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,

    /// Names of the groups this user belongs to.
    pub groups: Vec<String>,
    /// Names of the policies attached directly to this user.
    pub policies: Vec<String>,
    /// Names of the roles attached directly to this user.
    pub roles: Vec<String>,
}

/// User representation for API responses (secret material filtered out).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub totp_enabled: bool,
    pub created: DateTime<Utc>,
    pub created_by: String,
    pub updated: DateTime<Utc>,
    pub updated_by: String,
    pub deleted: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub groups: Vec<String>,
    pub policies: Vec<String>,
    pub roles: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            description: user.description,
            enabled: user.enabled,
            totp_enabled: user.totp_enabled,
            created: user.created,
            created_by: user.created_by,
            updated: user.updated,
            updated_by: user.updated_by,
            deleted: user.deleted,
            deleted_by: user.deleted_by,
            groups: user.groups,
            policies: user.policies,
            roles: user.roles,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        user.clone().into()
    }
}

/// A named collection of users. Policies and roles attached to a group apply
/// to every member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique group name (primary key).
    pub name: String,
    /// Free-form description.
    pub description: String,
    pub created: DateTime<Utc>,
    pub created_by: String,
    pub updated: DateTime<Utc>,
    pub updated_by: String,
    /// Names of the member users.
    pub users: Vec<String>,
    /// Names of the policies attached to this group.
    pub policies: Vec<String>,
    /// Names of the roles attached to this group.
    pub roles: Vec<String>,
}

/// A named collection of policies. Roles can be attached to users or groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique role name (primary key).
    pub name: String,
    /// Free-form description.
    pub description: String,
    pub created: DateTime<Utc>,
    pub created_by: String,
    pub updated: DateTime<Utc>,
    pub updated_by: String,
    /// Names of the policies grouped in this role.
    pub policies: Vec<String>,
    /// Names of the users this role is attached to.
    pub users: Vec<String>,
    /// Names of the groups this role is attached to.
    pub groups: Vec<String>,
}

/// An AWS-style policy document: an effect (`allow` or `deny`) plus pattern
/// lists naming the resources and actions it covers. Policies can be
/// attached to users and groups directly, or bundled into roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Unique policy name / statement id (primary key).
    pub name: String,
    /// `allow` or `deny`; validated on creation.
    pub effect: String,
    /// Resource patterns; literal unless wrapped in `<regex>` fragments.
    pub resources: Vec<String>,
    /// Action patterns; same syntax as `resources`.
    pub actions: Vec<String>,
    pub created: DateTime<Utc>,
    pub created_by: String,
    pub updated: DateTime<Utc>,
    pub updated_by: String,
    /// Names of the roles that bundle this policy.
    pub roles: Vec<String>,
    /// Names of the users this policy is attached to.
    pub users: Vec<String>,
    /// Names of the groups this policy is attached to.
    pub groups: Vec<String>,
}

impl Policy {
    /// The permissive policy effect.
    pub const ALLOW: &'static str = "allow";

    /// The non-permissive policy effect.
    pub const DENY: &'static str = "deny";
}

/// A thing that can be acted on. Mostly informational: because policies can
/// use patterns, resources are not consulted during evaluation, only when
/// validating literal policy resources at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource name (primary key).
    pub name: String,
    /// Free-form description.
    pub description: String,
    pub created: DateTime<Utc>,
    pub created_by: String,
    pub updated: DateTime<Utc>,
    pub updated_by: String,
    /// Action names registered on this resource (informational; policies may
    /// reference actions outside this list).
    pub actions: Vec<String>,
}

/// An auth token. Lives in the token store with a TTL equal to
/// `expires - created`, so the substrate evicts it on schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Opaque identifier: hex encoding of 20 random bytes.
    pub id: String,
    /// Name of the user the token authenticates.
    pub user: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

/// A pending TOTP enrollment. The secret and QR image are held only until
/// the user proves they can generate a valid code; the record disappears on
/// success, expiry, or re-enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpEnrollment {
    /// Name of the enrolling user.
    pub user: String,
    /// Base32 TOTP secret.
    pub secret: String,
    /// QR code PNG, base64-encoded.
    pub image: String,
    /// otpauth:// URL the QR encodes.
    pub url: String,
}

/// A request to be evaluated: is some principal allowed to perform `action`
/// on `resource`?
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub resource: String,
    pub action: String,
}

/// Per-kind record counts for the system overview.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemOverview {
    pub user_count: usize,
    pub group_count: usize,
    pub role_count: usize,
    pub policy_count: usize,
    pub resource_count: usize,
}

/// Entity names matching a search expression, per kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub users: Vec<String>,
    pub groups: Vec<String>,
    pub roles: Vec<String>,
    pub policies: Vec<String>,
    pub resources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_roundtrip() {
        let user = User {
            name: "mal".to_string(),
            description: "Captain".to_string(),
            enabled: true,
            secret_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            totp_enabled: false,
            totp_secret: String::new(),
            created: Utc::now(),
            created_by: "System".to_string(),
            updated: Utc::now(),
            updated_by: "System".to_string(),
            deleted: None,
            deleted_by: None,
            groups: vec!["Browncoats".to_string()],
            policies: vec![],
            roles: vec![],
        };

        let json = serde_json::to_string(&user).unwrap();
        let decoded: User = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.name, user.name);
        assert_eq!(decoded.groups, user.groups);
        assert_eq!(decoded.deleted, None);
        // The stored form carries the hash; deleted stays null until tombstoned
        assert!(json.contains("secret_hash"));
        assert!(json.contains("\"deleted\":null"));
    }

    #[test]
    fn test_user_response_filters_secrets() {
        let user = User {
            name: "mal".to_string(),
            description: String::new(),
            enabled: true,
            secret_hash: "hash-material".to_string(),
            totp_enabled: true,
            totp_secret: "JBSWY3DPEHPK3PXP".to_string(),
            created: Utc::now(),
            created_by: "admin".to_string(),
            updated: Utc::now(),
            updated_by: "admin".to_string(),
            deleted: None,
            deleted_by: None,
            groups: vec![],
            policies: vec![],
            roles: vec![],
        };

        let response = UserResponse::from(&user);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("hash-material"));
        assert!(!json.contains("JBSWY3DPEHPK3PXP"));
        assert!(json.contains("totp_enabled"));
    }

    #[test]
    fn test_policy_effect_constants() {
        assert_eq!(Policy::ALLOW, "allow");
        assert_eq!(Policy::DENY, "deny");
    }

    #[test]
    fn test_token_serialization() {
        let token = Token {
            id: "aabbccdd".to_string(),
            user: "mal".to_string(),
            created: Utc::now(),
            expires: Utc::now(),
        };
        let json = serde_json::to_string(&token).unwrap();
        let decoded: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.id, token.id);
        assert_eq!(decoded.user, "mal");
    }
}
