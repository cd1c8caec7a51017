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

//! IAM domain core.
//!
//! The [`Manager`] owns the two datastores (entities and tokens) and exposes
//! every operation of the system: entity CRUD with bidirectional edge
//! maintenance, policy resolution and evaluation, credential issuance
//! (passwords, bearer tokens, TOTP), the one-shot bootstrap, and the
//! overview/search queries. Every administrative operation authorizes itself
//! against the caller's effective policy set before touching data.

pub mod authz;
pub mod bootstrap;
pub mod error;
pub mod groups;
pub mod manager;
pub mod matcher;
pub mod models;
pub mod overview;
pub mod policies;
pub mod resources;
pub mod roles;
pub mod tokens;
pub mod totp;
pub mod users;

pub use authz::{evaluate, policies_allow, Decision, SystemAction, SYSTEM_RESOURCE};
pub use bootstrap::{ADMIN_GROUP, ADMIN_POLICY, ADMIN_USER, SYS_ADMIN_ROLE};
pub use error::IamError;
pub use manager::{Context, Manager, SYSTEM_USER};
pub use matcher::{RegexpMatcher, DEFAULT_PATTERN_CACHE};
pub use models::{
    Group, Policy, Request, Resource, Role, SearchResults, SystemOverview, Token, TotpEnrollment,
    User, UserResponse,
};
pub use totp::{DEFAULT_ENROLLMENT_TTL, TOTP_ISSUER};
pub use users::TOMBSTONE_TTL;
