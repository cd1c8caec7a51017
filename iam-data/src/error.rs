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

//! IAM error types.

use iam_core::{EntityKind, StorageError};
use thiserror::Error;

/// Errors surfaced by the IAM domain core.
#[derive(Error, Debug)]
pub enum IamError {
    /// An entity lookup missed.
    #[error("{kind} '{name}' was not found")]
    NotFound {
        /// Kind of the missing entity.
        kind: EntityKind,
        /// Name that was looked up.
        name: String,
    },

    /// Name collision on create.
    #[error("{kind} '{name}' already exists")]
    AlreadyExists {
        /// Kind of the colliding entity.
        kind: EntityKind,
        /// Name that collided.
        name: String,
    },

    /// Entity name is empty or contains the key delimiter.
    #[error("'{name}' is not a valid entity name")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// Policy failed validation on creation.
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// The self-authorizer denied the operation (implicitly or explicitly).
    #[error("User '{user}' is not authorized to perform '{action}'")]
    Unauthorized {
        /// The context user the operation ran as.
        user: String,
        /// The administrative verb that was denied.
        action: String,
    },

    /// Uniform error for every failure mode in the credential path.
    #[error("The user was not found or the password was incorrect")]
    InvalidCredentials,

    /// No live token exists under the presented id.
    #[error("Token is not known")]
    TokenUnknown,

    /// The token record exists but its expiry has passed.
    #[error("Token has expired")]
    TokenExpired,

    /// No policy in the effective set matched the request.
    #[error("Request was denied by default")]
    RequestDenied,

    /// A deny-effect policy matched the request.
    #[error("Request was forcefully denied")]
    RequestForcefullyDenied,

    /// A policy pattern failed to compile.
    #[error("Pattern error: {0}")]
    Matcher(String),

    /// A search expression failed to compile.
    #[error("Problem with search expression: {0}")]
    InvalidSearch(String),

    /// TOTP key generation, parsing, or rendering failed.
    #[error("TOTP error: {0}")]
    Totp(String),

    /// No pending TOTP enrollment for the user.
    #[error("No TOTP enrollment found for user '{user}'")]
    EnrollmentNotFound {
        /// User whose enrollment was looked up.
        user: String,
    },

    /// The user already finished a TOTP enrollment.
    #[error("User '{user}' already has TOTP enabled")]
    TotpAlreadyEnabled {
        /// User with TOTP already on.
        user: String,
    },

    /// The submitted one-time code did not validate.
    #[error("Not a valid OTP code")]
    InvalidTotpCode,

    /// A bootstrap step failed; the datastore keeps whatever committed.
    #[error("Bootstrap failed while {step}: {source}")]
    Bootstrap {
        /// Which step of the bootstrap sequence failed.
        step: &'static str,
        /// The underlying failure.
        source: Box<IamError>,
    },

    /// One or both datastores failed to close.
    #[error("An error occurred closing the manager: {0}")]
    CloseFailed(String),

    /// Password hashing failed.
    #[error("Problem hashing password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// Underlying storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON serialization/deserialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
