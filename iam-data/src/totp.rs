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

//! Time-based one-time-password enrollment and verification.
//!
//! Enrollment is a two-step handshake: `begin` generates a key and a QR
//! image and stores them with a TTL; `finish` accepts the first code the
//! user's authenticator produces, and only then does the secret move onto
//! the user record. An enrollment the user never finishes simply expires.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use totp_rs::{Algorithm, Secret, TOTP};

use iam_core::EntityKind;

use crate::error::IamError;
use crate::manager::{get_record, put_record, put_record_with_ttl, require_record, Manager};
use crate::models::{TotpEnrollment, User};

/// Issuer name baked into generated otpauth URLs.
pub const TOTP_ISSUER: &str = "IAMServer";

/// How long a pending enrollment stays valid by default.
pub const DEFAULT_ENROLLMENT_TTL: Duration = Duration::from_secs(60 * 60);

/// RFC-6238 parameters: SHA1, 6 digits, 30-second step, ±1 step tolerance.
fn build_totp(secret_bytes: Vec<u8>, account: &str) -> Result<TOTP, IamError> {
    TOTP::new(
        Algorithm::SHA1,
        6,
        1,
        30,
        secret_bytes,
        Some(TOTP_ISSUER.to_string()),
        account.to_string(),
    )
    .map_err(|e| IamError::Totp(e.to_string()))
}

impl Manager {
    /// Begins TOTP enrollment for a user.
    ///
    /// Fails if the user does not exist or already finished an enrollment.
    /// The generated secret, otpauth URL, and QR PNG are stored under
    /// `TotpEnrollment:<user>` with the given TTL; re-enrolling before the
    /// TTL fires simply replaces the record.
    pub fn begin_totp_enrollment(
        &self,
        user_name: &str,
        expires_after: Duration,
    ) -> Result<TotpEnrollment, IamError> {
        let txn = self.systemdb.write()?;
        let user: User = require_record(&txn, EntityKind::User, user_name)?;

        if user.totp_enabled {
            return Err(IamError::TotpAlreadyEnabled {
                user: user_name.to_string(),
            });
        }

        let secret = Secret::generate_secret();
        let secret_bytes = secret.to_bytes().map_err(|e| IamError::Totp(e.to_string()))?;
        let Secret::Encoded(secret_b32) = secret.to_encoded() else {
            return Err(IamError::Totp("secret encoding failed".to_string()));
        };

        let totp = build_totp(secret_bytes, user_name)?;
        let enrollment = TotpEnrollment {
            user: user_name.to_string(),
            secret: secret_b32,
            image: totp.get_qr_base64().map_err(IamError::Totp)?,
            url: totp.get_url(),
        };

        put_record_with_ttl(
            &txn,
            EntityKind::TotpEnrollment,
            user_name,
            &enrollment,
            expires_after,
        )?;
        txn.commit()?;

        Ok(enrollment)
    }

    /// Finishes TOTP enrollment by validating the first generated code.
    ///
    /// On success the user record gains the secret and `totp_enabled`, and
    /// the enrollment record is removed in the same transaction.
    pub fn finish_totp_enrollment(&self, user_name: &str, code: &str) -> Result<User, IamError> {
        let txn = self.systemdb.write()?;

        let enrollment: TotpEnrollment =
            get_record(&txn, EntityKind::TotpEnrollment, user_name)?.ok_or_else(|| {
                IamError::EnrollmentNotFound {
                    user: user_name.to_string(),
                }
            })?;
        let mut user: User = require_record(&txn, EntityKind::User, user_name)?;

        if user.totp_enabled {
            return Err(IamError::TotpAlreadyEnabled {
                user: user_name.to_string(),
            });
        }

        let secret_bytes = Secret::Encoded(enrollment.secret.clone())
            .to_bytes()
            .map_err(|e| IamError::Totp(e.to_string()))?;
        let totp = build_totp(secret_bytes, user_name)?;

        let valid = totp.check_current(code).map_err(|e| IamError::Totp(e.to_string()))?;
        if !valid {
            return Err(IamError::InvalidTotpCode);
        }

        user.totp_enabled = true;
        user.totp_secret = enrollment.secret;
        put_record(&txn, EntityKind::User, user_name, &user)?;
        txn.remove(&EntityKind::TotpEnrollment.key(user_name))?;
        txn.commit()?;

        Ok(user)
    }

    /// Gets the pending TOTP enrollment for a user.
    pub fn get_totp_enrollment(&self, user_name: &str) -> Result<TotpEnrollment, IamError> {
        let txn = self.systemdb.read()?;
        get_record(&txn, EntityKind::TotpEnrollment, user_name)?.ok_or_else(|| {
            IamError::EnrollmentNotFound {
                user: user_name.to_string(),
            }
        })
    }
}

impl TotpEnrollment {
    /// Re-renders the QR code PNG from the stored otpauth URL.
    pub fn image(&self) -> Result<Vec<u8>, IamError> {
        let totp = TOTP::from_url(&self.url).map_err(|e| IamError::Totp(e.to_string()))?;
        let encoded = totp.get_qr_base64().map_err(IamError::Totp)?;
        BASE64
            .decode(encoded)
            .map_err(|e| IamError::Totp(e.to_string()))
    }
}
