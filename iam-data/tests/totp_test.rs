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

mod common;

use std::time::Duration;

use iam_data::{IamError, TOTP_ISSUER};
use totp_rs::{Algorithm, Secret, TOTP};

/// Computes the code an authenticator app would show for the enrollment's
/// secret right now.
fn current_code(secret_b32: &str, account: &str) -> String {
    let secret_bytes = Secret::Encoded(secret_b32.to_string()).to_bytes().unwrap();
    let totp = TOTP::new(
        Algorithm::SHA1,
        6,
        1,
        30,
        secret_bytes,
        Some(TOTP_ISSUER.to_string()),
        account.to_string(),
    )
    .unwrap();
    totp.generate_current().unwrap()
}

#[test]
fn test_totp_enrollment_roundtrip() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "shiny").unwrap();

    let enrollment = manager
        .begin_totp_enrollment("mal", Duration::from_secs(3600))
        .unwrap();
    assert_eq!(enrollment.user, "mal");
    assert!(!enrollment.secret.is_empty());
    assert!(enrollment.url.starts_with("otpauth://totp/"));
    assert!(enrollment.url.contains(TOTP_ISSUER));

    // Entering the code the authenticator shows completes the handshake
    let code = current_code(&enrollment.secret, "mal");
    let user = manager.finish_totp_enrollment("mal", &code).unwrap();
    assert!(user.totp_enabled);
    assert_eq!(user.totp_secret, enrollment.secret);

    let stored = manager.get_user(&admin, "mal").unwrap();
    assert!(stored.totp_enabled);

    // The enrollment record was consumed
    assert!(matches!(
        manager.get_totp_enrollment("mal"),
        Err(IamError::EnrollmentNotFound { .. })
    ));
}

#[test]
fn test_second_enrollment_fails_once_enabled() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "shiny").unwrap();

    let enrollment = manager
        .begin_totp_enrollment("mal", Duration::from_secs(3600))
        .unwrap();
    let code = current_code(&enrollment.secret, "mal");
    manager.finish_totp_enrollment("mal", &code).unwrap();

    assert!(matches!(
        manager.begin_totp_enrollment("mal", Duration::from_secs(3600)),
        Err(IamError::TotpAlreadyEnabled { .. })
    ));
}

#[test]
fn test_wrong_code_does_not_finish_enrollment() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "shiny").unwrap();

    manager.begin_totp_enrollment("mal", Duration::from_secs(3600)).unwrap();
    assert!(matches!(
        manager.finish_totp_enrollment("mal", "000000"),
        Err(IamError::InvalidTotpCode)
    ));

    let user = manager.get_user(&admin, "mal").unwrap();
    assert!(!user.totp_enabled);

    // The enrollment survives a failed attempt
    assert!(manager.get_totp_enrollment("mal").is_ok());
}

#[test]
fn test_finish_without_begin_fails() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "shiny").unwrap();

    assert!(matches!(
        manager.finish_totp_enrollment("mal", "123456"),
        Err(IamError::EnrollmentNotFound { .. })
    ));
}

#[test]
fn test_begin_for_unknown_user_fails() {
    let (_dir, manager, _admin, _password) = common::bootstrapped();
    assert!(matches!(
        manager.begin_totp_enrollment("nobody", Duration::from_secs(3600)),
        Err(IamError::NotFound { .. })
    ));
}

#[test]
fn test_enrollment_expires() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "shiny").unwrap();

    let enrollment = manager
        .begin_totp_enrollment("mal", Duration::from_millis(50))
        .unwrap();
    std::thread::sleep(Duration::from_millis(100));

    assert!(matches!(
        manager.get_totp_enrollment("mal"),
        Err(IamError::EnrollmentNotFound { .. })
    ));
    let code = current_code(&enrollment.secret, "mal");
    assert!(matches!(
        manager.finish_totp_enrollment("mal", &code),
        Err(IamError::EnrollmentNotFound { .. })
    ));
}

#[test]
fn test_enrollment_image_is_a_png() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "shiny").unwrap();

    let enrollment = manager
        .begin_totp_enrollment("mal", Duration::from_secs(3600))
        .unwrap();
    assert!(!enrollment.image.is_empty());

    let png = enrollment.image().unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_reenrollment_replaces_the_pending_record() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "shiny").unwrap();

    let first = manager.begin_totp_enrollment("mal", Duration::from_secs(3600)).unwrap();
    let second = manager.begin_totp_enrollment("mal", Duration::from_secs(3600)).unwrap();
    assert_ne!(first.secret, second.secret);

    // Only the latest secret finishes
    assert!(matches!(
        manager.finish_totp_enrollment("mal", &current_code(&first.secret, "mal")),
        Err(IamError::InvalidTotpCode)
    ));
    manager
        .finish_totp_enrollment("mal", &current_code(&second.secret, "mal"))
        .unwrap();
}
