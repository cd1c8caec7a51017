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

use iam_data::IamError;

#[test]
fn test_token_roundtrip() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "shiny").unwrap();

    let mal = manager.get_user(&admin, "mal").unwrap();
    let token = manager.new_token(&mal, Duration::from_secs(60)).unwrap();
    assert_eq!(token.user, "mal");
    assert_eq!(token.id.len(), 40);
    assert!(token.expires > token.created);

    let resolved = manager.user_for_token(&token.id).unwrap();
    assert_eq!(resolved.name, "mal");
}

#[test]
fn test_token_usable_before_expiry_and_dead_after() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "shiny").unwrap();
    let mal = manager.get_user(&admin, "mal").unwrap();

    let token = manager.new_token(&mal, Duration::from_secs(2)).unwrap();

    // Strictly before expiry the token resolves
    assert!(manager.user_for_token(&token.id).is_ok());

    std::thread::sleep(Duration::from_secs(3));
    let err = manager.user_for_token(&token.id).unwrap_err();
    assert!(matches!(err, IamError::TokenUnknown | IamError::TokenExpired));
}

#[test]
fn test_unknown_token_is_rejected() {
    let (_dir, manager, _admin, _password) = common::bootstrapped();
    assert!(matches!(
        manager.user_for_token("no-such-token"),
        Err(IamError::TokenUnknown)
    ));
}

#[test]
fn test_token_for_missing_user_is_rejected() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "shiny").unwrap();
    let mut mal = manager.get_user(&admin, "mal").unwrap();

    mal.name = "ghost".to_string();
    assert!(matches!(
        manager.new_token(&mal, Duration::from_secs(60)),
        Err(IamError::NotFound { .. })
    ));
}

#[test]
fn test_token_of_deleted_user_no_longer_authenticates() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "saffron", "", "pw").unwrap();
    let saffron = manager.get_user(&admin, "saffron").unwrap();

    let token = manager.new_token(&saffron, Duration::from_secs(60)).unwrap();
    assert!(manager.user_for_token(&token.id).is_ok());

    // The token outlives the user, but must stop working immediately
    manager.delete_user(&admin, "saffron").unwrap();
    assert!(matches!(
        manager.user_for_token(&token.id),
        Err(IamError::TokenUnknown)
    ));
}

#[test]
fn test_tokens_are_unique() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "pw").unwrap();
    let mal = manager.get_user(&admin, "mal").unwrap();

    let a = manager.new_token(&mal, Duration::from_secs(60)).unwrap();
    let b = manager.new_token(&mal, Duration::from_secs(60)).unwrap();
    assert_ne!(a.id, b.id);
}
