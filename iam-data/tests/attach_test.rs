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

use common::names;
use iam_data::IamError;

#[test]
fn test_attach_policy_to_user_is_bidirectional_and_idempotent() {
    let (_dir, manager, admin, _password) = common::bootstrapped();

    manager.add_user(&admin, "mal", "Captain", "shiny").unwrap();
    manager.add_resource(&admin, "Serenity", "").unwrap();
    manager
        .add_policy(&admin, "cap", "allow", names(&["Serenity"]), names(&["Command"]))
        .unwrap();

    manager.attach_policy_to_users(&admin, "cap", &names(&["mal"])).unwrap();

    let mal = manager.get_user(&admin, "mal").unwrap();
    let cap = manager.get_policy(&admin, "cap").unwrap();
    assert_eq!(mal.policies, vec!["cap".to_string()]);
    assert_eq!(cap.users, vec!["mal".to_string()]);

    // Attaching again must not grow either list
    manager.attach_policy_to_users(&admin, "cap", &names(&["mal"])).unwrap();
    let mal = manager.get_user(&admin, "mal").unwrap();
    let cap = manager.get_policy(&admin, "cap").unwrap();
    assert_eq!(mal.policies, vec!["cap".to_string()]);
    assert_eq!(cap.users, vec!["mal".to_string()]);
}

#[test]
fn test_back_references_stay_sorted_and_deduplicated() {
    let (_dir, manager, admin, _password) = common::bootstrapped();

    manager.add_group(&admin, "crew", "").unwrap();
    for name in ["zoe", "mal", "kaylee"] {
        manager.add_user(&admin, name, "", "pw").unwrap();
    }

    // Passed out of order, with a duplicate
    manager
        .add_users_to_group(&admin, "crew", &names(&["zoe", "mal", "zoe", "kaylee"]))
        .unwrap();

    let crew = manager.get_group(&admin, "crew").unwrap();
    assert_eq!(crew.users, names(&["kaylee", "mal", "zoe"]));

    for name in ["zoe", "mal", "kaylee"] {
        let user = manager.get_user(&admin, name).unwrap();
        assert_eq!(user.groups, vec!["crew".to_string()]);
    }
}

#[test]
fn test_attach_fails_whole_when_any_target_is_missing() {
    let (_dir, manager, admin, _password) = common::bootstrapped();

    manager.add_group(&admin, "crew", "").unwrap();
    manager.add_user(&admin, "mal", "", "pw").unwrap();

    let err = manager
        .add_users_to_group(&admin, "crew", &names(&["mal", "nobody"]))
        .unwrap_err();
    assert!(matches!(err, IamError::NotFound { .. }));

    // No partial state: mal was validated first but must not be attached
    let crew = manager.get_group(&admin, "crew").unwrap();
    assert!(crew.users.is_empty());
    let mal = manager.get_user(&admin, "mal").unwrap();
    assert!(mal.groups.is_empty());
}

#[test]
fn test_attach_fails_when_subject_is_missing() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "pw").unwrap();

    assert!(matches!(
        manager.add_users_to_group(&admin, "no-such-group", &names(&["mal"])),
        Err(IamError::NotFound { .. })
    ));
}

#[test]
fn test_role_attachments_are_reciprocal() {
    let (_dir, manager, admin, _password) = common::bootstrapped();

    manager.add_role(&admin, "pilot", "").unwrap();
    manager.add_user(&admin, "wash", "", "pw").unwrap();
    manager.add_group(&admin, "bridge", "").unwrap();
    manager.add_resource(&admin, "Serenity", "").unwrap();
    manager
        .add_policy(&admin, "FlyShip", "allow", names(&["Serenity"]), names(&["Fly"]))
        .unwrap();

    manager.attach_role_to_users(&admin, "pilot", &names(&["wash"])).unwrap();
    manager.attach_role_to_groups(&admin, "pilot", &names(&["bridge"])).unwrap();
    manager.attach_policies_to_role(&admin, "pilot", &names(&["FlyShip"])).unwrap();

    let role = manager.get_role(&admin, "pilot").unwrap();
    assert_eq!(role.users, vec!["wash".to_string()]);
    assert_eq!(role.groups, vec!["bridge".to_string()]);
    assert_eq!(role.policies, vec!["FlyShip".to_string()]);

    assert_eq!(manager.get_user(&admin, "wash").unwrap().roles, vec!["pilot".to_string()]);
    assert_eq!(manager.get_group(&admin, "bridge").unwrap().roles, vec!["pilot".to_string()]);
    assert_eq!(manager.get_policy(&admin, "FlyShip").unwrap().roles, vec!["pilot".to_string()]);
}

#[test]
fn test_policy_group_attachment_is_reciprocal() {
    let (_dir, manager, admin, _password) = common::bootstrapped();

    manager.add_group(&admin, "crew", "").unwrap();
    manager
        .add_policy(&admin, "OpenDoors", "allow", names(&["<.*>"]), names(&["Open"]))
        .unwrap();

    manager.attach_policy_to_groups(&admin, "OpenDoors", &names(&["crew"])).unwrap();

    assert_eq!(
        manager.get_policy(&admin, "OpenDoors").unwrap().groups,
        vec!["crew".to_string()]
    );
    assert_eq!(
        manager.get_group(&admin, "crew").unwrap().policies,
        vec!["OpenDoors".to_string()]
    );
}

#[test]
fn test_duplicate_names_are_rejected_per_kind() {
    let (_dir, manager, admin, _password) = common::bootstrapped();

    manager.add_group(&admin, "crew", "").unwrap();
    assert!(matches!(
        manager.add_group(&admin, "crew", "second"),
        Err(IamError::AlreadyExists { .. })
    ));

    // The same name in another kind is fine
    manager.add_role(&admin, "crew", "").unwrap();
}

#[test]
fn test_invalid_names_are_rejected() {
    let (_dir, manager, admin, _password) = common::bootstrapped();

    assert!(matches!(
        manager.add_user(&admin, "", "", "pw"),
        Err(IamError::InvalidName { .. })
    ));
    assert!(matches!(
        manager.add_group(&admin, "evil:key", ""),
        Err(IamError::InvalidName { .. })
    ));
}
