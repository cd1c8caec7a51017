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

use common::{names, request};
use iam_data::{Context, Decision, IamError, Manager};

/// Builds the Serenity fixture: mal belongs to Browncoats, which carries the
/// "Ship access" role, which bundles the RegularShip policy.
fn serenity_fixture(manager: &Manager, admin: &Context) {
    manager.add_user(admin, "mal", "Captain", "shiny").unwrap();
    manager.add_group(admin, "Browncoats", "Independents").unwrap();
    manager.add_role(admin, "Ship access", "Who may use the ship").unwrap();
    manager.add_resource(admin, "Serenity", "Firefly-class transport").unwrap();
    manager
        .add_policy(
            admin,
            "RegularShip",
            "allow",
            names(&["Serenity"]),
            names(&["Find", "Open", "Embark", "Disembark"]),
        )
        .unwrap();
    manager
        .attach_policies_to_role(admin, "Ship access", &names(&["RegularShip"]))
        .unwrap();
    manager
        .attach_role_to_groups(admin, "Ship access", &names(&["Browncoats"]))
        .unwrap();
    manager
        .add_users_to_group(admin, "Browncoats", &names(&["mal"]))
        .unwrap();
}

#[test]
fn test_allow_by_role_through_group() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    serenity_fixture(&manager, &admin);

    let mal = manager.get_user(&admin, "mal").unwrap();
    assert!(manager.is_user_request_authorized(&mal, &request("Serenity", "Embark")));
    assert!(!manager.is_user_request_authorized(&mal, &request("Serenity", "Fly")));
    assert!(!manager.is_user_request_authorized(&mal, &request("Alliance Cruiser", "Embark")));
}

#[test]
fn test_explicit_deny_overrides_allow() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    serenity_fixture(&manager, &admin);

    manager
        .add_policy(&admin, "DenyAll", "deny", names(&["Serenity"]), names(&["<.*>"]))
        .unwrap();
    manager
        .attach_policy_to_groups(&admin, "DenyAll", &names(&["Browncoats"]))
        .unwrap();

    let mal = manager.get_user(&admin, "mal").unwrap();
    assert!(!manager.is_user_request_authorized(&mal, &request("Serenity", "Embark")));
    assert_eq!(
        manager.authorize_request(&mal, &request("Serenity", "Embark")).unwrap(),
        Decision::ExplicitDeny
    );

    // An orthogonal allow on another resource is untouched by the deny
    manager.add_resource(&admin, "Healthcare", "Ship medical plan").unwrap();
    manager
        .add_policy(
            &admin,
            "Healthcare",
            "allow",
            names(&["Healthcare"]),
            names(&["PresentHMOcard"]),
        )
        .unwrap();
    manager
        .attach_policy_to_users(&admin, "Healthcare", &names(&["mal"]))
        .unwrap();

    let mal = manager.get_user(&admin, "mal").unwrap();
    assert!(manager.is_user_request_authorized(&mal, &request("Healthcare", "PresentHMOcard")));
}

#[test]
fn test_effective_policies_follow_every_chain() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    serenity_fixture(&manager, &admin);

    // Direct policy attachment joins the role-derived one
    manager.add_resource(&admin, "Shuttle", "Short-range shuttle").unwrap();
    manager
        .add_policy(&admin, "ShuttleUse", "allow", names(&["Shuttle"]), names(&["Fly"]))
        .unwrap();
    manager
        .attach_policy_to_users(&admin, "ShuttleUse", &names(&["mal"]))
        .unwrap();

    let effective = manager.get_policies_for_user(&admin, "mal").unwrap();
    assert!(effective.contains_key("RegularShip"));
    assert!(effective.contains_key("ShuttleUse"));

    // Deny policies are surfaced too; the decision engine filters
    manager
        .add_policy(&admin, "DenyAll", "deny", names(&["Serenity"]), names(&["<.*>"]))
        .unwrap();
    manager
        .attach_policy_to_users(&admin, "DenyAll", &names(&["mal"]))
        .unwrap();
    let effective = manager.get_policies_for_user(&admin, "mal").unwrap();
    assert!(effective.contains_key("DenyAll"));
}

#[test]
fn test_unprivileged_user_cannot_administer() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "jayne", "Public relations", "vera").unwrap();

    let jayne = Context::user("jayne");
    assert!(matches!(
        manager.add_user(&jayne, "stowaway", "", "pw"),
        Err(IamError::Unauthorized { .. })
    ));
    assert!(matches!(
        manager.get_user(&jayne, "admin"),
        Err(IamError::Unauthorized { .. })
    ));
    assert!(matches!(
        manager.get_policies_for_user(&jayne, "jayne"),
        Err(IamError::Unauthorized { .. })
    ));
}

#[test]
fn test_empty_groups_do_not_affect_resolution() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    serenity_fixture(&manager, &admin);

    // Membership in a group with no roles or policies changes nothing
    manager.add_group(&admin, "Ghosts", "").unwrap();
    manager.add_users_to_group(&admin, "Ghosts", &names(&["mal"])).unwrap();

    let mal = manager.get_user(&admin, "mal").unwrap();
    assert!(manager.is_user_request_authorized(&mal, &request("Serenity", "Embark")));
    assert!(!manager.is_user_request_authorized(&mal, &request("Serenity", "Fly")));
}
