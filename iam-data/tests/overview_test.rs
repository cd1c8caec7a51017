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

use iam_data::{Context, IamError};

#[test]
fn test_overview_counts_after_bootstrap() {
    let (_dir, manager, admin, _password) = common::bootstrapped();

    let overview = manager.get_overview(&admin).unwrap();
    assert_eq!(overview.user_count, 1); // admin
    assert_eq!(overview.group_count, 1); // Administrators
    assert_eq!(overview.role_count, 1); // sys_admin
    assert_eq!(overview.policy_count, 1); // Administer everything
    assert_eq!(overview.resource_count, 1); // System

    manager.add_user(&admin, "mal", "", "pw").unwrap();
    manager.add_user(&admin, "zoe", "", "pw").unwrap();
    manager.add_group(&admin, "crew", "").unwrap();

    let overview = manager.get_overview(&admin).unwrap();
    assert_eq!(overview.user_count, 3);
    assert_eq!(overview.group_count, 2);
}

#[test]
fn test_overview_omits_unauthorized_kinds() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "jayne", "", "pw").unwrap();

    let jayne = Context::user("jayne");
    let overview = manager.get_overview(&jayne).unwrap();
    assert_eq!(overview.user_count, 0);
    assert_eq!(overview.group_count, 0);
    assert_eq!(overview.role_count, 0);
    assert_eq!(overview.policy_count, 0);
    assert_eq!(overview.resource_count, 0);
}

#[test]
fn test_search_is_case_insensitive_on_names() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "Mal", "", "pw").unwrap();

    let results = manager.search(&admin, "mal").unwrap();
    assert_eq!(results.users, vec!["Mal".to_string()]);

    // `admin` matches the user and the Administrators group and the
    // Administer everything policy, but matches names only — not key
    // prefixes like `User:`
    let results = manager.search(&admin, "admin").unwrap();
    assert!(results.users.contains(&"admin".to_string()));
    assert!(!results.users.contains(&"Mal".to_string()));
    assert!(results.groups.contains(&"Administrators".to_string()));
    assert!(results.policies.contains(&"Administer everything".to_string()));
}

#[test]
fn test_search_prefix_does_not_leak_kinds() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "mal", "", "pw").unwrap();

    // Searching for the kind namespace must not match every record
    let results = manager.search(&admin, "^user$").unwrap();
    assert!(results.users.is_empty());
}

#[test]
fn test_search_rejects_invalid_expressions() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    assert!(matches!(
        manager.search(&admin, "[unclosed"),
        Err(IamError::InvalidSearch(_))
    ));
}

#[test]
fn test_search_omits_unauthorized_kinds() {
    let (_dir, manager, admin, _password) = common::bootstrapped();
    manager.add_user(&admin, "jayne", "", "pw").unwrap();

    let jayne = Context::user("jayne");
    let results = manager.search(&jayne, "admin").unwrap();
    assert!(results.users.is_empty());
    assert!(results.groups.is_empty());
    assert!(results.policies.is_empty());
}
