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

//! Shared helpers for the integration tests.

#![allow(dead_code)]

use iam_data::{Context, Manager, Request};
use tempfile::TempDir;

/// Opens a manager over throwaway datastores. The TempDir must outlive the
/// manager, so it is handed back to the caller.
pub fn open_manager() -> (TempDir, Manager) {
    let dir = TempDir::new().unwrap();
    let manager = Manager::open(&dir.path().join("system.redb"), &dir.path().join("tokens.redb"))
        .unwrap();
    (dir, manager)
}

/// Opens and bootstraps a system, returning the admin context and the
/// generated admin password.
pub fn bootstrapped() -> (TempDir, Manager, Context, String) {
    let (dir, manager) = open_manager();
    let (admin, password) = manager.bootstrap().unwrap();
    (dir, manager, Context::user(admin.name), password)
}

pub fn request(resource: &str, action: &str) -> Request {
    Request {
        resource: resource.to_string(),
        action: action.to_string(),
    }
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
