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

//! Policy administration handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use iam_data::{Context, Policy, User};

use crate::error::ApiError;
use crate::handlers::{blocking, split_csv};
use crate::server::AppState;

/// Request to create a new policy.
#[derive(Debug, Deserialize)]
pub struct CreatePolicyRequest {
    pub name: String,
    pub effect: String,
    pub resources: Vec<String>,
    pub actions: Vec<String>,
}

/// `POST /system/policies`
pub async fn add_policy(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(request): Json<CreatePolicyRequest>,
) -> Result<(StatusCode, Json<Policy>), ApiError> {
    let manager = state.manager.clone();
    let policy = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.add_policy(
            &ctx,
            &request.name,
            &request.effect,
            request.resources,
            request.actions,
        )
    })
    .await?;

    Ok((StatusCode::CREATED, Json(policy)))
}

/// `GET /system/policies`
pub async fn get_all_policies(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> Result<Json<Vec<Policy>>, ApiError> {
    let manager = state.manager.clone();
    let policies = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.get_all_policies(&ctx)
    })
    .await?;

    Ok(Json(policies))
}

/// `GET /system/policy/:name`
pub async fn get_policy(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(name): Path<String>,
) -> Result<Json<Policy>, ApiError> {
    let manager = state.manager.clone();
    let policy = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.get_policy(&ctx, &name)
    })
    .await?;

    Ok(Json(policy))
}

/// `PUT /system/policy/:name/users/:csv`
pub async fn attach_policy_to_users(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path((name, csv)): Path<(String, String)>,
) -> Result<Json<Policy>, ApiError> {
    let manager = state.manager.clone();
    let policy = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.attach_policy_to_users(&ctx, &name, &split_csv(&csv))
    })
    .await?;

    Ok(Json(policy))
}

/// `PUT /system/policy/:name/groups/:csv`
pub async fn attach_policy_to_groups(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path((name, csv)): Path<(String, String)>,
) -> Result<Json<Policy>, ApiError> {
    let manager = state.manager.clone();
    let policy = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.attach_policy_to_groups(&ctx, &name, &split_csv(&csv))
    })
    .await?;

    Ok(Json(policy))
}
