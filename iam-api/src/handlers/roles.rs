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

//! Role administration handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use iam_data::{Context, Role, User};

use crate::error::ApiError;
use crate::handlers::{blocking, split_csv};
use crate::server::AppState;

/// Request to create a new role.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// `POST /system/roles`
pub async fn add_role(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(request): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<Role>), ApiError> {
    let manager = state.manager.clone();
    let role = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.add_role(&ctx, &request.name, &request.description)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(role)))
}

/// `GET /system/roles`
pub async fn get_all_roles(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> Result<Json<Vec<Role>>, ApiError> {
    let manager = state.manager.clone();
    let roles = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.get_all_roles(&ctx)
    })
    .await?;

    Ok(Json(roles))
}

/// `GET /system/role/:name`
pub async fn get_role(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(name): Path<String>,
) -> Result<Json<Role>, ApiError> {
    let manager = state.manager.clone();
    let role = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.get_role(&ctx, &name)
    })
    .await?;

    Ok(Json(role))
}

/// `PUT /system/role/:name/policies/:csv`
pub async fn attach_policies_to_role(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path((name, csv)): Path<(String, String)>,
) -> Result<Json<Role>, ApiError> {
    let manager = state.manager.clone();
    let role = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.attach_policies_to_role(&ctx, &name, &split_csv(&csv))
    })
    .await?;

    Ok(Json(role))
}

/// `PUT /system/role/:name/users/:csv`
pub async fn attach_role_to_users(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path((name, csv)): Path<(String, String)>,
) -> Result<Json<Role>, ApiError> {
    let manager = state.manager.clone();
    let role = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.attach_role_to_users(&ctx, &name, &split_csv(&csv))
    })
    .await?;

    Ok(Json(role))
}

/// `PUT /system/role/:name/groups/:csv`
pub async fn attach_role_to_groups(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path((name, csv)): Path<(String, String)>,
) -> Result<Json<Role>, ApiError> {
    let manager = state.manager.clone();
    let role = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.attach_role_to_groups(&ctx, &name, &split_csv(&csv))
    })
    .await?;

    Ok(Json(role))
}
