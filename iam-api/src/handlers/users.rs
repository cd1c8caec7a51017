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

//! User administration handlers.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use iam_data::{Context, Policy, User, UserResponse};

use crate::error::ApiError;
use crate::handlers::blocking;
use crate::server::AppState;

/// Request to create a new user; the only create that carries a password.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub password: String,
}

/// `POST /system/users`
pub async fn add_user(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let manager = state.manager.clone();
    let user = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.add_user(&ctx, &request.name, &request.description, &request.password)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// `GET /system/users`
pub async fn get_all_users(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let manager = state.manager.clone();
    let users = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.get_all_users(&ctx)
    })
    .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// `GET /system/user/:name`
pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(name): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let manager = state.manager.clone();
    let user = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.get_user(&ctx, &name)
    })
    .await?;

    Ok(Json(UserResponse::from(user)))
}

/// `GET /system/user/:name/policies` — the user's effective policy set.
pub async fn get_user_policies(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(name): Path<String>,
) -> Result<Json<BTreeMap<String, Policy>>, ApiError> {
    let manager = state.manager.clone();
    let policies = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.get_policies_for_user(&ctx, &name)
    })
    .await?;

    Ok(Json(policies))
}
