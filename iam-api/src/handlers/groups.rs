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

//! Group administration handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use iam_data::{Context, Group, User};

use crate::error::ApiError;
use crate::handlers::{blocking, split_csv};
use crate::server::AppState;

/// Request to create a new group.
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// `POST /system/groups`
pub async fn add_group(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let manager = state.manager.clone();
    let group = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.add_group(&ctx, &request.name, &request.description)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// `GET /system/groups`
pub async fn get_all_groups(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let manager = state.manager.clone();
    let groups = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.get_all_groups(&ctx)
    })
    .await?;

    Ok(Json(groups))
}

/// `GET /system/group/:name`
pub async fn get_group(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(name): Path<String>,
) -> Result<Json<Group>, ApiError> {
    let manager = state.manager.clone();
    let group = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.get_group(&ctx, &name)
    })
    .await?;

    Ok(Json(group))
}

/// `PUT /system/group/:name/users/:csv`
pub async fn add_users_to_group(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path((name, csv)): Path<(String, String)>,
) -> Result<Json<Group>, ApiError> {
    let manager = state.manager.clone();
    let group = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.add_users_to_group(&ctx, &name, &split_csv(&csv))
    })
    .await?;

    Ok(Json(group))
}
