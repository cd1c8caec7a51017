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

//! Resource administration handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use iam_data::{Context, Resource, User};

use crate::error::ApiError;
use crate::handlers::{blocking, split_csv};
use crate::server::AppState;

/// Request to create a new resource.
#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// `POST /system/resources`
pub async fn add_resource(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(request): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<Resource>), ApiError> {
    let manager = state.manager.clone();
    let resource = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.add_resource(&ctx, &request.name, &request.description)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(resource)))
}

/// `GET /system/resources`
pub async fn get_all_resources(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    let manager = state.manager.clone();
    let resources = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.get_all_resources(&ctx)
    })
    .await?;

    Ok(Json(resources))
}

/// `GET /system/resource/:name`
pub async fn get_resource(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(name): Path<String>,
) -> Result<Json<Resource>, ApiError> {
    let manager = state.manager.clone();
    let resource = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.get_resource(&ctx, &name)
    })
    .await?;

    Ok(Json(resource))
}

/// `PUT /system/resource/:name/actions/:csv`
pub async fn add_actions_to_resource(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path((name, csv)): Path<(String, String)>,
) -> Result<Json<Resource>, ApiError> {
    let manager = state.manager.clone();
    let resource = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.add_actions_to_resource(&ctx, &name, &split_csv(&csv))
    })
    .await?;

    Ok(Json(resource))
}
