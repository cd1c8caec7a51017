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

//! Overview and search handlers.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use iam_data::{Context, SearchResults, SystemOverview, User};

use crate::error::ApiError;
use crate::handlers::blocking;
use crate::server::AppState;

/// Request to search entity names.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub expression: String,
}

/// System overview: per-kind counts plus server uptime.
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    #[serde(flatten)]
    pub counts: SystemOverview,
    pub uptime_seconds: u64,
}

/// `GET /system/overview`
pub async fn overview(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> Result<Json<OverviewResponse>, ApiError> {
    let manager = state.manager.clone();
    let counts = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.get_overview(&ctx)
    })
    .await?;

    Ok(Json(OverviewResponse {
        counts,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    }))
}

/// `POST /system/search`
pub async fn search(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResults>, ApiError> {
    let manager = state.manager.clone();
    let results = blocking(move || {
        let ctx = Context::user(caller.name);
        manager.search(&ctx, &request.expression)
    })
    .await?;

    Ok(Json(results))
}
