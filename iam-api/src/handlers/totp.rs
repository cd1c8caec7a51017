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

//! Two-factor (TOTP) enrollment handlers. All operate on the caller's own
//! account, identified by their bearer token.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use iam_data::{User, DEFAULT_ENROLLMENT_TTL};

use crate::error::ApiError;
use crate::handlers::blocking;
use crate::server::AppState;

/// Request to complete a TOTP enrollment: a passcode from the
/// authenticator app proves the key was set up.
#[derive(Debug, Deserialize)]
pub struct FinishEnrollmentRequest {
    pub passcode: String,
}

/// `POST /2fa` — begins TOTP enrollment for the caller.
pub async fn begin_enrollment(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let manager = state.manager.clone();
    blocking(move || manager.begin_totp_enrollment(&caller.name, DEFAULT_ENROLLMENT_TTL)).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": 202, "message": "Enrollment started" })),
    ))
}

/// `GET /2fa` — the QR code PNG for the caller's pending enrollment.
pub async fn enrollment_image(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let manager = state.manager.clone();
    let png = blocking(move || manager.get_totp_enrollment(&caller.name)?.image()).await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// `PUT /2fa` — finishes the caller's TOTP enrollment.
pub async fn finish_enrollment(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(request): Json<FinishEnrollmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let manager = state.manager.clone();
    blocking(move || manager.finish_totp_enrollment(&caller.name, &request.passcode)).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": 202, "message": "Enrollment completed" })),
    ))
}
