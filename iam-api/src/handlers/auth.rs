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

//! Credential exchange and authorization queries.

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::{Extension, Json};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde::Serialize;

use iam_data::{Decision, Request, User};

use crate::error::ApiError;
use crate::handlers::blocking;
use crate::middleware::auth::basic_credentials;
use crate::server::AppState;

/// Response for a bearer token exchange.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub expires_in: String,
    pub access_token: String,
}

/// Response for an authorization query.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub authorized: bool,
}

/// `GET /auth/token` — exchanges HTTP basic credentials for a bearer token.
pub async fn get_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let Some((name, password)) = basic_credentials(header) else {
        return Err(ApiError::unauthorized("HTTP basic auth credentials not supplied"));
    };

    let manager = state.manager.clone();
    let ttl = state.token_ttl;
    let token = blocking(move || {
        let user = manager.get_user_with_credentials(&name, &password)?;
        manager.new_token(&user, ttl)
    })
    .await?;

    let expires_in = (token.expires - Utc::now()).num_seconds().max(0);
    Ok(Json(TokenResponse {
        token_type: "Bearer".to_string(),
        expires_in: expires_in.to_string(),
        access_token: BASE64.encode(&token.id),
    }))
}

/// `POST /auth/authorize` — evaluates `{resource, action}` for the caller.
pub async fn authorize(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<Request>,
) -> Result<Json<AuthResponse>, ApiError> {
    let manager = state.manager.clone();
    let decision = blocking(move || manager.authorize_request(&user, &request)).await?;

    Ok(Json(AuthResponse {
        authorized: decision == Decision::Allowed,
    }))
}
