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

//! Bearer-token authentication middleware.
//!
//! Over the wire a token is the base64 encoding of its id; the decoded id is
//! the key in the token store. A missing or malformed `Authorization` header
//! is 403; a token that does not resolve to a live, enabled user is 401. On
//! success the resolved [`User`] is inserted into the request extensions for
//! handlers to pick up.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::warn;

use crate::error::ApiError;
use crate::server::AppState;

pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let Some(token_id) = bearer_token(header) else {
        return ApiError::forbidden("Bearer token was not supplied").into_response();
    };

    let manager = state.manager.clone();
    let user = tokio::task::spawn_blocking(move || manager.user_for_token(&token_id)).await;

    let user = match user {
        Ok(Ok(user)) => user,
        Ok(Err(err)) => {
            warn!(error = %err, "token validation failed");
            return ApiError::unauthorized("Token not authorized or not valid").into_response();
        }
        Err(err) => {
            return ApiError::internal(format!("token lookup task failed: {err}")).into_response();
        }
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Extracts and decodes the token id from a `Bearer <b64-token>` header
/// value. Returns `None` if the header is not a well-formed bearer header.
pub fn bearer_token(header: &str) -> Option<String> {
    let encoded = strip_scheme(header, "Bearer ")?;
    let decoded = BASE64.decode(encoded).ok()?;
    String::from_utf8(decoded).ok()
}

/// Extracts the username/password pair from a `Basic <b64(user:pass)>`
/// header value.
pub fn basic_credentials(header: &str) -> Option<(String, String)> {
    let encoded = strip_scheme(header, "Basic ")?;
    let decoded = BASE64.decode(encoded).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (username, password) = credentials.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Case-insensitively strips an auth scheme prefix like `Bearer `.
fn strip_scheme<'a>(header: &'a str, scheme: &str) -> Option<&'a str> {
    if header.len() < scheme.len() {
        return None;
    }
    let (prefix, rest) = header.split_at(scheme.len());
    if !prefix.eq_ignore_ascii_case(scheme) {
        return None;
    }
    Some(rest)
}
