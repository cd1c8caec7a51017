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

//! Axum router and shared application state.
//!
//! Every route except `GET /auth/token` sits behind the bearer middleware.
//! The manager is synchronous (embedded KV plus bcrypt), so handlers hop to
//! the blocking pool for every call into it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use iam_data::Manager;

use crate::handlers;
use crate::middleware::bearer_auth_middleware;

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The data manager, shared process-wide.
    pub manager: Arc<Manager>,
    /// Lifetime of tokens minted by `GET /auth/token`.
    pub token_ttl: Duration,
    /// Origins allowed by the CORS layer; `*` means any.
    pub allowed_origins: Vec<String>,
    /// Server start time, for the overview's uptime field.
    pub start_time: Instant,
}

impl AppState {
    /// Creates the application state.
    pub fn new(manager: Arc<Manager>, token_ttl: Duration, allowed_origins: Vec<String>) -> Self {
        Self {
            manager,
            token_ttl,
            allowed_origins,
            start_time: Instant::now(),
        }
    }
}

/// Creates the main router.
///
/// # Routes
///
/// - `GET  /auth/token` — basic auth → bearer token (the only public route)
/// - `POST /auth/authorize` — evaluate `{resource, action}` for the caller
/// - `POST/GET/PUT /2fa` — TOTP enrollment begin / QR image / finish
/// - `POST/GET /system/users`, `GET /system/user/:name`,
///   `GET /system/user/:name/policies`
/// - `POST/GET /system/groups`, `GET /system/group/:name`,
///   `PUT /system/group/:name/users/:csv`
/// - `POST/GET /system/resources`, `GET /system/resource/:name`,
///   `PUT /system/resource/:name/actions/:csv`
/// - `POST/GET /system/policies`, `GET /system/policy/:name`,
///   `PUT /system/policy/:name/{users,groups}/:csv`
/// - `POST/GET /system/roles`, `GET /system/role/:name`,
///   `PUT /system/role/:name/{policies,users,groups}/:csv`
/// - `POST /system/search`, `GET /system/overview`
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.allowed_origins);

    let protected = Router::new()
        .route("/auth/authorize", post(handlers::auth::authorize))
        .route(
            "/2fa",
            post(handlers::totp::begin_enrollment)
                .get(handlers::totp::enrollment_image)
                .put(handlers::totp::finish_enrollment),
        )
        .route(
            "/system/users",
            post(handlers::users::add_user).get(handlers::users::get_all_users),
        )
        .route("/system/user/:name", get(handlers::users::get_user))
        .route(
            "/system/user/:name/policies",
            get(handlers::users::get_user_policies),
        )
        .route(
            "/system/groups",
            post(handlers::groups::add_group).get(handlers::groups::get_all_groups),
        )
        .route("/system/group/:name", get(handlers::groups::get_group))
        .route(
            "/system/group/:name/users/:csv",
            put(handlers::groups::add_users_to_group),
        )
        .route(
            "/system/resources",
            post(handlers::resources::add_resource).get(handlers::resources::get_all_resources),
        )
        .route("/system/resource/:name", get(handlers::resources::get_resource))
        .route(
            "/system/resource/:name/actions/:csv",
            put(handlers::resources::add_actions_to_resource),
        )
        .route(
            "/system/policies",
            post(handlers::policies::add_policy).get(handlers::policies::get_all_policies),
        )
        .route("/system/policy/:name", get(handlers::policies::get_policy))
        .route(
            "/system/policy/:name/users/:csv",
            put(handlers::policies::attach_policy_to_users),
        )
        .route(
            "/system/policy/:name/groups/:csv",
            put(handlers::policies::attach_policy_to_groups),
        )
        .route(
            "/system/roles",
            post(handlers::roles::add_role).get(handlers::roles::get_all_roles),
        )
        .route("/system/role/:name", get(handlers::roles::get_role))
        .route(
            "/system/role/:name/policies/:csv",
            put(handlers::roles::attach_policies_to_role),
        )
        .route(
            "/system/role/:name/users/:csv",
            put(handlers::roles::attach_role_to_users),
        )
        .route(
            "/system/role/:name/groups/:csv",
            put(handlers::roles::attach_role_to_groups),
        )
        .route("/system/search", post(handlers::system::search))
        .route("/system/overview", get(handlers::system::overview))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_middleware,
        ));

    let public = Router::new().route("/auth/token", get(handlers::auth::get_token));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Builds the CORS layer from the configured origin list.
fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(parsed))
    }
}
