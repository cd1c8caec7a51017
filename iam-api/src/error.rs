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

//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use iam_data::IamError;

/// An error ready to leave over the wire: a status code plus a message,
/// rendered as a `{status, message}` JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<IamError> for ApiError {
    fn from(err: IamError) -> Self {
        let status = match err {
            IamError::NotFound { .. } | IamError::EnrollmentNotFound { .. } => {
                StatusCode::NOT_FOUND
            }

            IamError::AlreadyExists { .. }
            | IamError::InvalidName { .. }
            | IamError::InvalidPolicy(_)
            | IamError::InvalidSearch(_)
            | IamError::InvalidTotpCode
            | IamError::TotpAlreadyEnabled { .. } => StatusCode::BAD_REQUEST,

            IamError::Unauthorized { .. }
            | IamError::InvalidCredentials
            | IamError::TokenUnknown
            | IamError::TokenExpired
            | IamError::RequestDenied
            | IamError::RequestForcefullyDenied => StatusCode::UNAUTHORIZED,

            IamError::Matcher(_)
            | IamError::Totp(_)
            | IamError::Bootstrap { .. }
            | IamError::CloseFailed(_)
            | IamError::Hash(_)
            | IamError::Storage(_)
            | IamError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": self.status.as_u16(),
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
