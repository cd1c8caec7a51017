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

//! Request handlers.

pub mod auth;
pub mod groups;
pub mod policies;
pub mod resources;
pub mod roles;
pub mod system;
pub mod totp;
pub mod users;

use iam_data::IamError;

use crate::error::ApiError;

/// Runs a manager call on the blocking pool. The manager does disk I/O and
/// (on credential paths) bcrypt, neither of which belongs on the async
/// runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, IamError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(err) => Err(ApiError::internal(format!("blocking task failed: {err}"))),
    }
}

/// Splits a `:csv` path segment into names, dropping empty pieces.
pub(crate) fn split_csv(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
