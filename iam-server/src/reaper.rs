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

//! TTL reaper worker.
//!
//! Reads already treat expired records (tokens, tombstones, pending TOTP
//! enrollments) as absent; this worker deletes them for good so the
//! datastores do not accumulate dead entries.

use std::sync::Arc;
use std::time::Duration;

use iam_data::Manager;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// How often the reaper sweeps by default.
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Background worker that periodically deletes expired records.
pub struct TtlReaper {
    manager: Arc<Manager>,
    period: Duration,
}

impl TtlReaper {
    /// Creates a new reaper over the shared manager.
    pub fn new(manager: Arc<Manager>, period: Duration) -> Self {
        Self { manager, period }
    }

    /// Spawns the reaper as a background task.
    ///
    /// Returns a join handle that can be used to abort the worker on
    /// shutdown.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run_loop().await;
        })
    }

    async fn run_loop(&self) {
        let mut timer = interval(self.period);
        info!("TTL reaper started (interval: {:?})", self.period);

        // Skip the first tick (fires immediately)
        timer.tick().await;

        loop {
            timer.tick().await;

            let manager = self.manager.clone();
            let swept = tokio::task::spawn_blocking(move || manager.reap_expired()).await;

            match swept {
                Ok(Ok(0)) => debug!("TTL sweep found nothing to reap"),
                Ok(Ok(removed)) => info!(removed, "TTL sweep removed expired records"),
                Ok(Err(err)) => warn!(error = %err, "TTL sweep failed"),
                Err(err) => warn!(error = %err, "TTL sweep task failed"),
            }
        }
    }
}
