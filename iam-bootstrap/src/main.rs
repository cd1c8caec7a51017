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

//! IAM Bootstrap - one-shot system setup.
//!
//! Populates empty datastores with the admin user, the Administrators
//! group, the System resource, the all-powerful policy, and the sys_admin
//! role, then prints the generated admin password. The password is shown
//! exactly once and cannot be recovered; re-running against populated
//! datastores fails.

use anyhow::{Context, Result};
use iam_data::Manager;
use iam_server::Config;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load()?;
    info!("Bootstrapping system DB {:?} / token DB {:?}", config.datastore.system, config.datastore.tokens);

    let manager = Manager::open(&config.datastore.system, &config.datastore.tokens)
        .context("Problem opening the datastores")?;

    let (admin, password) = manager.bootstrap().context("Bootstrap failed")?;

    println!("System bootstrapped.");
    println!("Admin user:     {}", admin.name);
    println!("Admin password: {password}");
    println!("Store this password now; it is not shown again.");

    manager.close().context("Problem closing the datastores")?;
    Ok(())
}
