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

//! Application initialization and runtime.
//!
//! This module handles:
//! - Datastore initialization
//! - HTTP server setup
//! - TLS/HTTPS configuration
//! - The TTL reaper worker
//! - Graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use iam_api::{create_router, AppState};
use iam_data::Manager;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::reaper::{TtlReaper, DEFAULT_REAP_INTERVAL};

/// Main application.
pub struct App {
    config: Config,
    manager: Arc<Manager>,
}

impl App {
    /// Creates a new application instance, opening both datastores.
    pub fn new(config: Config) -> Result<Self> {
        info!("Initializing IAM application...");

        let manager = Manager::open(&config.datastore.system, &config.datastore.tokens)
            .context("Problem opening the datastores")?;

        info!("Datastores opened successfully");

        Ok(Self {
            config,
            manager: Arc::new(manager),
        })
    }

    /// Runs the application (HTTP/HTTPS server) until a shutdown signal.
    ///
    /// If TLS is configured via `IAM_TLS_CERT` and `IAM_TLS_KEY`, the server
    /// uses HTTPS; otherwise plain HTTP.
    pub async fn run(self) -> Result<()> {
        // Validate TLS configuration early
        self.config
            .api
            .tls
            .validate()
            .map_err(|e| anyhow::anyhow!("TLS configuration error: {}", e))?;

        info!("System DB: {:?}", self.config.datastore.system);
        info!("Token DB: {:?}", self.config.datastore.tokens);
        info!("Token TTL: {} minutes", self.config.api.token_ttl_minutes);

        let addr: SocketAddr = self
            .config
            .bind_address()
            .parse()
            .context("Invalid bind address")?;

        let tls_config = if self.config.api.tls.enabled {
            Some(self.load_tls_config().await?)
        } else {
            None
        };

        // Sweep expired tokens, tombstones, and enrollments in the background
        let reaper = TtlReaper::new(self.manager.clone(), DEFAULT_REAP_INTERVAL);
        let reaper_handle = reaper.spawn();

        let state = AppState::new(
            self.manager.clone(),
            Duration::from_secs(self.config.api.token_ttl_minutes * 60),
            self.config.allowed_origins(),
        );
        let router = create_router(state);

        let result = if let Some(rustls_config) = tls_config {
            info!("Listening on https://{}", addr);
            run_https_server(addr, router, rustls_config).await
        } else {
            info!("Listening on http://{}", addr);
            run_http_server(addr, router).await
        };

        reaper_handle.abort();
        let _ = reaper_handle.await;
        info!("TTL reaper stopped");

        // Flush and release the datastores; the manager is only shared with
        // the already-aborted worker and the drained router by now
        if let Some(manager) = Arc::into_inner(self.manager) {
            manager.close().context("Problem closing the datastores")?;
        }

        result
    }

    /// Loads TLS configuration from the certificate and key files.
    async fn load_tls_config(&self) -> Result<axum_server::tls_rustls::RustlsConfig> {
        use axum_server::tls_rustls::RustlsConfig;

        let tls = &self.config.api.tls;
        let cert_path = tls.cert_path.as_ref().context("TLS certificate path not configured")?;
        let key_path = tls.key_path.as_ref().context("TLS private key path not configured")?;

        info!("Loading TLS certificate from {:?}", cert_path);
        info!("Loading TLS private key from {:?}", key_path);

        let rustls_config = RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .context("Failed to load TLS certificate and key")?;

        info!("TLS configured successfully");
        Ok(rustls_config)
    }
}

/// Runs the HTTP server (without TLS).
async fn run_http_server(addr: SocketAddr, router: axum::Router) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Runs the HTTPS server (with TLS).
async fn run_https_server(
    addr: SocketAddr,
    router: axum::Router,
    rustls_config: axum_server::tls_rustls::RustlsConfig,
) -> Result<()> {
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(30)));
    });

    axum_server::bind_rustls(addr, rustls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handles graceful shutdown signals.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown...");
        }
    }
}
