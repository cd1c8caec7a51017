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

//! Configuration management for the IAM server.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API service settings (bind address, TLS, token lifetime, CORS).
    pub api: ApiServiceConfig,
    /// Datastore locations.
    pub datastore: DatastoreConfig,
    /// Log level: DEBUG/INFO/WARN/ERROR. `RUST_LOG` overrides it.
    pub loglevel: String,
}

/// API service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiServiceConfig {
    /// Address to bind (e.g., "0.0.0.0").
    /// Can be set via the IAM_BIND environment variable.
    pub bind: String,
    /// Port to listen on.
    /// Can be set via the IAM_PORT environment variable.
    pub port: u16,
    /// Lifetime of issued bearer tokens, in minutes.
    /// Can be set via the IAM_TOKEN_TTL_MINUTES environment variable.
    pub token_ttl_minutes: u64,
    /// Comma-separated CORS origins; `*` allows any.
    /// Can be set via the IAM_ALLOWED_ORIGINS environment variable.
    pub allowed_origins: String,
    /// TLS configuration for HTTPS support.
    pub tls: TlsConfig,
}

/// TLS/HTTPS configuration.
///
/// TLS is disabled by default. To enable it, set the `IAM_TLS_CERT` and
/// `IAM_TLS_KEY` environment variables to PEM-encoded certificate and
/// private key files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Whether TLS is enabled.
    /// Automatically set to true when both cert_path and key_path are provided.
    pub enabled: bool,
    /// Path to the PEM-encoded certificate file.
    pub cert_path: Option<PathBuf>,
    /// Path to the PEM-encoded private key file.
    pub key_path: Option<PathBuf>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        let cert_path = std::env::var("IAM_TLS_CERT").ok().map(PathBuf::from);
        let key_path = std::env::var("IAM_TLS_KEY").ok().map(PathBuf::from);

        // Enable TLS only if both cert and key are provided
        let enabled = cert_path.is_some() && key_path.is_some();

        Self {
            enabled,
            cert_path,
            key_path,
        }
    }
}

impl TlsConfig {
    /// Validates the TLS configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled {
            if self.cert_path.is_none() {
                return Err("TLS enabled but IAM_TLS_CERT is not set".to_string());
            }
            if self.key_path.is_none() {
                return Err("TLS enabled but IAM_TLS_KEY is not set".to_string());
            }
        }
        Ok(())
    }
}

/// Datastore configuration: separate files for entities and tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatastoreConfig {
    /// Path of the entity datastore.
    /// Can be set via the IAM_SYSTEM_DB environment variable.
    pub system: PathBuf,
    /// Path of the token datastore.
    /// Can be set via the IAM_TOKEN_DB environment variable.
    pub tokens: PathBuf,
}

impl Config {
    /// Loads configuration from the environment, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self::default())
    }

    /// The socket address string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.bind, self.api.port)
    }

    /// The tracing filter derived from the configured log level.
    pub fn log_filter(&self) -> String {
        match self.loglevel.to_uppercase().as_str() {
            "DEBUG" => "debug".to_string(),
            "WARN" => "warn".to_string(),
            "ERROR" => "error".to_string(),
            _ => "info".to_string(),
        }
    }

    /// Allowed CORS origins as a list.
    pub fn allowed_origins(&self) -> Vec<String> {
        self.api
            .allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiServiceConfig {
                bind: std::env::var("IAM_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("IAM_PORT")
                    .ok()
                    .and_then(|value| value.parse().ok())
                    .unwrap_or(3000),
                token_ttl_minutes: std::env::var("IAM_TOKEN_TTL_MINUTES")
                    .ok()
                    .and_then(|value| value.parse().ok())
                    .unwrap_or(60),
                allowed_origins: std::env::var("IAM_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string()),
                tls: TlsConfig::default(),
            },
            datastore: DatastoreConfig {
                system: std::env::var("IAM_SYSTEM_DB")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./db/system")),
                tokens: std::env::var("IAM_TOKEN_DB")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./db/token")),
            },
            loglevel: std::env::var("IAM_LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let mut config = Config::default();
        config.api.bind = "127.0.0.1".to_string();
        config.api.port = 3000;
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_allowed_origins_parsing() {
        let mut config = Config::default();
        config.api.allowed_origins = "*".to_string();
        assert_eq!(config.allowed_origins(), vec!["*"]);

        config.api.allowed_origins = "https://a.example, https://b.example".to_string();
        assert_eq!(
            config.allowed_origins(),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_log_filter_mapping() {
        let mut config = Config::default();
        config.loglevel = "DEBUG".to_string();
        assert_eq!(config.log_filter(), "debug");
        config.loglevel = "warn".to_string();
        assert_eq!(config.log_filter(), "warn");
        config.loglevel = "bogus".to_string();
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_tls_validation() {
        let tls = TlsConfig {
            enabled: false,
            cert_path: None,
            key_path: None,
        };
        assert!(tls.validate().is_ok());

        let tls = TlsConfig {
            enabled: true,
            cert_path: Some(PathBuf::from("/path/to/cert.pem")),
            key_path: None,
        };
        let result = tls.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("IAM_TLS_KEY"));
    }
}
