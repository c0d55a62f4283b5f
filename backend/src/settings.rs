//! Server settings loaded via OrthoConfig.
//!
//! Every field can come from the command line, a config file, or a
//! `CARELINE_*` environment variable. Unset values fall back to the
//! defaults below.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CARELINE")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_address: Option<String>,
    /// PostgreSQL connection string. Without one the server keeps all data
    /// in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub max_connections: u32,
    /// Bearer token lifetime in minutes.
    #[ortho_config(default = 1440)]
    pub token_ttl_minutes: i64,
}

/// Invalid configuration values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address does not parse as a socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddress {
        /// The rejected value.
        value: String,
        /// Parser failure.
        #[source]
        source: std::net::AddrParseError,
    },
    /// The token lifetime is zero or negative.
    #[error("token lifetime must be positive, got {0} minutes")]
    TokenTtl(i64),
}

impl ServerSettings {
    /// Address to bind, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddress`] when the configured value is not
    /// a socket address.
    pub fn bind_address(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS);
        raw.parse().map_err(|source| SettingsError::BindAddress {
            value: raw.to_owned(),
            source,
        })
    }

    /// Database to connect to, if any.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    /// Token lifetime, twenty-four hours unless configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::TokenTtl`] for zero or negative values.
    pub fn token_ttl(&self) -> Result<chrono::Duration, SettingsError> {
        if self.token_ttl_minutes <= 0 {
            return Err(SettingsError::TokenTtl(self.token_ttl_minutes));
        }
        Ok(chrono::Duration::minutes(self.token_ttl_minutes))
    }
}
