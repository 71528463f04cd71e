//! Service configuration.
//!
//! Configuration is read from environment variables with defaults suitable for
//! local development:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `USERS_API_BIND` | [`ServiceConfig::bind_address`] | `127.0.0.1:7071` |
//! | `USERS_API_DATABASE` | [`StoreConfig::database_id`] | `social` |
//! | `USERS_API_CONTAINER` | [`StoreConfig::container_id`] | `users` |
//! | `USERS_API_SEED_FILE` | [`StoreConfig::seed_file`] | unset |

use std::net::SocketAddr;
use std::path::PathBuf;

pub const BIND_VAR: &str = "USERS_API_BIND";
pub const DATABASE_VAR: &str = "USERS_API_DATABASE";
pub const CONTAINER_VAR: &str = "USERS_API_CONTAINER";
pub const SEED_FILE_VAR: &str = "USERS_API_SEED_FILE";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {variable}: {message}")]
    InvalidValue {
        variable: String,
        value: String,
        message: String,
    },
}

/// Document store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Logical database name.
    pub database_id: String,
    /// Container (collection) holding user documents.
    pub container_id: String,
    /// JSON array of documents loaded when the store initializes.
    pub seed_file: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_id: "social".to_string(),
            container_id: "users".to_string(),
            seed_file: None,
        }
    }
}

/// Top-level configuration for the users API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Address the HTTP listener binds to.
    pub bind_address: SocketAddr,
    pub store: StoreConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 7071)),
            store: StoreConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Unset and blank variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(value) = get(BIND_VAR) {
            config.bind_address = value.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidValue {
                    variable: BIND_VAR.to_string(),
                    value: value.clone(),
                    message: e.to_string(),
                }
            })?;
        }
        if let Some(value) = get(DATABASE_VAR) {
            config.store.database_id = value;
        }
        if let Some(value) = get(CONTAINER_VAR) {
            config.store.container_id = value;
        }
        config.store.seed_file = get(SEED_FILE_VAR).map(PathBuf::from);

        Ok(config)
    }
}
