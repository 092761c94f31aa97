//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

use orgadmin_observability::{LogFormat, ParseLogFormatError};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ORGADMIN_BIND_ADDR '{0}' is not a socket address")]
    InvalidBindAddr(String),

    #[error("ORGADMIN_LOG_FORMAT: {0}")]
    InvalidLogFormat(#[from] ParseLogFormatError),

    #[error("JWT_SECRET must not be empty")]
    EmptyJwtSecret,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub log_format: LogFormat,
    /// Postgres connection string; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Set when JWT_SECRET was unset and the insecure dev secret is in use.
    pub jwt_secret_is_default: bool,
}

impl ApiConfig {
    /// Configuration for tests and local runs: in-memory stores, given secret.
    pub fn for_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            log_format: LogFormat::Pretty,
            database_url: None,
            jwt_secret_is_default: false,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Nothing is logged here; this
    /// runs before the subscriber is installed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("ORGADMIN_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_raw.clone()))?;

        let (jwt_secret, jwt_secret_is_default) = match lookup("JWT_SECRET") {
            Some(secret) if secret.trim().is_empty() => return Err(ConfigError::EmptyJwtSecret),
            Some(secret) => (secret, false),
            None => (DEV_JWT_SECRET.to_string(), true),
        };

        let log_format = match lookup("ORGADMIN_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        Ok(Self {
            bind_addr,
            jwt_secret,
            log_format,
            database_url,
            jwt_secret_is_default,
        })
    }
}
