//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ECOPONTO_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to `DATABASE_URL`)
//!
//! ## Optional
//! - `ECOPONTO_HOST` - Bind address (default: 127.0.0.1)
//! - `ECOPONTO_PORT` - Listen port (default: 3333)
//! - `ECOPONTO_BASE_URL` - Public base URL used for image links when the
//!   request carries no `Host` header
//! - `ECOPONTO_UPLOAD_DIR` - Directory for uploaded point photos
//!   (default: `uploads/points`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL fallback for building absolute image links
    pub base_url: Option<String>,
    /// Directory where uploaded point photos are stored
    pub upload_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ECOPONTO_DATABASE_URL")?;
        let host = get_env_or_default("ECOPONTO_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ECOPONTO_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ECOPONTO_PORT", "3333")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ECOPONTO_PORT".to_string(), e.to_string()))?;
        let base_url = get_optional_env("ECOPONTO_BASE_URL");
        if let Some(base) = &base_url {
            url::Url::parse(base).map_err(|e| {
                ConfigError::InvalidEnvVar("ECOPONTO_BASE_URL".to_string(), e.to_string())
            })?;
        }
        let upload_dir = PathBuf::from(get_env_or_default("ECOPONTO_UPLOAD_DIR", "uploads/points"));
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            upload_dir,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
