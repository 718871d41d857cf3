//! # Configuration Settings
//!
//! Defines the configuration structure for the Civita backend. Values are
//! loaded from `CIVITA_*` environment variables by [`AppConfig::from_env`];
//! the signing keys and bcrypt cost are opaque inputs consumed by the auth
//! components.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Authentication configuration
    #[validate(nested)]
    pub auth: AuthConfig,

    /// Blob store configuration
    pub blobs: BlobStoreConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env()?,
            blobs: BlobStoreConfig::from_env(),
            observability: ObservabilityConfig::from_env(),
        };
        config.validate_all()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate_all(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()?;
        Ok(())
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite:") {
            return Err(Error::validation("Database URL must start with 'sqlite:'"));
        }

        if self.auth.access_token_key.len() < 32 {
            return Err(Error::validation(
                "Access token signing key must be at least 32 characters long",
            ));
        }

        if self.auth.refresh_token_key.len() < 32 {
            return Err(Error::validation(
                "Refresh token signing key must be at least 32 characters long",
            ));
        }

        if self.auth.access_token_key == self.auth.refresh_token_key {
            return Err(Error::validation(
                "Access and refresh token signing keys must differ",
            ));
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(Error::validation("bcrypt cost must be between 4 and 31"));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Maximum accepted upload body size in bytes
    #[validate(range(min = 1024, message = "Max upload size must be at least 1KB"))]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: 16 * 1024 * 1024, // 16MB
        }
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let port = match std::env::var("CIVITA_PORT") {
            Ok(value) => value
                .parse()
                .map_err(|e| Error::config(format!("Invalid CIVITA_PORT: {}", e)))?,
            Err(_) => defaults.port,
        };
        let max_upload_bytes = match std::env::var("CIVITA_MAX_UPLOAD_BYTES") {
            Ok(value) => value
                .parse()
                .map_err(|e| Error::config(format!("Invalid CIVITA_MAX_UPLOAD_BYTES: {}", e)))?,
            Err(_) => defaults.max_upload_bytes,
        };

        Ok(Self {
            host: std::env::var("CIVITA_HOST").unwrap_or(defaults.host),
            port,
            max_upload_bytes,
        })
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout_seconds: u64,

    /// Idle connection timeout in seconds (None = no timeout)
    pub idle_timeout_seconds: Option<u64>,

    /// Run embedded migrations automatically on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./civita.db".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("CIVITA_DATABASE_URL").unwrap_or(defaults.url),
            ..defaults
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_seconds.map(Duration::from_secs)
    }
}

/// Authentication configuration: signing keys and credential hashing cost.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// Key used to sign and verify access tokens
    pub access_token_key: String,

    /// Key used to sign and verify refresh tokens
    pub refresh_token_key: String,

    /// bcrypt cost factor for password hashing
    pub bcrypt_cost: u32,

    /// Access token lifetime in hours
    #[validate(range(min = 1, message = "Access token TTL must be positive"))]
    pub access_token_ttl_hours: i64,

    /// Refresh token lifetime in hours
    #[validate(range(min = 1, message = "Refresh token TTL must be positive"))]
    pub refresh_token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_key: String::new(),
            refresh_token_key: String::new(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            access_token_ttl_hours: 24,
            refresh_token_ttl_hours: 168,
        }
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let access_token_key = std::env::var("CIVITA_ACCESS_TOKEN_KEY")
            .map_err(|_| Error::config("CIVITA_ACCESS_TOKEN_KEY must be set"))?;
        let refresh_token_key = std::env::var("CIVITA_REFRESH_TOKEN_KEY")
            .map_err(|_| Error::config("CIVITA_REFRESH_TOKEN_KEY must be set"))?;
        let bcrypt_cost = match std::env::var("CIVITA_BCRYPT_COST") {
            Ok(value) => value
                .parse()
                .map_err(|e| Error::config(format!("Invalid CIVITA_BCRYPT_COST: {}", e)))?,
            Err(_) => defaults.bcrypt_cost,
        };

        Ok(Self { access_token_key, refresh_token_key, bcrypt_cost, ..defaults })
    }
}

/// Blob store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobStoreConfig {
    /// Root directory for stored blobs
    pub root: PathBuf,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self { root: PathBuf::from("./blobs") }
    }
}

impl BlobStoreConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            root: std::env::var("CIVITA_BLOB_ROOT").map(PathBuf::from).unwrap_or(defaults.root),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is not set
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable output
    pub json_logs: bool,

    /// Service name reported in startup logs
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            service_name: "civita".to_string(),
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: std::env::var("CIVITA_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: std::env::var("CIVITA_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.json_logs),
            service_name: defaults.service_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            auth: AuthConfig {
                access_token_key: "a".repeat(32),
                refresh_token_key: "b".repeat(32),
                ..AuthConfig::default()
            },
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate_all().is_ok());
    }

    #[test]
    fn test_short_signing_key_rejected() {
        let mut config = valid_config();
        config.auth.access_token_key = "short".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_identical_keys_rejected() {
        let mut config = valid_config();
        config.auth.refresh_token_key = config.auth.access_token_key.clone();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_non_sqlite_url_rejected() {
        let mut config = valid_config();
        config.database.url = "mysql://localhost/civita".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let mut config = valid_config();
        config.auth.bcrypt_cost = 3;
        assert!(config.validate_all().is_err());
        config.auth.bcrypt_cost = 12;
        assert!(config.validate_all().is_ok());
    }
}
