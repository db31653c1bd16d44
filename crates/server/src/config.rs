//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BENCHLAB_BASE_URL` - Public URL of this service (used to build
//!   download links)
//! - `BENCHLAB_ADMIN_TOKEN` - Shared secret for the manual mark-paid
//!   override (min 32 chars, not a placeholder)
//!
//! ## Optional
//! - `BENCHLAB_HOST` - Bind address (default: 127.0.0.1)
//! - `BENCHLAB_PORT` - Listen port (default: 3000)
//! - `BENCHLAB_DATA_DIR` - Directory for the order store file and report
//!   spool (default: ./data)
//! - `BENCHLAB_TOKEN_TTL_SECS` - Download token lifetime (default: 3600)
//! - `BENCHLAB_VPIC_BASE_URL` - NHTSA vPIC API base
//!   (default: <https://vpic.nhtsa.dot.gov/api>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono::TimeDelta;
use secrecy::SecretString;
use thiserror::Error;

const MIN_ADMIN_TOKEN_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// BenchLab server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for this service
    pub base_url: String,
    /// Directory holding the order store file and the report spool
    pub data_dir: PathBuf,
    /// Lifetime of a freshly minted download token
    pub token_ttl: TimeDelta,
    /// Shared secret for the admin mark-paid override
    pub admin_token: SecretString,
    /// NHTSA vPIC API base URL
    pub vpic_base_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g., production, staging)
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the admin token fails validation (length, placeholder detection).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("BENCHLAB_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BENCHLAB_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("BENCHLAB_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BENCHLAB_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("BENCHLAB_BASE_URL")?;
        let data_dir = PathBuf::from(get_env_or_default("BENCHLAB_DATA_DIR", "./data"));

        let ttl_secs = get_env_or_default("BENCHLAB_TOKEN_TTL_SECS", "3600")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BENCHLAB_TOKEN_TTL_SECS".to_string(), e.to_string())
            })?;
        if ttl_secs <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BENCHLAB_TOKEN_TTL_SECS".to_string(),
                "must be positive".to_string(),
            ));
        }
        let token_ttl = TimeDelta::seconds(ttl_secs);

        let admin_token = get_validated_secret("BENCHLAB_ADMIN_TOKEN")?;

        let vpic_base_url =
            get_env_or_default("BENCHLAB_VPIC_BASE_URL", "https://vpic.nhtsa.dot.gov/api");

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            data_dir,
            token_ttl,
            admin_token,
            vpic_base_url,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Path of the persisted order store file.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("orders.json")
    }

    /// Directory transient report artifacts are spooled to.
    #[must_use]
    pub fn spool_dir(&self) -> PathBuf {
        self.data_dir.join("spool")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a secret is long enough and not a placeholder.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_ADMIN_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_ADMIN_TOKEN_LENGTH,
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
