//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPAPP_API_BASE_URL` - Base URL of the REST API (e.g., `http://localhost:8088/api/v1`)
//!
//! ## Optional
//! - `SHOPAPP_LANGUAGE` - `Accept-Language` sent with every request (default: vi)
//! - `SHOPAPP_STORAGE_PATH` - File backing the local key-value store (default: .shopapp/storage.json)
//! - `SHOPAPP_CACHE_TTL_SECS` - Lifetime of cached catalog responses (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default `Accept-Language` header value.
pub const DEFAULT_LANGUAGE: &str = "vi";

/// Default location of the local store.
pub const DEFAULT_STORAGE_PATH: &str = ".shopapp/storage.json";

/// Default catalog cache lifetime in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API; endpoint paths are appended to it
    pub api_base_url: Url,
    /// Language sent as `Accept-Language`
    pub language: String,
    /// Path of the JSON file backing local storage
    pub storage_path: PathBuf,
    /// Time-to-live of cached product and category responses
    pub cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
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

        let api_base_url = parse_base_url(
            "SHOPAPP_API_BASE_URL",
            &get_required_env("SHOPAPP_API_BASE_URL")?,
        )?;
        let language = get_env_or_default("SHOPAPP_LANGUAGE", DEFAULT_LANGUAGE);
        if language.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPAPP_LANGUAGE".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let storage_path = PathBuf::from(get_env_or_default(
            "SHOPAPP_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));
        let cache_ttl_secs = get_env_or_default(
            "SHOPAPP_CACHE_TTL_SECS",
            &DEFAULT_CACHE_TTL_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPAPP_CACHE_TTL_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_base_url,
            language,
            storage_path,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `api_base_url` with every other setting at
    /// its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn for_base_url(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("api_base_url", api_base_url)?,
            language: DEFAULT_LANGUAGE.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            sentry_dsn: None,
            sentry_environment: None,
        })
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
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse the API base URL.
///
/// A trailing slash is stripped so endpoint paths can be appended with a
/// leading one.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim_end_matches('/'))
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    Ok(url)
}
