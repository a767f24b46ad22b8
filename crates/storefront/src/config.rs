//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `KIOSK_API_URL` - Base URL of the platform API, including the version
//!   prefix (e.g., `https://api.kiosk.example/api/v1`)
//!
//! ## Optional
//! - `KIOSK_HOST` - Bind address (default: 127.0.0.1)
//! - `KIOSK_PORT` - Listen port (default: 3000)
//! - `KIOSK_BASE_URL` - Public URL of this server (default: http://localhost:3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (default: development)
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::Url;

/// Path prefix the platform API mounts its versioned routes under. Stripping
/// it from the API URL yields the origin that serves uploaded theme builds.
const API_PATH_PREFIX: &str = "/api/v1";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Platform API base URL, version prefix included
    pub api_url: String,
    /// Origin serving uploaded theme builds (API URL minus the version prefix)
    pub content_origin: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for this server
    pub base_url: String,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// DSN; tracking is disabled when unset
    pub dsn: Option<String>,
    /// Environment tag attached to every event
    pub environment: String,
    /// Fraction of errors reported (0.0-1.0)
    pub sample_rate: f32,
    /// Fraction of transactions traced (0.0-1.0)
    pub traces_sample_rate: f32,
}

impl StorefrontConfig {
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

        let api_url = get_required_env("KIOSK_API_URL")?;
        let content_origin = derive_content_origin(&api_url)
            .map_err(|reason| ConfigError::InvalidEnvVar("KIOSK_API_URL".to_string(), reason))?;
        let host = get_env_or_default("KIOSK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("KIOSK_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("KIOSK_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("KIOSK_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("KIOSK_BASE_URL", "http://localhost:3000");
        let sentry = SentryConfig::from_env()?;

        Ok(Self {
            api_url,
            content_origin,
            host,
            port,
            base_url,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the Secure attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_env_or_default("SENTRY_ENVIRONMENT", "development"),
            sample_rate: get_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: get_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Derive the content origin from the API URL by stripping the version prefix.
///
/// `https://api.kiosk.example/api/v1` serves uploads from
/// `https://api.kiosk.example/uploads/...`, so the origin is the API URL with
/// the trailing `/api/v1` removed. An API URL without the prefix is used as-is.
///
/// # Errors
///
/// Returns a description of the problem when `api_url` is not a valid URL or
/// nothing is left after removing the API path.
pub fn derive_content_origin(api_url: &str) -> Result<String, String> {
    Url::parse(api_url).map_err(|e| format!("not a valid URL: {e}"))?;

    let trimmed = api_url.trim_end_matches('/');
    let origin = trimmed.strip_suffix(API_PATH_PREFIX).unwrap_or(trimmed);
    if origin.is_empty() {
        return Err("no origin left after removing the API path".to_string());
    }
    Ok(origin.to_string())
}

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

/// Parse a sample rate variable, enforcing the 0.0-1.0 range Sentry expects.
fn get_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_origin_strips_api_prefix() {
        let origin = derive_content_origin("http://localhost:8000/api/v1").unwrap();
        assert_eq!(origin, "http://localhost:8000");
    }

    #[test]
    fn test_content_origin_ignores_trailing_slash() {
        let origin = derive_content_origin("https://api.kiosk.example/api/v1/").unwrap();
        assert_eq!(origin, "https://api.kiosk.example");
    }

    #[test]
    fn test_content_origin_without_prefix_is_unchanged() {
        let origin = derive_content_origin("https://api.kiosk.example").unwrap();
        assert_eq!(origin, "https://api.kiosk.example");
    }

    #[test]
    fn test_content_origin_rejects_garbage() {
        assert!(derive_content_origin("not a url").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            api_url: "http://localhost:8000/api/v1".to_string(),
            content_origin: "http://localhost:8000".to_string(),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            sentry: SentryConfig {
                dsn: None,
                environment: "development".to_string(),
                sample_rate: 1.0,
                traces_sample_rate: 0.0,
            },
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_is_secure_for_https_base_url() {
        let config = StorefrontConfig {
            api_url: "https://api.kiosk.example/api/v1".to_string(),
            content_origin: "https://api.kiosk.example".to_string(),
            host: "0.0.0.0".parse().unwrap(),
            port: 3000,
            base_url: "https://shop.kiosk.example".to_string(),
            sentry: SentryConfig {
                dsn: None,
                environment: "production".to_string(),
                sample_rate: 1.0,
                traces_sample_rate: 0.1,
            },
        };
        assert!(config.is_secure());
    }
}
