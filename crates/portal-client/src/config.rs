//! Client configuration.
//!
//! The portal backend address and request timeout are read from the
//! environment with defaults suitable for a local backend.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Backend used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Per-request timeout used when nothing is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Connection settings for the portal backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every request path is appended to (e.g. "https://portal.uni.edu/api").
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Configuration for an explicit base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Override the timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORTAL_API_BASE_URL`: backend URL
    /// - `VITE_API_BASE_URL`: accepted when the former is unset, so the
    ///   web build's `.env` files can be shared
    /// - `PORTAL_API_TIMEOUT_SECS`: request timeout (default: 15)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            base_url: std::env::var("PORTAL_API_BASE_URL")
                .or_else(|_| std::env::var("VITE_API_BASE_URL"))
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(default.base_url),
            timeout_secs: std::env::var("PORTAL_API_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Check that the base URL is absolute http(s) and the timeout is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "base_url".to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "base_url".to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000/api");
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_url_joins_single_slash() {
        let config = ClientConfig::new("https://portal.uni.edu/api/");
        assert_eq!(config.url("/departments"), "https://portal.uni.edu/api/departments");
        assert_eq!(config.url("departments/3"), "https://portal.uni.edu/api/departments/3");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ClientConfig::new("not a url").validate().is_err());
        assert!(ClientConfig::new("ftp://host/api").validate().is_err());
        assert!(ClientConfig::default().with_timeout_secs(0).validate().is_err());
    }
}
