//! Subscriber configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{NotifyError, NotifyResult};
use crate::reconnect::ReconnectPolicy;

/// Hub path relative to the backend origin.
pub const HUB_PATH: &str = "/hubs/notifications";

/// REST base URL used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// WebSocket URL of the hub (e.g. "wss://portal.uni.edu/hubs/notifications").
    pub hub_url: String,

    /// Client ping interval in milliseconds.
    pub ping_interval_ms: u64,

    /// Without inbound traffic for this long the connection counts as lost.
    pub idle_timeout_ms: u64,

    /// Limit for opening the socket and completing the handshake.
    pub connect_timeout_ms: u64,

    /// Reconnect schedule.
    pub reconnect: ReconnectPolicy,

    /// Buffer of the fan-out stream per subscriber.
    pub channel_capacity: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            hub_url: "ws://localhost:5000/hubs/notifications".to_string(),
            ping_interval_ms: 15_000,
            idle_timeout_ms: 30_000,
            connect_timeout_ms: 15_000,
            reconnect: ReconnectPolicy::default(),
            channel_capacity: 256,
        }
    }
}

impl NotifyConfig {
    /// Configuration for the hub belonging to a REST base URL.
    pub fn from_api_base_url(api_base_url: &str) -> NotifyResult<Self> {
        Ok(Self {
            hub_url: hub_url_for(api_base_url)?,
            ..Self::default()
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORTAL_API_BASE_URL` / `VITE_API_BASE_URL`: REST base URL the hub
    ///   URL is derived from (default: http://localhost:5000/api)
    /// - `PORTAL_NOTIFY_MAX_RECONNECT_ATTEMPTS`: stop retrying after this
    ///   many attempts (default: unbounded)
    pub fn from_env() -> NotifyResult<Self> {
        let base = std::env::var("PORTAL_API_BASE_URL")
            .or_else(|_| std::env::var("VITE_API_BASE_URL"))
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let mut config = Self::from_api_base_url(&base)?;
        config.reconnect.max_attempts = std::env::var("PORTAL_NOTIFY_MAX_RECONNECT_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok());
        Ok(config)
    }

    /// Set the reconnect schedule.
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Ping interval as a Duration.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    /// Idle timeout as a Duration.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Connect timeout as a Duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Hub URL carrying the token as `access_token`.
    pub fn connection_url(&self, token: &str) -> NotifyResult<Url> {
        let mut url = Url::parse(&self.hub_url)?;
        url.query_pairs_mut().append_pair("access_token", token);
        Ok(url)
    }
}

/// Derive the hub URL: drop a trailing `/api`, switch to `ws`/`wss`, append
/// [`HUB_PATH`].
pub fn hub_url_for(api_base_url: &str) -> NotifyResult<String> {
    let mut url = Url::parse(api_base_url.trim())?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(NotifyError::InvalidUrl(format!("unsupported scheme '{}'", other))),
    };
    url.set_scheme(scheme)
        .map_err(|_| NotifyError::InvalidUrl(format!("cannot switch to {}", scheme)))?;

    let path = url.path().trim_end_matches('/');
    let path = path.strip_suffix("/api").unwrap_or(path).to_string();
    url.set_path(&format!("{}{}", path, HUB_PATH));
    url.set_query(None);
    url.set_fragment(None);

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_url_strips_api() {
        assert_eq!(
            hub_url_for("http://localhost:5000/api").unwrap(),
            "ws://localhost:5000/hubs/notifications"
        );
        assert_eq!(
            hub_url_for("https://portal.uni.edu/api/").unwrap(),
            "wss://portal.uni.edu/hubs/notifications"
        );
        assert_eq!(
            hub_url_for("https://uni.edu/portal/api").unwrap(),
            "wss://uni.edu/portal/hubs/notifications"
        );
        assert_eq!(
            hub_url_for("http://10.0.0.5:8080").unwrap(),
            "ws://10.0.0.5:8080/hubs/notifications"
        );
    }

    #[test]
    fn test_hub_url_rejects_other_schemes() {
        assert!(hub_url_for("ftp://host/api").is_err());
        assert!(hub_url_for("no scheme").is_err());
    }

    #[test]
    fn test_default_matches_default_base() {
        let derived = NotifyConfig::from_api_base_url(DEFAULT_API_BASE_URL).unwrap();
        assert_eq!(derived, NotifyConfig::default());
    }

    #[test]
    fn test_connection_url_encodes_token() {
        let config = NotifyConfig::default();
        let url = config.connection_url("a b+c").unwrap();
        assert_eq!(
            url.as_str(),
            "ws://localhost:5000/hubs/notifications?access_token=a+b%2Bc"
        );
    }

    #[test]
    fn test_timing_defaults() {
        let config = NotifyConfig::default();
        assert_eq!(config.ping_interval(), Duration::from_secs(15));
        assert_eq!(config.idle_timeout(), Duration::from_secs(30));
        assert_eq!(config.reconnect.max_attempts, None);
    }
}
