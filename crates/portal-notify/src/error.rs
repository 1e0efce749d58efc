//! Notification subscriber errors.

use thiserror::Error;

/// Errors raised while connecting to or talking with the notification hub.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The hub URL could not be derived or parsed.
    #[error("Invalid hub URL: {0}")]
    InvalidUrl(String),

    /// No token is available for the connection.
    #[error("No access token for the notification hub")]
    MissingToken,

    /// The WebSocket connection could not be opened.
    #[error("Failed to connect to notification hub: {0}")]
    Connect(String),

    /// The hub rejected the credentials during the upgrade.
    #[error("Notification hub rejected the session (HTTP {status})")]
    Unauthorized {
        /// HTTP status of the rejected upgrade.
        status: u16,
    },

    /// The hub refused the protocol handshake.
    #[error("Hub handshake failed: {0}")]
    Handshake(String),

    /// A frame did not follow the hub protocol.
    #[error("Hub protocol error: {0}")]
    Protocol(String),

    /// The connection was closed.
    #[error("Connection closed{}", .0.as_ref().map(|r| format!(": {}", r)).unwrap_or_default())]
    Closed(Option<String>),

    /// Connecting or the handshake took too long.
    #[error("Timed out connecting to notification hub")]
    Timeout,

    /// The broadcast stream ended.
    #[error("Notification stream closed")]
    ChannelClosed,
}

/// Result type for subscriber operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

impl NotifyError {
    /// Whether reconnecting cannot help without new credentials.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            NotifyError::Unauthorized { .. } | NotifyError::MissingToken | NotifyError::InvalidUrl(_)
        )
    }

    /// Error code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            NotifyError::InvalidUrl(_) => "INVALID_URL",
            NotifyError::MissingToken => "MISSING_TOKEN",
            NotifyError::Connect(_) => "CONNECT_FAILED",
            NotifyError::Unauthorized { .. } => "UNAUTHORIZED",
            NotifyError::Handshake(_) => "HANDSHAKE_FAILED",
            NotifyError::Protocol(_) => "PROTOCOL_ERROR",
            NotifyError::Closed(_) => "CLOSED",
            NotifyError::Timeout => "TIMEOUT",
            NotifyError::ChannelClosed => "CHANNEL_CLOSED",
        }
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(err: serde_json::Error) -> Self {
        NotifyError::Protocol(err.to_string())
    }
}

impl From<url::ParseError> for NotifyError {
    fn from(err: url::ParseError) -> Self {
        NotifyError::InvalidUrl(err.to_string())
    }
}
