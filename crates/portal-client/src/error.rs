//! Normalized API errors.
//!
//! Every failure the transport can observe is folded into [`ApiError`] so
//! screens handle one type: timeouts, missing responses, HTTP error
//! statuses, and 2xx responses whose envelope reports `success: false`.
//! Nothing in this crate retries on its own; see [`crate::retry`] for the
//! opt-in helper callers can use.

use portal_auth::SessionError;
use thiserror::Error;

use crate::config::ConfigError;

/// Status reported for requests that exceeded the configured timeout.
pub const TIMEOUT_STATUS: u16 = 408;

/// Status reported when no response was received at all.
pub const NETWORK_STATUS: u16 = 0;

/// Message used when the server gave no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Message guaranteed on 403 responses that carry none.
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action";

/// API client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request exceeded the configured timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// No response was received (connection refused, DNS failure, reset).
    #[error("Network error: {message}")]
    Network {
        /// Transport error description.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Best-effort human readable message.
        message: String,
        /// Field-level validation errors, if any.
        errors: Vec<String>,
    },

    /// The server answered 2xx but the envelope reported `success: false`.
    #[error("{message}")]
    Rejected {
        /// HTTP status code of the response.
        status: u16,
        /// Message from the envelope.
        message: String,
        /// Errors from the envelope.
        errors: Vec<String>,
    },

    /// The response body did not match the expected shape.
    #[error("Invalid API response: {0}")]
    Decode(String),

    /// The request could not be built (e.g. an unsupported filter value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The client is misconfigured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The session store could not be updated.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Status code of the error kind.
    ///
    /// Timeouts report 408 and missing responses report 0; errors raised
    /// before a request was sent also report 0.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Timeout { .. } => TIMEOUT_STATUS,
            ApiError::Network { .. } => NETWORK_STATUS,
            ApiError::Http { status, .. } | ApiError::Rejected { status, .. } => *status,
            ApiError::Decode(_)
            | ApiError::InvalidRequest(_)
            | ApiError::Config(_)
            | ApiError::Session(_) => 0,
        }
    }

    /// Human readable message without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            ApiError::Http { message, .. } | ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Network { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Field-level errors reported by the server.
    pub fn field_errors(&self) -> &[String] {
        match self {
            ApiError::Http { errors, .. } | ApiError::Rejected { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Whether the server rejected the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Http { status: 401, .. })
    }

    /// Whether the server denied the operation.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ApiError::Http { status: 403, .. })
    }

    /// Whether the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Http { status: 404, .. })
    }

    /// Whether repeating the same request may succeed.
    ///
    /// Timeouts, missing responses and gateway errors qualify.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Timeout { .. } | ApiError::Network { .. } => true,
            ApiError::Http { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Error code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Timeout { .. } => "TIMEOUT",
            ApiError::Network { .. } => "NETWORK_ERROR",
            ApiError::Http { status: 401, .. } => "UNAUTHORIZED",
            ApiError::Http { status: 403, .. } => "FORBIDDEN",
            ApiError::Http { status: 404, .. } => "NOT_FOUND",
            ApiError::Http { status: 400 | 422, .. } => "VALIDATION_ERROR",
            ApiError::Http { .. } => "HTTP_ERROR",
            ApiError::Rejected { .. } => "REJECTED",
            ApiError::Decode(_) => "INVALID_RESPONSE",
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::Session(_) => "SESSION_ERROR",
        }
    }
}
