//! Error types for session operations
//!
//! This module defines the errors raised while reading or writing the
//! persisted session.

use thiserror::Error;

/// Session error types.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backing storage could not be read or written
    #[error("Session storage error: {0}")]
    Storage(String),

    /// A stored value could not be (de)serialized
    #[error("Session serialization error: {0}")]
    Serialization(String),

    /// A lock guarding the store was poisoned by a panicking writer
    #[error("Session store lock poisoned")]
    Poisoned,
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    /// Get error code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::Storage(_) => "SESSION_STORAGE",
            SessionError::Serialization(_) => "SESSION_SERIALIZATION",
            SessionError::Poisoned => "SESSION_POISONED",
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}
