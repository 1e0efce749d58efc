//! # Portal Authentication
//!
//! This crate holds the client-side session of the campus request portal:
//! the bearer/refresh token pair, the signed-in user, and the single place
//! that tears a session down when the server answers 401.
//!
//! ## Overview
//!
//! The portal-auth crate handles:
//! - **Storage**: An injected [`SessionStore`] (in-memory or file backed)
//!   holding `authToken`, `refreshToken`, `userInfo` and `userProfile`
//! - **Credentials**: [`SessionCredential`] with redacted `Debug` output
//! - **Users**: [`UserInfo`] and its [`AccessSnapshot`](portal_rbac::AccessSnapshot)
//! - **Logout**: [`Session::handle_unauthorized`], deduplicated across
//!   concurrent requests
//!
//! ## Usage
//!
//! ```rust
//! use portal_auth::{MemorySessionStore, Session, SessionCredential};
//! use std::sync::Arc;
//!
//! let session = Session::new(
//!     Arc::new(MemorySessionStore::new()),
//!     Arc::new(|path: &str| println!("navigate to {}", path)),
//! );
//!
//! session.begin(&SessionCredential::new("token", None), None).unwrap();
//! assert_eq!(session.access_token().as_deref(), Some("token"));
//!
//! // The server rejected the token: storage is cleared, login shown once.
//! assert!(session.handle_unauthorized(Some("token")));
//! assert!(!session.handle_unauthorized(Some("token")));
//! assert!(!session.is_authenticated());
//! ```
//!
//! ## Integration
//!
//! - `portal-rbac`: user permissions and roles become an access snapshot
//! - `portal-client`: the transport reads the token and reports 401s here

pub mod error;
pub mod navigator;
pub mod session;
pub mod store;
pub mod user;

// Re-export main types
pub use error::{SessionError, SessionResult};
pub use navigator::{LogNavigator, Navigator, LOGIN_PATH};
pub use session::Session;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StorageKey};
pub use user::{SessionCredential, UserInfo};
