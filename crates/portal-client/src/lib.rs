//! # Portal Client
//!
//! Typed REST client core for the campus request portal.
//!
//! ## Overview
//!
//! The portal-client crate handles:
//! - **Transport**: one [`Transport`] attaching the session bearer token,
//!   applying the timeout, unwrapping `{success, message, data, errors}`
//!   envelopes and normalizing failures into [`ApiError`]
//! - **Resources**: the generic [`ResourceApi`] (pagination, search, CRUD,
//!   status toggle, bulk delete, export, upload) and typed wrappers per
//!   backend resource
//! - **Auth**: [`AuthApi`] login/logout storing the session in
//!   [`portal_auth::Session`]
//! - **Retry**: opt-in [`retry::retry_transient`] for callers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use portal_auth::Session;
//! use portal_client::{ClientConfig, DepartmentFilters, LoginRequest, PortalApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Arc::new(Session::in_memory());
//! let api = PortalApi::new(ClientConfig::new("https://portal.uni.edu/api"), session)?;
//!
//! let access = api.auth().login(&LoginRequest::new("admin@uni.edu", "secret")).await?;
//! if access.has_permission("DEPARTMENTS_VIEW") {
//!     let page = api.departments().get_all(&DepartmentFilters::default()).await?;
//!     println!("{} departments", page.total_count);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Integration
//!
//! - `portal-auth`: bearer token source and the 401 logout path
//! - `portal-rbac`: access snapshots returned by login

pub mod api;
pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod pagination;
pub mod query;
pub mod resource;
pub mod resources;
pub mod retry;
pub mod timestamp;
pub mod transport;

// Re-export main types
pub use api::PortalApi;
pub use auth::{AuthApi, LoginRequest, LoginResponse};
pub use config::{ClientConfig, ConfigError};
pub use envelope::Payload;
pub use error::{ApiError, ApiResult};
pub use pagination::{PageRequest, PaginatedResult};
pub use query::{build_query, Filters};
pub use resource::ResourceApi;
pub use resources::*;
pub use retry::{retry_transient, with_retry_if, RetryConfig};
pub use transport::{ExportedFile, Transport};
