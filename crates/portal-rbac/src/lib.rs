//! # Portal RBAC (Role-Based Access Control)
//!
//! This crate decides, from the current session's permission codes and role
//! ids, whether protected parts of the campus request portal should render.
//!
//! ## Overview
//!
//! The portal-rbac crate handles:
//! - **Resources**: Admin areas that carry permissions (complaints, users, ...)
//! - **Actions**: Operations staff perform on those areas
//! - **Permission Codes**: `RESOURCE_ACTION` strings such as `USERS_VIEW`
//! - **Roles**: Coarse administrative tiers (super-admin ... user)
//! - **Access Snapshots**: The immutable permission/role view of a session
//! - **Gates**: The composite check used by conditional rendering
//!
//! ## Usage
//!
//! ```rust
//! use portal_rbac::{AccessSnapshot, Gate, RoleId};
//!
//! let access = AccessSnapshot::new(["USERS_VIEW", "COMPLAINTS_ASSIGN"], [RoleId::ADMIN]);
//!
//! assert!(access.has_permission("USERS_VIEW"));
//! assert!(access.has_any_permission(&["USERS_DELETE", "USERS_VIEW"]));
//! assert!(!access.has_all_permissions(&["USERS_DELETE", "USERS_VIEW"]));
//! assert!(access.has_role_id(RoleId::ADMIN));
//!
//! // Single permission takes precedence over the list checks.
//! let gate = Gate::new().permission("USERS_VIEW").all_of(["USERS_DELETE"]);
//! assert!(gate.allows(&access));
//!
//! // No requirement at all means always visible.
//! assert!(Gate::new().allows(&AccessSnapshot::empty()));
//! ```
//!
//! ## Empty Lists
//!
//! `has_all_permissions(&[])` passes vacuously while `has_any_permission(&[])`
//! fails. Callers rely on this asymmetry.
//!
//! ## Typed Codes
//!
//! Screens may spell codes by hand or build them from [`Resource`] and
//! [`Action`]:
//!
//! ```rust
//! use portal_rbac::{Action, PermissionCode, Resource};
//!
//! let code = PermissionCode::new(Resource::Complaints, Action::Assign);
//! assert_eq!(code.to_string(), "COMPLAINTS_ASSIGN");
//! assert_eq!(PermissionCode::parse("COMPLAINTS_ASSIGN"), Some(code));
//! ```

pub mod access;
pub mod actions;
pub mod gate;
pub mod permissions;
pub mod resources;
pub mod roles;

// Re-export main types for convenience
pub use access::{AccessError, AccessSnapshot};
pub use actions::Action;
pub use gate::Gate;
pub use permissions::{PermissionCode, PermissionSet};
pub use resources::Resource;
pub use roles::{RoleId, RoleSet};
