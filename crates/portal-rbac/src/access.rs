//! # Access Snapshots
//!
//! The permission and role view of one session. A snapshot is built once at
//! login (or when permissions are refetched) and is read-only afterwards;
//! every check here is a pure function of it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gate::Gate;
use crate::permissions::PermissionSet;
use crate::roles::{RoleId, RoleSet};

/// Denied access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    /// A specific permission code is missing.
    #[error("Missing permission: {0}")]
    MissingPermission(String),

    /// A specific role is missing.
    #[error("Missing role: {0}")]
    MissingRole(RoleId),

    /// A composite gate rejected the session.
    #[error("Forbidden: insufficient permissions")]
    Forbidden,
}

impl AccessError {
    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        403
    }

    /// Error code for API responses and logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::MissingPermission(_) => "MISSING_PERMISSION",
            AccessError::MissingRole(_) => "MISSING_ROLE",
            AccessError::Forbidden => "FORBIDDEN",
        }
    }
}

/// Immutable permission/role snapshot for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessSnapshot {
    /// Granted permission codes.
    #[serde(default)]
    pub permissions: PermissionSet,
    /// Held role ids.
    #[serde(default)]
    pub role_ids: RoleSet,
}

impl AccessSnapshot {
    /// Build a snapshot from permission codes and role ids.
    pub fn new<P, S, R, I>(permissions: P, role_ids: R) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = I>,
        I: Into<RoleId>,
    {
        Self {
            permissions: PermissionSet::from_codes(permissions),
            role_ids: role_ids.into_iter().collect(),
        }
    }

    /// Snapshot of an anonymous session.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True iff `code` is granted.
    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.contains(code)
    }

    /// True iff at least one of `codes` is granted; `false` for an empty list.
    pub fn has_any_permission<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        self.permissions.contains_any(codes)
    }

    /// True iff all of `codes` are granted; `true` for an empty list.
    pub fn has_all_permissions<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        self.permissions.contains_all(codes)
    }

    /// True iff the role id is held.
    pub fn has_role_id(&self, id: impl Into<RoleId>) -> bool {
        self.role_ids.contains(id.into())
    }

    /// True iff any of the role ids is held; `false` for an empty list.
    pub fn has_any_role(&self, ids: &[RoleId]) -> bool {
        self.role_ids.contains_any(ids)
    }

    /// Whether the session holds an administrative tier.
    pub fn is_admin(&self) -> bool {
        self.role_ids.iter().any(|id| id.is_admin_tier())
    }

    /// Evaluate a composite gate.
    pub fn allows(&self, gate: &Gate) -> bool {
        gate.allows(self)
    }

    /// Like [`has_permission`](Self::has_permission) but as a `Result`.
    pub fn require_permission(&self, code: &str) -> Result<(), AccessError> {
        if self.has_permission(code) {
            Ok(())
        } else {
            Err(AccessError::MissingPermission(code.to_string()))
        }
    }

    /// Like [`has_role_id`](Self::has_role_id) but as a `Result`.
    pub fn require_role(&self, id: RoleId) -> Result<(), AccessError> {
        if self.has_role_id(id) {
            Ok(())
        } else {
            Err(AccessError::MissingRole(id))
        }
    }

    /// Like [`allows`](Self::allows) but as a `Result`.
    pub fn require(&self, gate: &Gate) -> Result<(), AccessError> {
        if gate.allows(self) {
            Ok(())
        } else {
            Err(AccessError::Forbidden)
        }
    }
}
