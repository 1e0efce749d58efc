//! # Gates
//!
//! The composite requirement used by conditional-rendering wrappers.
//!
//! A gate carries an optional single permission, an optional "any of" list
//! and an optional "all of" list. Exactly one of them decides, in this
//! order: single, then any, then all. A gate with no requirement lets
//! everyone through.
//!
//! A single permission given as an empty string is treated as absent. An
//! empty list is still a requirement: `any_of([])` rejects and `all_of([])`
//! accepts.

use serde::{Deserialize, Serialize};

use crate::access::AccessSnapshot;

/// Composite permission requirement.
///
/// # Example
///
/// ```
/// use portal_rbac::{AccessSnapshot, Gate, RoleId};
///
/// let access = AccessSnapshot::new(["VISITS_VIEW"], [RoleId::EMPLOYEE]);
///
/// // The single permission wins even though the "any of" list would fail.
/// let gate = Gate::new()
///     .permission("VISITS_VIEW")
///     .any_of(["VISITS_APPROVE"]);
/// assert!(gate.allows(&access));
///
/// let gate = Gate::new().any_of(["VISITS_APPROVE"]).all_of(["VISITS_VIEW"]);
/// assert!(!gate.allows(&access));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gate {
    /// Single permission; checked first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,

    /// Any-of list; checked when no single permission is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<String>>,

    /// All-of list; checked last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<String>>,
}

impl Gate {
    /// A gate with no requirement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a single permission.
    pub fn permission(mut self, code: impl Into<String>) -> Self {
        self.permission = Some(code.into());
        self
    }

    /// Require at least one of `codes`.
    pub fn any_of<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.any_of = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    /// Require all of `codes`.
    pub fn all_of<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.all_of = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the gate carries any requirement.
    pub fn is_open(&self) -> bool {
        self.single().is_none() && self.any_of.is_none() && self.all_of.is_none()
    }

    /// Evaluate against a snapshot.
    pub fn allows(&self, access: &AccessSnapshot) -> bool {
        if let Some(code) = self.single() {
            return access.has_permission(code);
        }
        if let Some(ref codes) = self.any_of {
            return access.has_any_permission(codes.as_slice());
        }
        if let Some(ref codes) = self.all_of {
            return access.has_all_permissions(codes.as_slice());
        }
        true
    }

    fn single(&self) -> Option<&str> {
        self.permission.as_deref().filter(|code| !code.is_empty())
    }
}
