//! # Roles
//!
//! Coarse administrative tiers. Role ids are small integers assigned by the
//! backend; lower ids carry more authority.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A backend role id.
///
/// The well-known tiers are exposed as constants; any other id the backend
/// issues is carried through unchanged.
///
/// # Example
///
/// ```
/// use portal_rbac::RoleId;
///
/// assert!(RoleId::SUPER_ADMIN.is_admin_tier());
/// assert!(!RoleId::USER.is_admin_tier());
/// assert_eq!(RoleId::from(3), RoleId::EMPLOYEE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub u32);

impl RoleId {
    /// Full control over the portal.
    pub const SUPER_ADMIN: RoleId = RoleId(1);
    /// Administers departments, categories and users.
    pub const ADMIN: RoleId = RoleId(2);
    /// Staff member who handles assigned requests.
    pub const EMPLOYEE: RoleId = RoleId(3);
    /// Regular account that submits requests.
    pub const USER: RoleId = RoleId(4);

    /// Whether this is one of the administrative tiers.
    pub fn is_admin_tier(&self) -> bool {
        *self == Self::SUPER_ADMIN || *self == Self::ADMIN
    }

    /// Human readable name of a well-known tier.
    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            1 => Some("super_admin"),
            2 => Some("admin"),
            3 => Some("employee"),
            4 => Some("user"),
            _ => None,
        }
    }
}

impl From<u32> for RoleId {
    fn from(id: u32) -> Self {
        RoleId(id)
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "role {}", self.0),
        }
    }
}

/// The role ids held by a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet {
    ids: BTreeSet<RoleId>,
}

impl RoleSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` is held.
    pub fn contains(&self, id: RoleId) -> bool {
        self.ids.contains(&id)
    }

    /// Whether any of `ids` is held. Empty input yields `false`.
    pub fn contains_any(&self, ids: &[RoleId]) -> bool {
        ids.iter().any(|id| self.contains(*id))
    }

    /// Add a role id.
    pub fn insert(&mut self, id: RoleId) -> bool {
        self.ids.insert(id)
    }

    /// Highest-authority tier held, i.e. the lowest id.
    pub fn highest(&self) -> Option<RoleId> {
        self.ids.iter().next().copied()
    }

    /// Iterate in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = RoleId> + '_ {
        self.ids.iter().copied()
    }

    /// Number of roles held.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no role is held.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<R: Into<RoleId>> FromIterator<R> for RoleSet {
    fn from_iter<T: IntoIterator<Item = R>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
