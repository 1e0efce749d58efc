//! # Permissions
//!
//! Permission codes and the per-session set they are checked against.
//!
//! Codes are opaque strings issued by the backend. [`PermissionCode`] is a
//! typed way to spell the well-known ones; membership checks always compare
//! the raw strings, so codes the client has no enum for still work.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::actions::Action;
use crate::resources::Resource;

/// A well-known permission code: resource plus action.
///
/// # Example
///
/// ```
/// use portal_rbac::{Action, PermissionCode, Resource};
///
/// let code = PermissionCode::new(Resource::Users, Action::View);
/// assert_eq!(code.to_string(), "USERS_VIEW");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionCode {
    /// The admin area.
    pub resource: Resource,
    /// The operation within it.
    pub action: Action,
}

impl PermissionCode {
    /// Create a code from its parts.
    pub fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    /// Parse a code such as `"COMPLAINTS_ASSIGN"`.
    ///
    /// Returns `None` for codes that do not follow the `RESOURCE_ACTION`
    /// shape or name an unknown resource or action.
    pub fn parse(s: &str) -> Option<Self> {
        let (resource, action) = s.split_once('_')?;
        Some(Self {
            resource: Resource::parse(resource)?,
            action: Action::parse(action)?,
        })
    }
}

impl fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.resource.as_str(), self.action.as_str())
    }
}

impl From<PermissionCode> for String {
    fn from(code: PermissionCode) -> Self {
        code.to_string()
    }
}

/// The permission codes granted to a session.
///
/// Membership is exact string equality; there is no wildcard or implied
/// permission.
///
/// # Example
///
/// ```
/// use portal_rbac::PermissionSet;
///
/// let set = PermissionSet::from_codes(["USERS_VIEW", "USERS_EDIT"]);
/// assert!(set.contains("USERS_VIEW"));
/// assert!(!set.contains("USERS_DELETE"));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    codes: HashSet<String>,
}

impl PermissionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from any iterator of codes.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a code.
    pub fn insert(&mut self, code: impl Into<String>) -> bool {
        self.codes.insert(code.into())
    }

    /// Whether the code is granted.
    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Whether at least one of `codes` is granted. Empty input yields `false`.
    pub fn contains_any<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        codes.iter().any(|code| self.contains(code.as_ref()))
    }

    /// Whether every one of `codes` is granted. Empty input yields `true`.
    pub fn contains_all<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        codes.iter().all(|code| self.contains(code.as_ref()))
    }

    /// Iterate over the granted codes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    /// The granted codes that parse as [`PermissionCode`].
    pub fn known(&self) -> Vec<PermissionCode> {
        let mut known: Vec<_> = self.iter().filter_map(PermissionCode::parse).collect();
        known.sort();
        known
    }

    /// Number of codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether no code is granted.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::from_codes(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display_and_parse() {
        let code = PermissionCode::new(Resource::Visits, Action::Approve);
        assert_eq!(code.to_string(), "VISITS_APPROVE");
        assert_eq!(PermissionCode::parse("VISITS_APPROVE"), Some(code));
        assert_eq!(PermissionCode::parse("visits_approve"), Some(code));
    }

    #[test]
    fn test_code_parse_rejects_unknown_shapes() {
        assert_eq!(PermissionCode::parse("VISITS"), None);
        assert_eq!(PermissionCode::parse("SPACESHIPS_VIEW"), None);
        assert_eq!(PermissionCode::parse("USERS_TELEPORT"), None);
    }

    #[test]
    fn test_set_membership_is_exact() {
        let set = PermissionSet::from_codes(["USERS_VIEW"]);
        assert!(set.contains("USERS_VIEW"));
        assert!(!set.contains("users_view"));
        assert!(!set.contains("USERS"));
    }

    #[test]
    fn test_contains_any_and_all_with_empty_input() {
        let set = PermissionSet::from_codes(["USERS_VIEW"]);
        let none: [&str; 0] = [];
        assert!(!set.contains_any(&none));
        assert!(set.contains_all(&none));

        let empty = PermissionSet::new();
        assert!(!empty.contains_any(&none));
        assert!(empty.contains_all(&none));
    }

    #[test]
    fn test_contains_any_and_all() {
        let set = PermissionSet::from_codes(["USERS_VIEW", "USERS_EDIT"]);
        assert!(set.contains_any(&["USERS_DELETE", "USERS_EDIT"]));
        assert!(!set.contains_any(&["USERS_DELETE"]));
        assert!(set.contains_all(&["USERS_VIEW", "USERS_EDIT"]));
        assert!(!set.contains_all(&["USERS_VIEW", "USERS_DELETE"]));
    }

    #[test]
    fn test_known_skips_custom_codes() {
        let set = PermissionSet::from_codes(["USERS_VIEW", "REPORTS_PRINT_ALL", "LOGS_EXPORT"]);
        assert_eq!(
            set.known(),
            vec![
                PermissionCode::new(Resource::Users, Action::View),
                PermissionCode::new(Resource::Logs, Action::Export),
            ]
        );
    }

    #[test]
    fn test_set_serializes_as_list() {
        let set: PermissionSet = serde_json::from_str(r#"["A_VIEW","B_VIEW"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("A_VIEW"));
    }
}
