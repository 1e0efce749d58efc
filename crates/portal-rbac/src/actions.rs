//! # Actions
//!
//! Operations staff can perform inside an admin area. Combined with a
//! [`Resource`](crate::resources::Resource) they form a permission code.

use serde::{Deserialize, Serialize};

/// Actions that appear in permission codes.
///
/// - **View**: See lists and details
/// - **Create**: Add new records
/// - **Edit**: Modify existing records
/// - **Delete**: Remove records
/// - **Export**: Download spreadsheets
/// - **Assign**: Hand a request to a staff member
/// - **Resolve**: Close a request with an answer
/// - **Approve**: Approve or reject a booking
/// - **Manage**: Administer the area's settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// See lists and details.
    View,
    /// Add new records.
    Create,
    /// Modify existing records.
    Edit,
    /// Remove records.
    Delete,
    /// Download spreadsheets.
    Export,
    /// Hand a request to a staff member.
    Assign,
    /// Close a request with an answer.
    Resolve,
    /// Approve or reject a booking.
    Approve,
    /// Administer the area.
    Manage,
}

impl Action {
    /// Code segment used in permission codes (e.g. `"VIEW"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "VIEW",
            Action::Create => "CREATE",
            Action::Edit => "EDIT",
            Action::Delete => "DELETE",
            Action::Export => "EXPORT",
            Action::Assign => "ASSIGN",
            Action::Resolve => "RESOLVE",
            Action::Approve => "APPROVE",
            Action::Manage => "MANAGE",
        }
    }

    /// Parse an action from its code segment.
    ///
    /// Matching is case-insensitive and accepts the backend's historical
    /// aliases (`READ`, `UPDATE`, `REMOVE`).
    ///
    /// # Example
    ///
    /// ```
    /// use portal_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("view"), Some(Action::View));
    /// assert_eq!(Action::parse("UPDATE"), Some(Action::Edit));
    /// assert_eq!(Action::parse("fly"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "VIEW" | "READ" | "LIST" => Some(Action::View),
            "CREATE" | "ADD" => Some(Action::Create),
            "EDIT" | "UPDATE" => Some(Action::Edit),
            "DELETE" | "REMOVE" => Some(Action::Delete),
            "EXPORT" => Some(Action::Export),
            "ASSIGN" => Some(Action::Assign),
            "RESOLVE" | "CLOSE" => Some(Action::Resolve),
            "APPROVE" => Some(Action::Approve),
            "MANAGE" => Some(Action::Manage),
            _ => None,
        }
    }

    /// All actions, in declaration order.
    pub fn all() -> Vec<Self> {
        vec![
            Action::View,
            Action::Create,
            Action::Edit,
            Action::Delete,
            Action::Export,
            Action::Assign,
            Action::Resolve,
            Action::Approve,
            Action::Manage,
        ]
    }

    /// Whether the action modifies data.
    pub fn is_write(&self) -> bool {
        !matches!(self, Action::View | Action::Export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        assert_eq!(Action::parse("VIEW"), Some(Action::View));
        assert_eq!(Action::parse("read"), Some(Action::View));
        assert_eq!(Action::parse("Update"), Some(Action::Edit));
        assert_eq!(Action::parse("remove"), Some(Action::Delete));
        assert_eq!(Action::parse("close"), Some(Action::Resolve));
        assert_eq!(Action::parse(""), None);
        assert_eq!(Action::parse("invalid"), None);
    }

    #[test]
    fn test_action_round_trips_through_code_segment() {
        for action in Action::all() {
            assert_eq!(Action::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn test_is_write() {
        assert!(Action::Create.is_write());
        assert!(Action::Assign.is_write());
        assert!(!Action::View.is_write());
        assert!(!Action::Export.is_write());
    }

    #[test]
    fn test_serde_uses_code_segment() {
        let json = serde_json::to_string(&Action::Approve).unwrap();
        assert_eq!(json, "\"APPROVE\"");
    }
}
