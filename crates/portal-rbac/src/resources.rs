//! # Resources
//!
//! Admin areas of the portal that carry their own permission codes.

use serde::{Deserialize, Serialize};

/// Admin areas that can have permissions assigned.
///
/// - **Requests**: Complaints, Inquiries, Visits
/// - **Organization**: Departments, Categories, Leadership
/// - **Administration**: Users, Roles, Notifications, Logs, Dashboard, Settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resource {
    /// Complaints submitted by students and citizens.
    Complaints,
    /// Information inquiries.
    Inquiries,
    /// Visit bookings with university leadership.
    Visits,
    /// University departments.
    Departments,
    /// Request categories.
    Categories,
    /// Leadership members who receive visits.
    Leadership,
    /// Portal user accounts.
    Users,
    /// Role definitions.
    Roles,
    /// Notification center.
    Notifications,
    /// Audit and activity logs.
    Logs,
    /// Statistics dashboard.
    Dashboard,
    /// System settings.
    Settings,
}

impl Resource {
    /// Code segment used in permission codes (e.g. `"USERS"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Complaints => "COMPLAINTS",
            Resource::Inquiries => "INQUIRIES",
            Resource::Visits => "VISITS",
            Resource::Departments => "DEPARTMENTS",
            Resource::Categories => "CATEGORIES",
            Resource::Leadership => "LEADERSHIP",
            Resource::Users => "USERS",
            Resource::Roles => "ROLES",
            Resource::Notifications => "NOTIFICATIONS",
            Resource::Logs => "LOGS",
            Resource::Dashboard => "DASHBOARD",
            Resource::Settings => "SETTINGS",
        }
    }

    /// Parse a resource from its code segment (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|resource| resource.as_str().eq_ignore_ascii_case(s))
    }

    /// All resources, in declaration order.
    pub fn all() -> Vec<Self> {
        vec![
            Resource::Complaints,
            Resource::Inquiries,
            Resource::Visits,
            Resource::Departments,
            Resource::Categories,
            Resource::Leadership,
            Resource::Users,
            Resource::Roles,
            Resource::Notifications,
            Resource::Logs,
            Resource::Dashboard,
            Resource::Settings,
        ]
    }

    /// Whether the area holds requests submitted by the public.
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Resource::Complaints | Resource::Inquiries | Resource::Visits
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_parse() {
        assert_eq!(Resource::parse("USERS"), Some(Resource::Users));
        assert_eq!(Resource::parse("departments"), Some(Resource::Departments));
        assert_eq!(Resource::parse("unknown"), None);
    }

    #[test]
    fn test_all_resources_round_trip() {
        for resource in Resource::all() {
            assert_eq!(Resource::parse(resource.as_str()), Some(resource));
        }
        assert_eq!(Resource::all().len(), 12);
    }

    #[test]
    fn test_request_resources() {
        assert!(Resource::Complaints.is_request());
        assert!(Resource::Visits.is_request());
        assert!(!Resource::Users.is_request());
    }
}
