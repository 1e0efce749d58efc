//! Per-resource APIs.
//!
//! Each type wraps a [`ResourceApi`](crate::resource::ResourceApi) for its
//! path prefix, dereferences to it for the shared CRUD endpoints, and adds
//! the resource's own endpoints.

pub mod categories;
pub mod complaints;
pub mod departments;
pub mod inquiries;
pub mod leadership;
pub mod notifications;
pub mod users;
pub mod visits;

use serde::{Deserialize, Serialize};

pub use categories::{CategoriesApi, Category, CategoryFilters, CategoryPayload};
pub use complaints::{
    AssignComplaint, Complaint, ComplaintFilters, ComplaintPayload, ComplaintReply, ComplaintsApi,
};
pub use departments::{Department, DepartmentFilters, DepartmentPayload, DepartmentsApi};
pub use inquiries::{InquiriesApi, Inquiry, InquiryFilters, InquiryPayload};
pub use leadership::{Leader, LeaderFilters, LeaderPayload, LeadershipApi};
pub use notifications::{NotificationFilters, NotificationItem, NotificationsApi};
pub use users::{User, UserFilters, UserPayload, UsersApi};
pub use visits::{Visit, VisitFilters, VisitPayload, VisitsApi};

/// Lifecycle of a complaint, inquiry or visit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestStatus {
    /// Submitted, not yet picked up.
    New,
    /// Assigned and being worked on.
    InProgress,
    /// Handled with an outcome.
    Resolved,
    /// Turned down.
    Rejected,
    /// Archived.
    Closed,
}

impl RequestStatus {
    /// Whether no further work is expected.
    pub fn is_final(self) -> bool {
        matches!(self, RequestStatus::Resolved | RequestStatus::Rejected | RequestStatus::Closed)
    }
}

/// Urgency of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    /// Low.
    Low,
    /// Medium.
    Medium,
    /// High.
    High,
    /// Urgent.
    Urgent,
}
