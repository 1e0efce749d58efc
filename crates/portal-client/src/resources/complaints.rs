//! Complaints filed by students and staff.

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::{Priority, RequestStatus};
use crate::error::ApiResult;
use crate::pagination::PageRequest;
use crate::resource::ResourceApi;
use crate::transport::Transport;

/// A complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    /// Complaint ID.
    pub id: i64,
    /// Human-facing reference number.
    #[serde(default)]
    pub reference_number: Option<String>,
    /// Subject line.
    pub title: String,
    /// Full text.
    #[serde(default)]
    pub description: String,
    /// Current status.
    pub status: RequestStatus,
    /// Urgency.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Category.
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Department handling the complaint.
    #[serde(default)]
    pub department_id: Option<i64>,
    /// Staff member it is assigned to.
    #[serde(default)]
    pub assigned_to_id: Option<i64>,
    /// Submitter.
    #[serde(default)]
    pub submitted_by_id: Option<i64>,
    /// Replies, oldest first.
    #[serde(default)]
    pub replies: Vec<ComplaintReply>,
    /// Submission time.
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A reply on a complaint thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintReply {
    /// Reply ID.
    pub id: i64,
    /// Reply text.
    pub message: String,
    /// Author.
    #[serde(default)]
    pub author_name: Option<String>,
    /// Posting time.
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating a complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintPayload {
    /// Subject line.
    pub title: String,
    /// Full text.
    pub description: String,
    /// Category.
    pub category_id: i64,
    /// Urgency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// Listing filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintFilters {
    /// Free-text search.
    pub search: Option<String>,
    /// Restrict to a status.
    pub status: Option<RequestStatus>,
    /// Restrict to a department.
    pub department_id: Option<i64>,
    /// Restrict to a category.
    pub category_id: Option<i64>,
    /// Restrict to an assignee.
    pub assigned_to_id: Option<i64>,
    /// Submitted on or after.
    pub from_date: Option<DateTime<Utc>>,
    /// Submitted on or before.
    pub to_date: Option<DateTime<Utc>>,
    /// Page selection.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Body for `PATCH /complaints/{id}/assign`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignComplaint {
    /// Staff member to assign.
    pub assignee_id: i64,
    /// Optional note for the assignee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdate<'a> {
    status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

#[derive(Serialize)]
struct NewReply<'a> {
    message: &'a str,
}

/// `/complaints`.
#[derive(Debug, Clone)]
pub struct ComplaintsApi {
    api: ResourceApi<Complaint, ComplaintPayload, ComplaintPayload, ComplaintFilters>,
}

impl ComplaintsApi {
    /// Path prefix.
    pub const RESOURCE: &'static str = "complaints";

    /// Create the API over a shared transport.
    pub fn new(transport: Transport) -> Self {
        Self {
            api: ResourceApi::new(transport, Self::RESOURCE),
        }
    }

    /// Assign to a staff member: `PATCH /complaints/{id}/assign`.
    pub async fn assign(&self, id: i64, assignment: &AssignComplaint) -> ApiResult<Complaint> {
        self.api.custom_patch(&format!("{}/assign", id), assignment).await
    }

    /// Move to another status: `PATCH /complaints/{id}/status-change`.
    pub async fn change_status(
        &self,
        id: i64,
        status: RequestStatus,
        note: Option<&str>,
    ) -> ApiResult<()> {
        let _: IgnoredAny = self
            .api
            .custom_patch(&format!("{}/status-change", id), &StatusUpdate { status, note })
            .await?;
        Ok(())
    }

    /// Post a reply: `POST /complaints/{id}/replies`.
    pub async fn add_reply(&self, id: i64, message: &str) -> ApiResult<ComplaintReply> {
        self.api
            .custom_post(&format!("{}/replies", id), &NewReply { message })
            .await
    }
}

impl std::ops::Deref for ComplaintsApi {
    type Target = ResourceApi<Complaint, ComplaintPayload, ComplaintPayload, ComplaintFilters>;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}
