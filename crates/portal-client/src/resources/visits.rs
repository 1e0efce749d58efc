//! Visit requests to university leadership.

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use super::RequestStatus;
use crate::error::ApiResult;
use crate::pagination::PageRequest;
use crate::resource::ResourceApi;
use crate::transport::Transport;

/// A visit request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    /// Visit ID.
    pub id: i64,
    /// Visitor's name.
    pub visitor_name: String,
    /// Reason for the visit.
    #[serde(default)]
    pub purpose: String,
    /// Leadership member to visit.
    pub leader_id: i64,
    /// Requested time.
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub scheduled_at: DateTime<Utc>,
    /// Current status.
    pub status: RequestStatus,
    /// Reason given when rejected.
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Body for creating or updating a visit request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitPayload {
    /// Visitor's name.
    pub visitor_name: String,
    /// Reason for the visit.
    pub purpose: String,
    /// Leadership member to visit.
    pub leader_id: i64,
    /// Requested time.
    pub scheduled_at: DateTime<Utc>,
}

/// Listing filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitFilters {
    /// Free-text search.
    pub search: Option<String>,
    /// Restrict to a status.
    pub status: Option<RequestStatus>,
    /// Restrict to one leadership member.
    pub leader_id: Option<i64>,
    /// Scheduled on or after.
    pub from_date: Option<DateTime<Utc>>,
    /// Scheduled on or before.
    pub to_date: Option<DateTime<Utc>>,
    /// Page selection.
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Serialize)]
struct Rejection<'a> {
    reason: &'a str,
}

/// `/visits`.
#[derive(Debug, Clone)]
pub struct VisitsApi {
    api: ResourceApi<Visit, VisitPayload, VisitPayload, VisitFilters>,
}

impl VisitsApi {
    /// Path prefix.
    pub const RESOURCE: &'static str = "visits";

    /// Create the API over a shared transport.
    pub fn new(transport: Transport) -> Self {
        Self {
            api: ResourceApi::new(transport, Self::RESOURCE),
        }
    }

    /// Approve: `PATCH /visits/{id}/approve`.
    pub async fn approve(&self, id: i64) -> ApiResult<()> {
        let _: IgnoredAny = self
            .api
            .custom_patch(&format!("{}/approve", id), &Map::new())
            .await?;
        Ok(())
    }

    /// Reject with a reason: `PATCH /visits/{id}/reject`.
    pub async fn reject(&self, id: i64, reason: &str) -> ApiResult<()> {
        let _: IgnoredAny = self
            .api
            .custom_patch(&format!("{}/reject", id), &Rejection { reason })
            .await?;
        Ok(())
    }
}

impl std::ops::Deref for VisitsApi {
    type Target = ResourceApi<Visit, VisitPayload, VisitPayload, VisitFilters>;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}
