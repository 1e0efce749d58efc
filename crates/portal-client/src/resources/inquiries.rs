//! Inquiries: questions submitted to departments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RequestStatus;
use crate::error::ApiResult;
use crate::pagination::PageRequest;
use crate::resource::ResourceApi;
use crate::transport::Transport;

/// An inquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    /// Inquiry ID.
    pub id: i64,
    /// Subject line.
    pub subject: String,
    /// Question text.
    #[serde(default)]
    pub question: String,
    /// Answer, once given.
    #[serde(default)]
    pub answer: Option<String>,
    /// Current status.
    pub status: RequestStatus,
    /// Department asked.
    #[serde(default)]
    pub department_id: Option<i64>,
    /// Category.
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Submission time.
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
    /// Answer time.
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub answered_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating an inquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryPayload {
    /// Subject line.
    pub subject: String,
    /// Question text.
    pub question: String,
    /// Department asked.
    pub department_id: i64,
    /// Category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// Listing filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryFilters {
    /// Free-text search.
    pub search: Option<String>,
    /// Restrict to a status.
    pub status: Option<RequestStatus>,
    /// Restrict to a department.
    pub department_id: Option<i64>,
    /// Page selection.
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Serialize)]
struct Answer<'a> {
    answer: &'a str,
}

/// `/inquiries`.
#[derive(Debug, Clone)]
pub struct InquiriesApi {
    api: ResourceApi<Inquiry, InquiryPayload, InquiryPayload, InquiryFilters>,
}

impl InquiriesApi {
    /// Path prefix.
    pub const RESOURCE: &'static str = "inquiries";

    /// Create the API over a shared transport.
    pub fn new(transport: Transport) -> Self {
        Self {
            api: ResourceApi::new(transport, Self::RESOURCE),
        }
    }

    /// Answer an inquiry: `POST /inquiries/{id}/answer`.
    pub async fn answer(&self, id: i64, answer: &str) -> ApiResult<Inquiry> {
        self.api
            .custom_post(&format!("{}/answer", id), &Answer { answer })
            .await
    }
}

impl std::ops::Deref for InquiriesApi {
    type Target = ResourceApi<Inquiry, InquiryPayload, InquiryPayload, InquiryFilters>;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}
