//! University departments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::pagination::PageRequest;
use crate::resource::ResourceApi;
use crate::transport::Transport;

/// A department requests are routed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    /// Department ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Inactive departments are hidden from request forms.
    #[serde(default)]
    pub is_active: bool,
    /// Staff count, when the backend includes it.
    #[serde(default)]
    pub employees_count: Option<u32>,
    /// Creation time.
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPayload {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Active flag.
    pub is_active: bool,
}

/// Listing filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentFilters {
    /// Free-text search.
    pub search: Option<String>,
    /// Only active or inactive departments.
    pub is_active: Option<bool>,
    /// Page selection.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// `/departments`.
#[derive(Debug, Clone)]
pub struct DepartmentsApi {
    api: ResourceApi<Department, DepartmentPayload, DepartmentPayload, DepartmentFilters>,
}

impl DepartmentsApi {
    /// Path prefix.
    pub const RESOURCE: &'static str = "departments";

    /// Create the API over a shared transport.
    pub fn new(transport: Transport) -> Self {
        Self {
            api: ResourceApi::new(transport, Self::RESOURCE),
        }
    }

    /// Active departments for selection lists: `GET /departments/active`.
    pub async fn active(&self) -> ApiResult<Vec<Department>> {
        self.api.custom_get("active").await
    }
}

impl std::ops::Deref for DepartmentsApi {
    type Target = ResourceApi<Department, DepartmentPayload, DepartmentPayload, DepartmentFilters>;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}
