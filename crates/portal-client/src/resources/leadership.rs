//! University leadership members that visitors can book.

use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::pagination::PageRequest;
use crate::resource::ResourceApi;
use crate::transport::Transport;

/// A leadership member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leader {
    /// Leader ID.
    pub id: i64,
    /// Display name.
    pub full_name: String,
    /// Position title (e.g. "Dean of Engineering").
    #[serde(default)]
    pub position: Option<String>,
    /// Department, when the position belongs to one.
    #[serde(default)]
    pub department_id: Option<i64>,
    /// Whether visit requests are accepted.
    #[serde(default)]
    pub is_available: bool,
    /// Active flag.
    #[serde(default)]
    pub is_active: bool,
}

/// Body for creating or updating a leadership member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderPayload {
    /// Display name.
    pub full_name: String,
    /// Position title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// Department.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    /// Whether visit requests are accepted.
    pub is_available: bool,
}

/// Listing filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderFilters {
    /// Free-text search.
    pub search: Option<String>,
    /// Restrict to one department.
    pub department_id: Option<i64>,
    /// Page selection.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// `/leadership`.
#[derive(Debug, Clone)]
pub struct LeadershipApi {
    api: ResourceApi<Leader, LeaderPayload, LeaderPayload, LeaderFilters>,
}

impl LeadershipApi {
    /// Path prefix.
    pub const RESOURCE: &'static str = "leadership";

    /// Create the API over a shared transport.
    pub fn new(transport: Transport) -> Self {
        Self {
            api: ResourceApi::new(transport, Self::RESOURCE),
        }
    }

    /// Members currently accepting visits: `GET /leadership/available`.
    pub async fn available(&self) -> ApiResult<Vec<Leader>> {
        self.api.custom_get("available").await
    }
}

impl std::ops::Deref for LeadershipApi {
    type Target = ResourceApi<Leader, LeaderPayload, LeaderPayload, LeaderFilters>;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}
