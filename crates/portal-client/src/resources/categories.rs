//! Request categories.

use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::pagination::PageRequest;
use crate::resource::ResourceApi;
use crate::transport::Transport;

/// A category a complaint or inquiry is filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Department that handles the category.
    #[serde(default)]
    pub department_id: Option<i64>,
    /// Parent category for nested categories.
    #[serde(default)]
    pub parent_id: Option<i64>,
    /// Active flag.
    #[serde(default)]
    pub is_active: bool,
}

/// Body for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Department that handles the category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    /// Parent category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    /// Active flag.
    pub is_active: bool,
}

/// Listing filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFilters {
    /// Free-text search.
    pub search: Option<String>,
    /// Restrict to one department.
    pub department_id: Option<i64>,
    /// Only active or inactive categories.
    pub is_active: Option<bool>,
    /// Page selection.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// `/categories`.
#[derive(Debug, Clone)]
pub struct CategoriesApi {
    api: ResourceApi<Category, CategoryPayload, CategoryPayload, CategoryFilters>,
}

impl CategoriesApi {
    /// Path prefix.
    pub const RESOURCE: &'static str = "categories";

    /// Create the API over a shared transport.
    pub fn new(transport: Transport) -> Self {
        Self {
            api: ResourceApi::new(transport, Self::RESOURCE),
        }
    }

    /// Active categories: `GET /categories/active`.
    pub async fn active(&self) -> ApiResult<Vec<Category>> {
        self.api.custom_get("active").await
    }
}

impl std::ops::Deref for CategoriesApi {
    type Target = ResourceApi<Category, CategoryPayload, CategoryPayload, CategoryFilters>;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}
