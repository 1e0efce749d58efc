//! Portal user accounts.

use chrono::{DateTime, Utc};
use portal_rbac::RoleId;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::error::ApiResult;
use crate::pagination::PageRequest;
use crate::resource::ResourceApi;
use crate::transport::Transport;

/// A user account as listed by administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID.
    pub id: i64,
    /// Display name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Login name.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Department.
    #[serde(default)]
    pub department_id: Option<i64>,
    /// Assigned roles.
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
    /// Disabled accounts cannot sign in.
    #[serde(default)]
    pub is_active: bool,
    /// Creation time.
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    /// Display name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Initial password; only sent on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Department.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    /// Roles.
    pub role_ids: Vec<RoleId>,
    /// Active flag.
    pub is_active: bool,
}

/// Listing filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilters {
    /// Free-text search over name and email.
    pub search: Option<String>,
    /// Restrict to one department.
    pub department_id: Option<i64>,
    /// Users holding any of these roles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub role_ids: Vec<RoleId>,
    /// Only active or inactive users.
    pub is_active: Option<bool>,
    /// Page selection.
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleAssignment<'a> {
    role_ids: &'a [RoleId],
}

/// `/users`.
#[derive(Debug, Clone)]
pub struct UsersApi {
    api: ResourceApi<User, UserPayload, UserPayload, UserFilters>,
}

impl UsersApi {
    /// Path prefix.
    pub const RESOURCE: &'static str = "users";

    /// Create the API over a shared transport.
    pub fn new(transport: Transport) -> Self {
        Self {
            api: ResourceApi::new(transport, Self::RESOURCE),
        }
    }

    /// Replace a user's roles: `PUT /users/{id}/roles` with `{"roleIds": [...]}`.
    pub async fn assign_roles(&self, id: i64, role_ids: &[RoleId]) -> ApiResult<()> {
        let _: IgnoredAny = self
            .api
            .custom_put(&format!("{}/roles", id), &RoleAssignment { role_ids })
            .await?;
        Ok(())
    }

    /// Trigger a password reset: `POST /users/{id}/reset-password`.
    pub async fn reset_password(&self, id: i64) -> ApiResult<()> {
        let _: IgnoredAny = self
            .api
            .custom_post(&format!("{}/reset-password", id), &Map::new())
            .await?;
        Ok(())
    }
}

impl std::ops::Deref for UsersApi {
    type Target = ResourceApi<User, UserPayload, UserPayload, UserFilters>;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::build_query;

    #[test]
    fn test_filters_repeat_role_ids() {
        let filters = UserFilters {
            search: Some("omar".into()),
            role_ids: vec![RoleId::ADMIN, RoleId::EMPLOYEE],
            page: PageRequest::new(1, 20),
            ..UserFilters::default()
        };
        assert_eq!(
            build_query(&filters).unwrap(),
            "?search=omar&roleIds=2&roleIds=3&pageNumber=1&pageSize=20"
        );
    }
}
