//! Stored notifications of the signed-in user.

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::error::ApiResult;
use crate::pagination::PageRequest;
use crate::resource::ResourceApi;
use crate::transport::Transport;

/// A notification as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    /// Notification ID.
    pub id: i64,
    /// Short title.
    #[serde(default)]
    pub title: Option<String>,
    /// Body text.
    pub message: String,
    /// Category such as "complaint" or "visit".
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// In-app route to open.
    #[serde(default)]
    pub link: Option<String>,
    /// Whether the user has seen it.
    #[serde(default)]
    pub is_read: bool,
    /// Creation time.
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Listing filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilters {
    /// Only read or unread notifications.
    pub is_read: Option<bool>,
    /// Page selection.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// `unread-count` answers either a bare number or `{"count": n}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum UnreadCount {
    Bare(u64),
    Wrapped { count: u64 },
}

/// `/notifications`. Notifications are created by the backend, so the
/// create and update payloads are plain JSON.
#[derive(Debug, Clone)]
pub struct NotificationsApi {
    api: ResourceApi<NotificationItem, serde_json::Value, serde_json::Value, NotificationFilters>,
}

impl NotificationsApi {
    /// Path prefix.
    pub const RESOURCE: &'static str = "notifications";

    /// Create the API over a shared transport.
    pub fn new(transport: Transport) -> Self {
        Self {
            api: ResourceApi::new(transport, Self::RESOURCE),
        }
    }

    /// Number of unread notifications: `GET /notifications/unread-count`.
    pub async fn unread_count(&self) -> ApiResult<u64> {
        let count: UnreadCount = self.api.custom_get("unread-count").await?;
        Ok(match count {
            UnreadCount::Bare(n) | UnreadCount::Wrapped { count: n } => n,
        })
    }

    /// Mark one as read: `PATCH /notifications/{id}/read`.
    pub async fn mark_as_read(&self, id: i64) -> ApiResult<()> {
        let _: IgnoredAny = self
            .api
            .custom_patch(&format!("{}/read", id), &Map::new())
            .await?;
        Ok(())
    }

    /// Mark all as read: `PATCH /notifications/read-all`.
    pub async fn mark_all_as_read(&self) -> ApiResult<()> {
        let _: IgnoredAny = self.api.custom_patch("read-all", &Map::new()).await?;
        Ok(())
    }
}

impl std::ops::Deref for NotificationsApi {
    type Target =
        ResourceApi<NotificationItem, serde_json::Value, serde_json::Value, NotificationFilters>;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}
