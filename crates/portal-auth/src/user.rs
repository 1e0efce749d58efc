//! Session credential and signed-in user details.

use portal_rbac::{AccessSnapshot, RoleId};
use serde::{Deserialize, Serialize};

/// Bearer token plus refresh token for one session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredential {
    /// Token sent as `Authorization: Bearer <token>`.
    #[serde(alias = "token")]
    pub access_token: String,

    /// Token used to obtain a new access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl SessionCredential {
    /// Create a credential.
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

// Tokens never reach logs.
impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// The signed-in user as returned by login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// User ID.
    pub id: i64,

    /// Display name.
    #[serde(default)]
    pub full_name: String,

    /// Email address.
    #[serde(default)]
    pub email: String,

    /// Login name, when distinct from the email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Department the user belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,

    /// Coarse role ids.
    #[serde(default)]
    pub role_ids: Vec<RoleId>,

    /// Fine-grained permission codes.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl UserInfo {
    /// Permission/role snapshot for gating.
    pub fn access(&self) -> AccessSnapshot {
        AccessSnapshot::new(self.permissions.iter().cloned(), self.role_ids.iter().copied())
    }
}
