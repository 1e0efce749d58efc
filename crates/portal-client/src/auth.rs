//! Sign-in and session endpoints under `/auth`.

use chrono::{DateTime, Utc};
use portal_auth::{SessionCredential, UserInfo};
use portal_rbac::{AccessSnapshot, PermissionSet};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{ApiError, ApiResult};
use crate::transport::Transport;

/// Credentials for `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email or user name.
    pub email: String,
    /// Password.
    pub password: String,
}

impl LoginRequest {
    /// Create login credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Token pair.
    #[serde(flatten)]
    pub credential: SessionCredential,
    /// The signed-in user.
    #[serde(alias = "userInfo")]
    pub user: UserInfo,
    /// Access token expiry, when reported.
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

/// `/auth` endpoints bound to the transport's session.
#[derive(Debug, Clone)]
pub struct AuthApi {
    transport: Transport,
}

impl AuthApi {
    /// Create the API over a shared transport.
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Sign in and store the session.
    ///
    /// Returns the user's access snapshot for gating.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<AccessSnapshot> {
        let response: LoginResponse = self.transport.post("/auth/login", request).await?;

        self.transport
            .session()
            .begin(&response.credential, Some(&response.user))?;

        info!(user_id = response.user.id, "Signed in");
        Ok(response.user.access())
    }

    /// Sign out.
    ///
    /// The server is told best-effort; the local session is cleared even
    /// when that call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> ApiResult<()> {
        let session = self.transport.session();

        if session.is_authenticated() {
            let refresh_token = session.refresh_token();
            let body = RefreshRequest {
                refresh_token: refresh_token.as_deref(),
            };
            if let Err(e) = self
                .transport
                .post::<IgnoredAny, _>("/auth/logout", &body)
                .await
            {
                warn!(error = %e, "Server-side logout failed, clearing local session anyway");
            }
        }

        session.end()?;
        Ok(())
    }

    /// Exchange the refresh token for a new access token.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ApiResult<()> {
        let session = self.transport.session();
        let refresh_token = session
            .refresh_token()
            .ok_or_else(|| ApiError::InvalidRequest("no refresh token in session".to_string()))?;

        let credential: SessionCredential = self
            .transport
            .post(
                "/auth/refresh-token",
                &RefreshRequest {
                    refresh_token: Some(&refresh_token),
                },
            )
            .await?;

        session.rotate(&credential)?;
        Ok(())
    }

    /// The signed-in user: `GET /auth/me`.
    pub async fn current_user(&self) -> ApiResult<UserInfo> {
        self.transport.get("/auth/me").await
    }

    /// Permission codes of the signed-in user: `GET /auth/permissions`.
    pub async fn my_permissions(&self) -> ApiResult<PermissionSet> {
        self.transport.get("/auth/permissions").await
    }
}
