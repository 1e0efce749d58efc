//! HTTP transport for the portal backend.
//!
//! [`Transport`] is the single point of HTTP egress. It attaches the session
//! bearer token, applies the configured timeout, unwraps response envelopes
//! and folds every failure into [`ApiError`]. A 401 is reported to the
//! [`Session`], which decides whether the session ends.

use std::sync::Arc;

use portal_auth::Session;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn, Span};
use uuid::Uuid;

use crate::config::{ClientConfig, ConfigError};
use crate::envelope::{collect_errors, message_of, parse_body, Payload};
use crate::error::{ApiError, ApiResult, FORBIDDEN_MESSAGE, GENERIC_ERROR_MESSAGE};

/// Correlation header set on every request.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Shared HTTP transport. Cloning is cheap; clones share one connection pool.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    config: ClientConfig,
    session: Arc<Session>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.inner.config.base_url)
            .field("timeout_secs", &self.inner.config.timeout_secs)
            .finish()
    }
}

enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

impl RequestBody {
    fn json<B: Serialize + ?Sized>(body: &B) -> ApiResult<Self> {
        serde_json::to_value(body)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::InvalidRequest(format!("body is not serializable: {}", e)))
    }
}

impl Transport {
    /// Create a transport for `config` bound to `session`.
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                config,
                session,
            }),
        })
    }

    /// Create a transport configured from the environment.
    pub fn from_env(session: Arc<Session>) -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env(), session)
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Session the transport authenticates with.
    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    /// `GET path`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::GET, path, RequestBody::Empty).await
    }

    /// `POST path` with a JSON body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, RequestBody::json(body)?).await
    }

    /// `PUT path` with a JSON body.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, RequestBody::json(body)?).await
    }

    /// `PATCH path` with a JSON body.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, RequestBody::json(body)?).await
    }

    /// `DELETE path`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::DELETE, path, RequestBody::Empty).await
    }

    /// `DELETE path` with a JSON body.
    pub async fn delete_with_body<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::DELETE, path, RequestBody::json(body)?).await
    }

    /// `POST path` with a multipart form. reqwest sets the boundary header.
    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> ApiResult<T> {
        self.request(Method::POST, path, RequestBody::Multipart(form)).await
    }

    /// `GET path` expecting a binary body.
    pub async fn get_bytes(&self, path: &str) -> ApiResult<ExportedFile> {
        let response = self
            .send(Method::GET, path, RequestBody::Empty, Some("*/*"))
            .await?;

        let headers = response.headers();
        let content_type = header_string(headers, CONTENT_TYPE.as_str());
        let file_name = header_string(headers, CONTENT_DISPOSITION.as_str())
            .and_then(|value| file_name_from_disposition(&value));

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        debug!(size = bytes.len(), "Downloaded file");

        Ok(ExportedFile {
            bytes: bytes.to_vec(),
            content_type,
            file_name,
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> ApiResult<T> {
        let response = self.send(method, path, body, None).await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;

        let value = Payload::classify(parse_body(&bytes))
            .into_result(status)
            .map_err(|e| {
                warn!(path, status, message = %e, "Request rejected by server");
                e
            })?;

        serde_json::from_value(value).map_err(|e| {
            warn!(path, error = %e, "Unexpected response shape");
            ApiError::Decode(e.to_string())
        })
    }

    #[instrument(name = "portal_request", skip(self, body, accept), fields(request_id = tracing::field::Empty))]
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        accept: Option<&'static str>,
    ) -> ApiResult<reqwest::Response> {
        let url = self.inner.config.url(path);
        let token = self.inner.session.access_token();
        let request_id = Uuid::now_v7();
        Span::current().record("request_id", tracing::field::display(request_id));

        let mut request = self
            .inner
            .client
            .request(method, &url)
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if let Some(ref token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        debug!(authenticated = token.is_some(), "Sending request");

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .bytes()
            .await
            .map(|bytes| parse_body(&bytes))
            .unwrap_or(Value::Null);
        Err(self.status_error(status, &body, token.as_deref()))
    }

    fn transport_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            let timeout_secs = self.inner.config.timeout_secs;
            warn!(timeout_secs, "Request timed out");
            ApiError::Timeout { timeout_secs }
        } else {
            warn!(error = %error, "No response from server");
            ApiError::Network {
                message: error.to_string(),
            }
        }
    }

    fn status_error(&self, status: StatusCode, body: &Value, sent_token: Option<&str>) -> ApiError {
        let (message, errors) = match body {
            Value::Object(object) => (
                message_of(object),
                object.get("errors").map(collect_errors).unwrap_or_default(),
            ),
            Value::String(text) if is_plain_message(text) => (Some(text.trim().to_string()), Vec::new()),
            _ => (None, Vec::new()),
        };

        let message = match message {
            Some(message) => message,
            None if status == StatusCode::FORBIDDEN => FORBIDDEN_MESSAGE.to_string(),
            None => status
                .canonical_reason()
                .unwrap_or(GENERIC_ERROR_MESSAGE)
                .to_string(),
        };

        if status == StatusCode::UNAUTHORIZED {
            self.inner.session.handle_unauthorized(sent_token);
        } else {
            warn!(status = status.as_u16(), %message, "Request failed");
        }

        ApiError::Http {
            status: status.as_u16(),
            message,
            errors,
        }
    }
}

// Short text bodies are messages; HTML error pages are not.
fn is_plain_message(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && !text.starts_with('<') && text.len() <= 512
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// A binary download such as a spreadsheet export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    /// File contents.
    pub bytes: Vec<u8>,

    /// `Content-Type` reported by the server.
    pub content_type: Option<String>,

    /// File name from `Content-Disposition`, when present.
    pub file_name: Option<String>,
}

impl ExportedFile {
    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the download is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The server-provided file name, or `fallback`.
    pub fn file_name_or(&self, fallback: &str) -> String {
        self.file_name.clone().unwrap_or_else(|| fallback.to_string())
    }
}

/// Extract the file name from a `Content-Disposition` value.
///
/// `filename*` (RFC 5987) wins over `filename`.
pub fn file_name_from_disposition(value: &str) -> Option<String> {
    let mut plain = None;

    for part in value.split(';').map(str::trim) {
        let Some((key, raw)) = part.split_once('=') else {
            continue;
        };
        let raw = raw.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let encoded = raw.split_once("''").map(|(_, v)| v).unwrap_or(raw);
                let decoded = url::form_urlencoded::parse(encoded.as_bytes())
                    .next()
                    .map(|(name, _)| name.into_owned())
                    .filter(|name| !name.is_empty());
                if decoded.is_some() {
                    return decoded;
                }
            }
            "filename" => {
                let name = raw.trim_matches('"');
                if !name.is_empty() {
                    plain = Some(name.to_string());
                }
            }
            _ => {}
        }
    }

    plain
}
