//! Transport behaviour against a mock portal backend.
//!
//! Covers bearer token attachment, envelope unwrapping, error
//! normalization (HTTP, rejected envelopes, timeouts, missing responses)
//! and the 401 logout path under concurrency.

use portal_auth::{MemorySessionStore, Session, SessionCredential, StorageKey, UserInfo};
use portal_client::{ApiError, ClientConfig, Department, PortalApi, Transport};
use portal_rbac::RoleId;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock backend plus a client bound to a fresh session.
struct TestFixture {
    server: MockServer,
    session: Arc<Session>,
    navigations: Arc<AtomicUsize>,
    api: PortalApi,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_timeout(5).await
    }

    async fn with_timeout(timeout_secs: u64) -> Self {
        let server = MockServer::start().await;
        let navigations = Arc::new(AtomicUsize::new(0));

        let counter = navigations.clone();
        let session = Arc::new(Session::new(
            Arc::new(MemorySessionStore::new()),
            Arc::new(move |path: &str| {
                assert_eq!(path, "/login");
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        ));

        let config = ClientConfig::new(format!("{}/api", server.uri())).with_timeout_secs(timeout_secs);
        let api = PortalApi::new(config, session.clone()).unwrap();

        Self {
            server,
            session,
            navigations,
            api,
        }
    }

    fn sign_in(&self, token: &str) {
        let user = UserInfo {
            id: 1,
            full_name: "Portal Admin".into(),
            email: "admin@uni.edu".into(),
            user_name: None,
            department_id: None,
            role_ids: vec![RoleId::ADMIN],
            permissions: vec!["DEPARTMENTS_VIEW".into()],
        };
        self.session
            .begin(&SessionCredential::new(token, Some("refresh-1".into())), Some(&user))
            .unwrap();
        self.session.set_profile(&json!({"avatar": "a.png"})).unwrap();
    }

    fn assert_session_cleared(&self) {
        for key in StorageKey::all() {
            assert_eq!(self.session.store().get(key).unwrap(), None, "{} left behind", key.as_str());
        }
    }
}

fn department_json(id: i64) -> serde_json::Value {
    json!({"id": id, "name": "Registrar", "description": null, "isActive": true})
}

#[tokio::test]
async fn test_bearer_token_attached_and_envelope_unwrapped() {
    let fixture = TestFixture::new().await;
    fixture.sign_in("token-1");

    Mock::given(method("GET"))
        .and(path("/api/departments/3"))
        .and(header("Authorization", "Bearer token-1"))
        .and(header_exists("X-Request-Id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "OK",
            "data": department_json(3),
            "errors": null
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let department: Department = fixture.api.departments().get_by_id(3).await.unwrap();
    assert_eq!(department.id, 3);
    assert_eq!(department.name, "Registrar");
    assert!(department.is_active);
}

#[tokio::test]
async fn test_anonymous_request_has_no_authorization_header() {
    let fixture = TestFixture::new().await;

    Mock::given(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/departments/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([department_json(1)])))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let departments = fixture.api.departments().active().await.unwrap();
    assert_eq!(departments.len(), 1);
}

#[tokio::test]
async fn test_envelope_without_data_is_returned_whole() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/reports/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Report ready"
        })))
        .mount(&fixture.server)
        .await;

    let body: serde_json::Value = fixture.api.transport().get("/reports/summary").await.unwrap();
    assert_eq!(body, json!({"success": true, "message": "Report ready"}));
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let fixture = TestFixture::new().await;

    Mock::given(method("DELETE"))
        .and(path("/api/departments/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&fixture.server)
        .await;

    fixture.api.departments().delete(9).await.unwrap();
    let value: serde_json::Value = fixture.api.transport().delete("/departments/9").await.unwrap();
    assert_eq!(value, serde_json::Value::Null);
}

#[tokio::test]
async fn test_rejected_envelope_becomes_error() {
    let fixture = TestFixture::new().await;

    Mock::given(method("POST"))
        .and(path("/api/departments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Department name already exists",
            "data": department_json(1),
            "errors": ["name"]
        })))
        .mount(&fixture.server)
        .await;

    let payload = portal_client::DepartmentPayload {
        name: "Registrar".into(),
        description: None,
        is_active: true,
    };
    let err = fixture.api.departments().create(&payload).await.unwrap_err();

    assert!(matches!(err, ApiError::Rejected { .. }));
    assert_eq!(err.status(), 200);
    assert_eq!(err.message(), "Department name already exists");
    assert_eq!(err.field_errors(), &["name".to_string()]);
}

#[tokio::test]
async fn test_http_error_uses_envelope_message_and_validation_errors() {
    let fixture = TestFixture::new().await;

    Mock::given(method("PUT"))
        .and(path("/api/departments/4"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "title": "One or more validation errors occurred.",
            "errors": {"Name": ["The Name field is required."]}
        })))
        .mount(&fixture.server)
        .await;

    let payload = portal_client::DepartmentPayload {
        name: String::new(),
        description: None,
        is_active: true,
    };
    let err = fixture.api.departments().update(4, &payload).await.unwrap_err();

    assert_eq!(err.status(), 400);
    assert_eq!(err.message(), "One or more validation errors occurred.");
    assert_eq!(err.field_errors(), &["Name: The Name field is required.".to_string()]);
}

#[tokio::test]
async fn test_server_error_without_body_uses_status_reason() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/departments/active"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&fixture.server)
        .await;

    let err = fixture.api.departments().active().await.unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(err.message(), "Internal Server Error");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_forbidden_without_message_gets_default() {
    let fixture = TestFixture::new().await;
    fixture.sign_in("token-1");

    Mock::given(method("DELETE"))
        .and(path("/api/users/5"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&fixture.server)
        .await;

    let err = fixture.api.users().delete(5).await.unwrap_err();
    assert!(err.is_forbidden());
    assert_eq!(err.message(), "You do not have permission to perform this action");

    // 403 does not end the session.
    assert!(fixture.session.is_authenticated());
    assert_eq!(fixture.navigations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_forbidden_keeps_server_message() {
    let fixture = TestFixture::new().await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/5"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"success": false, "message": "Cannot delete yourself"})),
        )
        .mount(&fixture.server)
        .await;

    let err = fixture.api.users().delete(5).await.unwrap_err();
    assert_eq!(err.message(), "Cannot delete yourself");
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_navigates() {
    let fixture = TestFixture::new().await;
    fixture.sign_in("token-1");

    Mock::given(method("GET"))
        .and(path("/api/complaints/1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&fixture.server)
        .await;

    let err = fixture.api.complaints().get_by_id(1).await.unwrap_err();
    assert!(err.is_unauthorized());
    fixture.assert_session_cleared();
    assert_eq!(fixture.navigations.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_unauthorized_navigates_once() {
    let fixture = TestFixture::new().await;
    fixture.sign_in("token-1");

    Mock::given(method("GET"))
        .and(path("/api/notifications/unread-count"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(50)))
        .mount(&fixture.server)
        .await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let notifications = fixture.api.notifications();
        handles.push(tokio::spawn(async move { notifications.unread_count().await }));
    }
    for handle in handles {
        let result = handle.await.unwrap();
        assert_eq!(result.unwrap_err().status(), 401);
    }

    fixture.assert_session_cleared();
    assert_eq!(fixture.navigations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stale_unauthorized_keeps_new_login() {
    let fixture = TestFixture::new().await;
    fixture.sign_in("old-token");

    Mock::given(method("GET"))
        .and(path("/api/departments/active"))
        .and(header("Authorization", "Bearer old-token"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(300)))
        .mount(&fixture.server)
        .await;

    let departments = fixture.api.departments();
    let pending = tokio::spawn(async move { departments.active().await });

    // Log in again while the old request is still in flight.
    tokio::time::sleep(Duration::from_millis(100)).await;
    fixture.sign_in("new-token");

    let err = pending.await.unwrap().unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(fixture.session.access_token().as_deref(), Some("new-token"));
    assert_eq!(fixture.navigations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_timeout_reports_408() {
    let fixture = TestFixture::with_timeout(1).await;

    Mock::given(method("GET"))
        .and(path("/api/departments/active"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&fixture.server)
        .await;

    let err = fixture.api.departments().active().await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout { timeout_secs: 1 }));
    assert_eq!(err.status(), 408);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_no_response_reports_status_zero() {
    // Reserve a port, then free it so nothing is listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let transport = Transport::new(
        ClientConfig::new(format!("http://127.0.0.1:{}/api", port)),
        Arc::new(Session::in_memory()),
    )
    .unwrap();

    let err = transport.get::<serde_json::Value>("/departments").await.unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }));
    assert_eq!(err.status(), 0);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_unexpected_shape_is_decode_error() {
    let fixture = TestFixture::new().await;

    Mock::given(method("GET"))
        .and(path("/api/departments/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": "nope"})))
        .mount(&fixture.server)
        .await;

    let err = fixture.api.departments().get_by_id(2).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}
