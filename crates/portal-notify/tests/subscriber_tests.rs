//! Subscriber tests against a local WebSocket hub.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use portal_notify::{
    ConnectionState, Notification, NotificationSubscriber, NotifyConfig, NotifyError,
    ReconnectPolicy,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Notify};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_hdr_async, WebSocketStream};

type Ws = WebSocketStream<TcpStream>;

const NOTIFICATION_FRAME: &str = concat!(
    r#"{"type":1,"target":"ReceiveNotification","arguments":[{"id":42,"title":"New complaint","#,
    r#""message":"Complaint #42 was assigned to you","type":"complaint","isRead":false}]}"#,
    "\u{1e}"
);

#[derive(Debug, Clone, Default)]
struct Upgrade {
    authorization: Option<String>,
    query: Option<String>,
}

/// Local hub. Every accepted connection runs `serve` with its index.
struct TestHub {
    url: String,
    upgrades: Arc<Mutex<Vec<Upgrade>>>,
}

impl TestHub {
    async fn start<F, Fut>(reject_with: Option<StatusCode>, serve: F) -> Self
    where
        F: Fn(usize, Ws) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/hubs/notifications", listener.local_addr().unwrap());
        let upgrades = Arc::new(Mutex::new(Vec::new()));

        let seen = upgrades.clone();
        tokio::spawn(async move {
            let mut index = 0;
            while let Ok((tcp, _)) = listener.accept().await {
                let seen = seen.clone();
                let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    seen.lock().unwrap().push(Upgrade {
                        authorization: req
                            .headers()
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string),
                        query: req.uri().query().map(str::to_string),
                    });
                    match reject_with {
                        Some(status) => Err(Response::builder().status(status).body(None).unwrap()),
                        None => Ok(resp),
                    }
                };
                if let Ok(ws) = accept_hdr_async(tcp, callback).await {
                    tokio::spawn(serve(index, ws));
                }
                index += 1;
            }
        });

        Self { url, upgrades }
    }

    fn upgrades(&self) -> Vec<Upgrade> {
        self.upgrades.lock().unwrap().clone()
    }

    fn config(&self) -> NotifyConfig {
        NotifyConfig {
            hub_url: self.url.clone(),
            ping_interval_ms: 50,
            idle_timeout_ms: 5_000,
            connect_timeout_ms: 2_000,
            reconnect: ReconnectPolicy {
                delays_ms: vec![0, 50],
                max_attempts: Some(5),
            },
            channel_capacity: 16,
        }
    }
}

/// Read the client's handshake and answer it.
async fn handshake(ws: &mut Ws, reply: &str) {
    match ws.next().await {
        Some(Ok(Message::Text(text))) => assert!(text.contains(r#""protocol":"json""#)),
        other => panic!("expected handshake, got {:?}", other),
    }
    ws.send(Message::Text(reply.to_string())).await.unwrap();
}

/// Record every text frame until the client goes away.
async fn drain(ws: &mut Ws, received: &Mutex<Vec<String>>) {
    while let Some(Ok(message)) = ws.next().await {
        if let Message::Text(text) = message {
            received.lock().unwrap().push(text);
        }
    }
}

async fn eventually(check: impl Fn() -> bool) -> bool {
    for _ in 0..150 {
        if check() {
            return true;
        }
        sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_notifications_reach_handler_and_streams() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let inbox = received.clone();
    let hub = TestHub::start(None, move |_, mut ws| {
        let inbox = inbox.clone();
        async move {
            handshake(&mut ws, "{}\u{1e}").await;
            ws.send(Message::Text(NOTIFICATION_FRAME.to_string())).await.unwrap();
            drain(&mut ws, &inbox).await;
        }
    })
    .await;

    let subscriber = NotificationSubscriber::new(hub.config());
    let (tx, mut rx) = mpsc::unbounded_channel();
    subscriber.on_notification(move |n: Notification| {
        let _ = tx.send(n);
    });
    let mut stream = subscriber.subscribe();

    subscriber.start("tok-1").await.unwrap();
    assert!(subscriber.is_connection_active());
    assert_eq!(subscriber.connection_state(), ConnectionState::Connected);

    let handled = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    assert_eq!(handled.id, "42");
    assert_eq!(handled.title.as_deref(), Some("New complaint"));
    assert_eq!(handled.kind.as_deref(), Some("complaint"));

    let streamed = timeout(Duration::from_secs(2), stream.recv()).await.unwrap().unwrap();
    assert_eq!(streamed, handled);

    let upgrades = hub.upgrades();
    assert_eq!(upgrades.len(), 1);
    assert_eq!(upgrades[0].authorization.as_deref(), Some("Bearer tok-1"));
    assert_eq!(upgrades[0].query.as_deref(), Some("access_token=tok-1"));

    // Pings flow while connected.
    assert!(eventually(|| received.lock().unwrap().iter().any(|t| t.contains(r#""type":6"#))).await);

    subscriber.stop().await;
    assert_eq!(subscriber.connection_state(), ConnectionState::Disconnected);
    assert!(!subscriber.is_connection_active());
    assert!(eventually(|| received.lock().unwrap().iter().any(|t| t.contains(r#""type":7"#))).await);
}

#[tokio::test]
async fn test_rejected_upgrade_fails_start() {
    let hub = TestHub::start(Some(StatusCode::UNAUTHORIZED), |_, _| async {}).await;
    let subscriber = NotificationSubscriber::new(hub.config());

    let err = subscriber.start("expired").await.unwrap_err();

    assert!(matches!(err, NotifyError::Unauthorized { status: 401 }));
    assert!(err.is_unrecoverable());
    assert_eq!(subscriber.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_refused_handshake_fails_start() {
    let hub = TestHub::start(None, |_, mut ws| async move {
        handshake(&mut ws, "{\"error\":\"Requested protocol 'json' is not available.\"}\u{1e}").await;
    })
    .await;
    let subscriber = NotificationSubscriber::new(hub.config());

    let err = subscriber.start("tok").await.unwrap_err();

    assert!(matches!(err, NotifyError::Handshake(ref reason) if reason.contains("not available")));
    assert_eq!(subscriber.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_unreachable_hub_fails_start() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = NotifyConfig {
        hub_url: format!("ws://{}/hubs/notifications", addr),
        ..NotifyConfig::default()
    };
    let subscriber = NotificationSubscriber::new(config);

    let err = subscriber.start("tok").await.unwrap_err();
    assert_eq!(err.error_code(), "CONNECT_FAILED");
    assert_eq!(subscriber.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_reconnects_with_updated_token() {
    let release = Arc::new(Notify::new());
    let hold = release.clone();
    let hub = TestHub::start(None, move |index, mut ws| {
        let hold = hold.clone();
        async move {
            handshake(&mut ws, "{}\u{1e}").await;
            if index == 0 {
                hold.notified().await;
                return;
            }
            ws.send(Message::Text(NOTIFICATION_FRAME.to_string())).await.unwrap();
            drain(&mut ws, &Mutex::new(Vec::new())).await;
        }
    })
    .await;

    let subscriber = NotificationSubscriber::new(hub.config());
    let (tx, mut rx) = mpsc::unbounded_channel();
    subscriber.on_notification(move |n: Notification| {
        let _ = tx.send(n);
    });

    subscriber.start("tok-1").await.unwrap();
    subscriber.update_token("tok-2");
    release.notify_one();

    let handled = timeout(Duration::from_secs(3), rx.recv()).await.unwrap().unwrap();
    assert_eq!(handled.id, "42");
    assert_eq!(subscriber.connection_state(), ConnectionState::Connected);

    let upgrades = hub.upgrades();
    assert_eq!(upgrades.len(), 2);
    assert_eq!(upgrades[1].authorization.as_deref(), Some("Bearer tok-2"));

    subscriber.stop().await;
}

#[tokio::test]
async fn test_close_without_reconnect_ends_session() {
    let hub = TestHub::start(None, |_, mut ws| async move {
        handshake(&mut ws, "{}\u{1e}").await;
        ws.send(Message::Text(
            "{\"type\":7,\"error\":\"Session revoked\",\"allowReconnect\":false}\u{1e}".to_string(),
        ))
        .await
        .unwrap();
        drain(&mut ws, &Mutex::new(Vec::new())).await;
    })
    .await;
    let subscriber = NotificationSubscriber::new(hub.config());

    subscriber.start("tok").await.unwrap();

    assert!(eventually(|| subscriber.connection_state() == ConnectionState::Disconnected).await);
    sleep(Duration::from_millis(200)).await;
    assert_eq!(hub.upgrades().len(), 1);
    assert!(!subscriber.is_connection_active());
}

#[tokio::test]
async fn test_idle_connection_gives_up_when_attempts_exhausted() {
    let hub = TestHub::start(None, |_, mut ws| async move {
        handshake(&mut ws, "{}\u{1e}").await;
        drain(&mut ws, &Mutex::new(Vec::new())).await;
    })
    .await;
    let mut config = hub.config();
    config.idle_timeout_ms = 200;
    config.reconnect.max_attempts = Some(0);
    let subscriber = NotificationSubscriber::new(config);

    subscriber.start("tok").await.unwrap();
    assert_eq!(subscriber.connection_state(), ConnectionState::Connected);

    assert!(eventually(|| subscriber.connection_state() == ConnectionState::Disconnected).await);
    assert_eq!(hub.upgrades().len(), 1);
}

#[tokio::test]
async fn test_start_is_noop_when_connected_or_without_token() {
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = connections.clone();
    let hub = TestHub::start(None, move |_, mut ws| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move {
            handshake(&mut ws, "{}\u{1e}").await;
            drain(&mut ws, &Mutex::new(Vec::new())).await;
        }
    })
    .await;
    let subscriber = NotificationSubscriber::new(hub.config());

    subscriber.start("").await.unwrap();
    assert_eq!(subscriber.connection_state(), ConnectionState::Disconnected);

    subscriber.start("tok").await.unwrap();
    subscriber.start("tok").await.unwrap();
    assert_eq!(hub.upgrades().len(), 1);
    assert_eq!(connections.load(Ordering::SeqCst), 1);

    subscriber.stop().await;
    subscriber.stop().await;
    assert_eq!(subscriber.connection_state(), ConnectionState::Disconnected);

    // A stopped subscriber can start again.
    subscriber.start("tok").await.unwrap();
    assert!(subscriber.is_connection_active());
    assert_eq!(hub.upgrades().len(), 2);
    subscriber.stop().await;
}

#[tokio::test]
async fn test_concurrent_starts_open_one_connection() {
    let hub = TestHub::start(None, |_, mut ws| async move {
        handshake(&mut ws, "{}\u{1e}").await;
        drain(&mut ws, &Mutex::new(Vec::new())).await;
    })
    .await;
    let subscriber = NotificationSubscriber::new(hub.config());

    let (first, second) = tokio::join!(subscriber.start("tok"), subscriber.start("tok"));
    first.unwrap();
    second.unwrap();

    assert!(subscriber.is_connection_active());
    sleep(Duration::from_millis(100)).await;
    assert_eq!(hub.upgrades().len(), 1);

    subscriber.stop().await;
}

#[tokio::test]
async fn test_stop_while_reconnecting_cancels_retry() {
    let hub = TestHub::start(None, |_, mut ws| async move {
        handshake(&mut ws, "{}\u{1e}").await;
    })
    .await;
    let mut config = hub.config();
    config.reconnect = ReconnectPolicy {
        delays_ms: vec![5_000],
        max_attempts: None,
    };
    let subscriber = NotificationSubscriber::new(config);

    subscriber.start("tok").await.unwrap();
    assert!(eventually(|| subscriber.connection_state() == ConnectionState::Reconnecting).await);

    timeout(Duration::from_secs(1), subscriber.stop())
        .await
        .expect("stop waited for the reconnect delay");

    assert_eq!(subscriber.connection_state(), ConnectionState::Disconnected);
    assert!(!subscriber.is_connection_active());
    sleep(Duration::from_millis(200)).await;
    assert_eq!(hub.upgrades().len(), 1);
}
