//! The notification subscriber.
//!
//! One [`NotificationSubscriber`] owns at most one hub connection. `start`
//! opens it and returns once the handshake completed; a background task
//! then reads records, pings the hub, and reconnects on loss according to
//! the [`ReconnectPolicy`](crate::reconnect::ReconnectPolicy). Rejected
//! credentials and `allowReconnect: false` close records end the session
//! instead of retrying.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, sleep_until, timeout, Instant};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::NotifyConfig;
use crate::error::{NotifyError, NotifyResult};
use crate::protocol::{self, HubMessage, NOTIFICATION_TARGET};
use crate::types::{ConnectionState, Notification};

type HubStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Receives pushed notifications.
///
/// Any `Fn(Notification)` closure is a handler.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    /// Handle one notification.
    async fn handle(&self, notification: Notification);
}

#[async_trait]
impl<F> NotificationHandler for F
where
    F: Fn(Notification) + Send + Sync,
{
    async fn handle(&self, notification: Notification) {
        self(notification)
    }
}

/// Independent stream of every pushed notification.
pub struct NotificationStream {
    /// Stream ID.
    pub id: String,
    receiver: broadcast::Receiver<Notification>,
}

impl NotificationStream {
    /// Next notification. Notifications missed by a slow reader are skipped.
    pub async fn recv(&mut self) -> NotifyResult<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) => return Ok(notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(stream_id = %self.id, skipped, "Notification stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(NotifyError::ChannelClosed),
            }
        }
    }
}

struct Running {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

struct Shared {
    config: NotifyConfig,
    state: RwLock<ConnectionState>,
    connected: AtomicBool,
    token: RwLock<Option<String>>,
    handler: RwLock<Option<Arc<dyn NotificationHandler>>>,
    fanout: broadcast::Sender<Notification>,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
        self.connected
            .store(state == ConnectionState::Connected, Ordering::SeqCst);
        debug!(%state, "Hub connection state changed");
    }

    fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_token(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    async fn dispatch(&self, target: &str, arguments: Vec<Value>) {
        if !target.eq_ignore_ascii_case(NOTIFICATION_TARGET) {
            debug!(target, "Ignoring hub invocation");
            return;
        }
        let Some(payload) = arguments.into_iter().next() else {
            warn!("Notification invocation without payload");
            return;
        };
        let notification: Notification = match serde_json::from_value(payload) {
            Ok(notification) => notification,
            Err(e) => {
                warn!(error = %e, "Malformed notification payload");
                return;
            }
        };

        debug!(notification_id = %notification.id, "Notification received");

        // No receivers is not an error.
        let _ = self.fanout.send(notification.clone());

        let handler = self
            .handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(handler) = handler {
            handler.handle(notification).await;
        }
    }
}

/// Real-time notification subscriber.
pub struct NotificationSubscriber {
    shared: Arc<Shared>,
    start_lock: tokio::sync::Mutex<()>,
    running: Mutex<Option<Running>>,
}

impl std::fmt::Debug for NotificationSubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSubscriber")
            .field("hub_url", &self.shared.config.hub_url)
            .field("state", &self.shared.state())
            .finish()
    }
}

impl NotificationSubscriber {
    /// Create a disconnected subscriber.
    pub fn new(config: NotifyConfig) -> Self {
        let (fanout, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                config,
                state: RwLock::new(ConnectionState::Disconnected),
                connected: AtomicBool::new(false),
                token: RwLock::new(None),
                handler: RwLock::new(None),
                fanout,
            }),
            start_lock: tokio::sync::Mutex::new(()),
            running: Mutex::new(None),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &NotifyConfig {
        &self.shared.config
    }

    /// Connect with `token`.
    ///
    /// Does nothing when the token is blank or a connection is already
    /// open or being (re)established. Errors opening the first connection
    /// are returned; later losses are handled by reconnecting.
    #[instrument(skip(self, token), fields(hub = %self.shared.config.hub_url))]
    pub async fn start(&self, token: &str) -> NotifyResult<()> {
        let _guard = self.start_lock.lock().await;

        if token.trim().is_empty() {
            debug!("No token, not connecting");
            return Ok(());
        }
        let state = self.shared.state();
        if state != ConnectionState::Disconnected {
            debug!(%state, "Already started");
            return Ok(());
        }

        self.shared.set_token(token);
        self.shared.set_state(ConnectionState::Connecting);

        let stream = match connect(&self.shared).await {
            Ok(stream) => stream,
            Err(e) => {
                self.shared.set_state(ConnectionState::Disconnected);
                warn!(error = %e, code = e.error_code(), "Failed to connect to notification hub");
                return Err(e);
            }
        };

        self.shared.set_state(ConnectionState::Connected);
        info!("Connected to notification hub");

        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(self.shared.clone(), stream, shutdown_rx));
        let previous = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Running { shutdown, handle });
        if let Some(previous) = previous {
            previous.handle.abort();
        }

        Ok(())
    }

    /// Close the connection and stop reconnecting. Safe to call repeatedly.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        let _guard = self.start_lock.lock().await;

        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(Running { shutdown, mut handle }) = running {
            let _ = shutdown.send(true);
            let grace = self.shared.config.connect_timeout();
            if timeout(grace, &mut handle).await.is_err() {
                warn!("Hub connection did not close in time, aborting");
                handle.abort();
            }
            info!("Disconnected from notification hub");
        }

        self.shared.set_state(ConnectionState::Disconnected);
    }

    /// Replace the token used for future reconnects.
    pub fn update_token(&self, token: &str) {
        self.shared.set_token(token);
    }

    /// Register the handler for pushed notifications, replacing any previous one.
    pub fn on_notification<H>(&self, handler: H)
    where
        H: NotificationHandler + 'static,
    {
        *self
            .shared
            .handler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
    }

    /// Remove the handler.
    pub fn off_notification(&self) {
        *self
            .shared
            .handler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Open an independent stream of notifications.
    pub fn subscribe(&self) -> NotificationStream {
        NotificationStream {
            id: Uuid::now_v7().to_string(),
            receiver: self.shared.fanout.subscribe(),
        }
    }

    /// Whether the connection is up and reported as connected.
    pub fn is_connection_active(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
            && self.shared.state() == ConnectionState::Connected
    }

    /// Reported connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.shared.state()
    }
}

impl Drop for NotificationSubscriber {
    fn drop(&mut self) {
        let running = self
            .running
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(running) = running {
            let _ = running.shutdown.send(true);
        }
    }
}

/// Why a connection ended.
enum Ended {
    Shutdown,
    Lost(String),
    Rejected(String),
}

async fn run(shared: Arc<Shared>, mut stream: HubStream, mut shutdown: watch::Receiver<bool>) {
    loop {
        match pump(&shared, &mut stream, &mut shutdown).await {
            Ended::Shutdown => return,
            Ended::Rejected(reason) => {
                warn!(%reason, "Hub closed the connection permanently");
                shared.set_state(ConnectionState::Disconnected);
                return;
            }
            Ended::Lost(reason) => {
                warn!(%reason, "Hub connection lost, reconnecting");
                shared.set_state(ConnectionState::Reconnecting);
            }
        }

        match reconnect(&shared, &mut shutdown).await {
            Some(next) => stream = next,
            None => return,
        }
    }
}

/// Retry until connected. `None` when stopped, rejected or out of attempts.
async fn reconnect(shared: &Shared, shutdown: &mut watch::Receiver<bool>) -> Option<HubStream> {
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let Some(delay) = shared.config.reconnect.delay_for(attempt) else {
            warn!(attempts = attempt - 1, "Giving up reconnecting to notification hub");
            shared.set_state(ConnectionState::Disconnected);
            return None;
        };

        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown.changed() => return None,
        }

        let result = tokio::select! {
            result = connect(shared) => result,
            _ = shutdown.changed() => return None,
        };

        match result {
            Ok(stream) => {
                shared.set_state(ConnectionState::Connected);
                info!(attempt, "Reconnected to notification hub");
                return Some(stream);
            }
            Err(e) if e.is_unrecoverable() => {
                warn!(error = %e, "Reconnect rejected, stopping");
                shared.set_state(ConnectionState::Disconnected);
                return None;
            }
            Err(e) => {
                debug!(attempt, error = %e, "Reconnect attempt failed");
            }
        }
    }
}

/// Serve one open connection until it ends.
async fn pump(shared: &Shared, stream: &mut HubStream, shutdown: &mut watch::Receiver<bool>) -> Ended {
    let ping_every = shared.config.ping_interval();
    let idle = shared.config.idle_timeout();
    let mut ping = interval_at(Instant::now() + ping_every, ping_every);
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                let _ = stream.send(Message::Text(protocol::close_record())).await;
                let _ = stream.close(None).await;
                return Ended::Shutdown;
            }
            _ = ping.tick() => {
                if let Err(e) = stream.send(Message::Text(protocol::ping_record())).await {
                    return Ended::Lost(e.to_string());
                }
            }
            _ = sleep_until(last_seen + idle) => {
                return Ended::Lost(format!("no traffic for {}ms", idle.as_millis()));
            }
            frame = stream.next() => {
                last_seen = Instant::now();
                match frame {
                    None => return Ended::Lost("connection closed".to_string()),
                    Some(Err(e)) => return Ended::Lost(e.to_string()),
                    Some(Ok(Message::Close(_))) => return Ended::Lost("closed by hub".to_string()),
                    Some(Ok(Message::Text(text))) => {
                        if let Some(ended) = handle_text(shared, &text).await {
                            return ended;
                        }
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

async fn handle_text(shared: &Shared, text: &str) -> Option<Ended> {
    for record in protocol::split_records(text) {
        match protocol::parse_record(record) {
            Ok(HubMessage::Invocation { target, arguments }) => {
                shared.dispatch(&target, arguments).await;
            }
            Ok(HubMessage::Close {
                error,
                allow_reconnect,
            }) => {
                let reason = error.unwrap_or_else(|| "closed by hub".to_string());
                return Some(if allow_reconnect {
                    Ended::Lost(reason)
                } else {
                    Ended::Rejected(reason)
                });
            }
            Ok(HubMessage::Ping) | Ok(HubMessage::Handshake { .. }) | Ok(HubMessage::Other(_)) => {}
            Err(e) => warn!(error = %e, "Skipping unreadable hub record"),
        }
    }
    None
}

/// Open the socket and complete the hub handshake.
async fn connect(shared: &Shared) -> NotifyResult<HubStream> {
    let token = shared.token().ok_or(NotifyError::MissingToken)?;
    let url = shared.config.connection_url(&token)?;

    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|e| NotifyError::InvalidUrl(e.to_string()))?;
    let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| NotifyError::Connect(format!("invalid token: {}", e)))?;
    request.headers_mut().insert(AUTHORIZATION, bearer);

    let limit = shared.config.connect_timeout();
    let mut stream = match timeout(limit, connect_async(request)).await {
        Err(_) => return Err(NotifyError::Timeout),
        Ok(Err(WsError::Http(response))) => {
            let status = response.status().as_u16();
            return Err(match status {
                401 | 403 => NotifyError::Unauthorized { status },
                _ => NotifyError::Connect(format!("hub answered HTTP {}", status)),
            });
        }
        Ok(Err(e)) => return Err(NotifyError::Connect(e.to_string())),
        Ok(Ok((stream, _))) => stream,
    };

    stream
        .send(Message::Text(protocol::handshake_request()))
        .await
        .map_err(|e| NotifyError::Connect(e.to_string()))?;

    timeout(limit, read_handshake(&mut stream))
        .await
        .map_err(|_| NotifyError::Timeout)??;

    Ok(stream)
}

async fn read_handshake(stream: &mut HubStream) -> NotifyResult<()> {
    while let Some(frame) = stream.next().await {
        let text = match frame.map_err(|e| NotifyError::Connect(e.to_string()))? {
            Message::Text(text) => text,
            Message::Close(frame) => {
                return Err(NotifyError::Closed(frame.map(|f| f.reason.to_string())));
            }
            _ => continue,
        };

        let Some(record) = protocol::split_records(&text).next() else {
            continue;
        };
        return match protocol::parse_record(record)? {
            HubMessage::Handshake { error: None } => Ok(()),
            HubMessage::Handshake { error: Some(error) } => Err(NotifyError::Handshake(error)),
            other => Err(NotifyError::Protocol(format!(
                "expected handshake response, got {:?}",
                other
            ))),
        };
    }

    Err(NotifyError::Closed(None))
}
