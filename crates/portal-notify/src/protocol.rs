//! JSON hub protocol framing.
//!
//! Every record is a JSON object terminated by the `0x1E` record
//! separator; one WebSocket frame may carry several records. After the
//! socket opens the client sends `{"protocol":"json","version":1}` and the
//! hub answers with an empty object or `{"error": "..."}`. Afterwards
//! records carry a numeric `type`: 1 invocation, 6 ping, 7 close.

use serde::Serialize;
use serde_json::Value;

use crate::error::{NotifyError, NotifyResult};

/// Record terminator.
pub const RECORD_SEPARATOR: char = '\u{1e}';

/// Hub method that delivers notifications.
pub const NOTIFICATION_TARGET: &str = "ReceiveNotification";

const INVOCATION: u64 = 1;
const PING: u64 = 6;
const CLOSE: u64 = 7;

/// One decoded hub record.
#[derive(Debug, Clone, PartialEq)]
pub enum HubMessage {
    /// Handshake response; `error` is set when the hub refused.
    Handshake {
        /// Refusal reason.
        error: Option<String>,
    },
    /// A server-to-client method call.
    Invocation {
        /// Method name.
        target: String,
        /// Call arguments.
        arguments: Vec<Value>,
    },
    /// Keep-alive.
    Ping,
    /// The hub is closing the connection.
    Close {
        /// Reason, when given.
        error: Option<String>,
        /// Whether the client may reconnect.
        allow_reconnect: bool,
    },
    /// A record type this client does not act on.
    Other(u64),
}

#[derive(Serialize)]
struct HandshakeRequest<'a> {
    protocol: &'a str,
    version: u32,
}

/// The opening handshake record.
pub fn handshake_request() -> String {
    frame(&HandshakeRequest {
        protocol: "json",
        version: 1,
    })
}

/// A ping record.
pub fn ping_record() -> String {
    frame(&serde_json::json!({ "type": PING }))
}

/// A close record.
pub fn close_record() -> String {
    frame(&serde_json::json!({ "type": CLOSE }))
}

fn frame<T: Serialize>(value: &T) -> String {
    // Serializing these fixed shapes cannot fail.
    let mut text = serde_json::to_string(value).unwrap_or_default();
    text.push(RECORD_SEPARATOR);
    text
}

/// Non-empty records in a frame.
pub fn split_records(text: &str) -> impl Iterator<Item = &str> {
    text.split(RECORD_SEPARATOR)
        .map(str::trim)
        .filter(|record| !record.is_empty())
}

/// Decode one record.
pub fn parse_record(record: &str) -> NotifyResult<HubMessage> {
    let value: Value = serde_json::from_str(record)?;
    let object = value
        .as_object()
        .ok_or_else(|| NotifyError::Protocol("record is not an object".to_string()))?;
    let error = object.get("error").and_then(Value::as_str).map(str::to_string);

    let Some(kind) = object.get("type") else {
        return Ok(HubMessage::Handshake { error });
    };
    let kind = kind
        .as_u64()
        .ok_or_else(|| NotifyError::Protocol("record type is not a number".to_string()))?;

    Ok(match kind {
        INVOCATION => HubMessage::Invocation {
            target: object
                .get("target")
                .and_then(Value::as_str)
                .ok_or_else(|| NotifyError::Protocol("invocation without target".to_string()))?
                .to_string(),
            arguments: match object.get("arguments") {
                Some(Value::Array(arguments)) => arguments.clone(),
                _ => Vec::new(),
            },
        },
        PING => HubMessage::Ping,
        CLOSE => HubMessage::Close {
            error,
            // Only an explicit `false` forbids reconnecting.
            allow_reconnect: object
                .get("allowReconnect")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        },
        other => HubMessage::Other(other),
    })
}
