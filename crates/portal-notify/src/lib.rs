//! # Portal Notify
//!
//! Real-time notification subscriber for the campus request portal.
//!
//! ## Overview
//!
//! The portal-notify crate handles:
//! - **Connection**: a WebSocket to the hub at `/hubs/notifications`,
//!   authenticated with the session's access token
//! - **Protocol**: the JSON hub handshake, pings, and `ReceiveNotification`
//!   invocations
//! - **Reconnects**: delays of 0 s, 2 s, 10 s, then 30 s between attempts,
//!   stopping on rejected credentials
//! - **Delivery**: one replaceable handler plus any number of independent
//!   [`NotificationStream`]s
//!
//! ## Usage
//!
//! ```rust,no_run
//! use portal_notify::{Notification, NotificationSubscriber, NotifyConfig};
//!
//! # async fn example(token: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let config = NotifyConfig::from_api_base_url("https://portal.uni.edu/api")?;
//! let subscriber = NotificationSubscriber::new(config);
//!
//! subscriber.on_notification(|n: Notification| {
//!     println!("{}", n.message);
//! });
//! subscriber.start(token).await?;
//!
//! // On logout
//! subscriber.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Integration
//!
//! - `portal-auth`: the access token passed to `start` and `update_token`
//! - `portal-client`: notification list and read-state endpoints

pub mod config;
pub mod error;
pub mod protocol;
pub mod reconnect;
pub mod subscriber;
pub mod types;

// Re-export main types
pub use config::{hub_url_for, NotifyConfig, HUB_PATH};
pub use error::{NotifyError, NotifyResult};
pub use reconnect::{delay_for_attempt, ReconnectPolicy, DEFAULT_RECONNECT_DELAYS_MS};
pub use subscriber::{NotificationHandler, NotificationStream, NotificationSubscriber};
pub use types::{ConnectionState, Notification};
