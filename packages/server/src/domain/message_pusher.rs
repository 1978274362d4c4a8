//! Outbound delivery abstraction.
//!
//! The domain only knows that a notification can be pushed to one connection
//! or fanned out to many. The WebSocket implementation lives in the
//! infrastructure layer.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, Notification};

/// Per-connection outbound queue (encoded frames).
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Delivers notifications to live connections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register the outbound queue of a connection
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Drop the outbound queue of a connection (no-op if unknown)
    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// Push a notification to one connection
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;

    /// Push a notification to every target.
    ///
    /// A failure for one target must not prevent delivery to the others.
    /// Returns the number of targets the notification was handed to.
    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        notification: &Notification,
    ) -> Result<usize, MessagePushError>;
}
