//! Outbound message delivery boundary.
//!
//! The lobby computes which connection gets which message; a
//! [`MessagePusher`] implementation actually delivers. Delivery is
//! fire-and-forget: a closed or unknown target is skipped, never an error
//! that fails the whole operation.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::connection::ConnectionId;

/// Sender half of a connection's outbound channel.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ClientNotFound(String),
    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// Delivers serialized server messages to live connections.
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Associate a connection with its outbound channel.
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel);

    /// Drop a connection's outbound channel. Idempotent.
    async fn unregister_client(&self, connection: &ConnectionId);

    /// Push to a single connection. Errors are reported so callers can log
    /// them, but they must never escalate past the affected connection.
    async fn push_to(&self, connection: &ConnectionId, content: &str)
    -> Result<(), MessagePushError>;

    /// Push to many connections, silently skipping any that are gone.
    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str);
}
