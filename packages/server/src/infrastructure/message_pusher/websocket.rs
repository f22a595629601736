//! WebSocket-backed message delivery.
//!
//! Socket creation happens in the UI layer; this implementation only keeps
//! the per-connection `UnboundedSender` halves and writes into them. A
//! sender whose receive side is gone (connection mid-teardown) is treated
//! the same as an unknown connection: skipped on broadcast, reported on a
//! direct push.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

pub struct WebSocketMessagePusher {
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection, sender);
        tracing::debug!(%connection, "connection registered with pusher");
    }

    async fn unregister_client(&self, connection: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection);
        tracing::debug!(%connection, "connection unregistered from pusher");
    }

    async fn push_to(
        &self,
        connection: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let Some(sender) = clients.get(connection) else {
            return Err(MessagePushError::ClientNotFound(connection.to_string()));
        };
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!(%connection, "pushed message");
        Ok(())
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) {
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(&target) {
                Some(sender) => {
                    if let Err(e) = sender.send(content.to_string()) {
                        tracing::warn!(connection = %target, error = %e, "broadcast send failed, skipping");
                    }
                }
                None => {
                    tracing::warn!(connection = %target, "connection gone during broadcast, skipping");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn push_to_delivers_to_the_registered_channel() {
        let pusher = WebSocketMessagePusher::new();
        let connection = ConnectionId::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(connection, tx).await;

        pusher.push_to(&connection, "hello").await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn push_to_unknown_connection_reports_not_found() {
        let pusher = WebSocketMessagePusher::new();
        let connection = ConnectionId::new();

        let result = pusher.push_to(&connection, "hello").await;

        assert!(matches!(result, Err(MessagePushError::ClientNotFound(_))));
    }

    #[tokio::test]
    async fn push_to_dropped_receiver_reports_failure() {
        let pusher = WebSocketMessagePusher::new();
        let connection = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        pusher.register_client(connection, tx).await;

        let result = pusher.push_to(&connection, "hello").await;

        assert!(matches!(result, Err(MessagePushError::PushFailed(_))));
    }

    #[tokio::test]
    async fn broadcast_skips_missing_connections() {
        let pusher = WebSocketMessagePusher::new();
        let present = ConnectionId::new();
        let missing = ConnectionId::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(present, tx).await;

        pusher.broadcast(vec![missing, present], "update").await;

        assert_eq!(rx.recv().await.unwrap(), "update");
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let pusher = WebSocketMessagePusher::new();
        let connection = ConnectionId::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register_client(connection, tx).await;

        pusher.unregister_client(&connection).await;
        pusher.unregister_client(&connection).await;

        assert!(pusher.push_to(&connection, "x").await.is_err());
    }
}
