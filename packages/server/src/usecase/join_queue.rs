//! UseCase: a connection asked to enter the matchmaking queue.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Lobby, MessagePusher, RulesEngine};

use super::deliver;

/// Enqueues a connection and immediately pairs as many waiting couples as
/// possible, creating one session per pair.
pub struct JoinQueueUseCase {
    lobby: Arc<Mutex<Lobby>>,
    rules: Arc<dyn RulesEngine>,
    pusher: Arc<dyn MessagePusher>,
}

impl JoinQueueUseCase {
    pub fn new(
        lobby: Arc<Mutex<Lobby>>,
        rules: Arc<dyn RulesEngine>,
        pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            lobby,
            rules,
            pusher,
        }
    }

    pub async fn execute(&self, connection: ConnectionId) {
        let outbound = {
            let mut lobby = self.lobby.lock().await;
            lobby.join_queue(connection, self.rules.as_ref())
        };

        deliver(self.pusher.as_ref(), outbound).await;
    }
}
