//! UseCase: a connection asked to leave the matchmaking queue.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Lobby, MessagePusher};

use super::deliver;

pub struct CancelQueueUseCase {
    lobby: Arc<Mutex<Lobby>>,
    pusher: Arc<dyn MessagePusher>,
}

impl CancelQueueUseCase {
    pub fn new(lobby: Arc<Mutex<Lobby>>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { lobby, pusher }
    }

    pub async fn execute(&self, connection: ConnectionId) {
        let outbound = {
            let mut lobby = self.lobby.lock().await;
            lobby.cancel_queue(connection)
        };

        deliver(self.pusher.as_ref(), outbound).await;
    }
}
