//! UseCase: a new connection was accepted.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Lobby, MessagePusher, PusherChannel, Token};

use super::deliver;

/// Registers a fresh connection: wires its outbound channel into the
/// pusher, assigns a display token, welcomes it, and broadcasts the queue
/// size to every open connection.
pub struct ConnectUseCase {
    lobby: Arc<Mutex<Lobby>>,
    pusher: Arc<dyn MessagePusher>,
}

impl ConnectUseCase {
    pub fn new(lobby: Arc<Mutex<Lobby>>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { lobby, pusher }
    }

    pub async fn execute(&self, connection: ConnectionId, sender: PusherChannel) -> Token {
        self.pusher.register_client(connection, sender).await;

        let (token, outbound) = {
            let mut lobby = self.lobby.lock().await;
            lobby.connect(connection)
        };

        deliver(self.pusher.as_ref(), outbound).await;
        token
    }
}
