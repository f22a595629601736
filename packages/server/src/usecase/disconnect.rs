//! UseCase: a connection closed or errored.
//!
//! Socket errors take this exact path too; a faulty connection is treated
//! the same as a deliberate close.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Lobby, MessagePusher};

use super::deliver;

/// Cleans up after a departed connection: frees its queue slot, terminates
/// any session it was in (the survivor wins), and drops its channel.
pub struct DisconnectUseCase {
    lobby: Arc<Mutex<Lobby>>,
    pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUseCase {
    pub fn new(lobby: Arc<Mutex<Lobby>>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { lobby, pusher }
    }

    pub async fn execute(&self, connection: ConnectionId) {
        let outbound = {
            let mut lobby = self.lobby.lock().await;
            lobby.disconnect(connection)
        };

        deliver(self.pusher.as_ref(), outbound).await;
        self.pusher.unregister_client(&connection).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingPusher, ScriptedRules};
    use arbiter_shared::protocol::ServerMessage;

    #[tokio::test]
    async fn session_peer_is_told_they_won() {
        let lobby = Arc::new(Mutex::new(Lobby::new()));
        let pusher = Arc::new(RecordingPusher::new());
        let rules = ScriptedRules::new();

        let a = ConnectionId::new();
        let b = ConnectionId::new();
        {
            let mut guard = lobby.lock().await;
            guard.connect(a);
            guard.connect(b);
            guard.join_queue(a, &rules);
            guard.join_queue(b, &rules);
            assert_eq!(guard.session_count(), 1);
        }

        let usecase = DisconnectUseCase::new(lobby.clone(), pusher.clone());
        usecase.execute(a).await;

        assert_eq!(lobby.lock().await.session_count(), 0);
        let to_b = pusher.messages_for(b);
        let ends: Vec<&ServerMessage> = to_b
            .iter()
            .filter(|m| matches!(m, ServerMessage::GameEnd { .. }))
            .collect();
        assert_eq!(ends.len(), 1);
    }

    #[tokio::test]
    async fn queued_connection_is_removed_quietly() {
        let lobby = Arc::new(Mutex::new(Lobby::new()));
        let pusher = Arc::new(RecordingPusher::new());
        let rules = ScriptedRules::new();

        let a = ConnectionId::new();
        {
            let mut guard = lobby.lock().await;
            guard.connect(a);
            guard.join_queue(a, &rules);
        }

        DisconnectUseCase::new(lobby.clone(), pusher.clone())
            .execute(a)
            .await;

        let guard = lobby.lock().await;
        assert_eq!(guard.queue_len(), 0);
        assert!(!guard.is_queued(&a));
    }
}
