//! UseCase: a participant explicitly left their session.

use std::sync::Arc;

use arbiter_shared::protocol::SessionId;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Lobby, MessagePusher};

use super::deliver;

/// Terminates a session on request: the opponent wins by forfeit, and the
/// leaver is always acknowledged, even when the session id names nothing.
pub struct LeaveGameUseCase {
    lobby: Arc<Mutex<Lobby>>,
    pusher: Arc<dyn MessagePusher>,
}

impl LeaveGameUseCase {
    pub fn new(lobby: Arc<Mutex<Lobby>>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { lobby, pusher }
    }

    pub async fn execute(&self, connection: ConnectionId, session_id: SessionId) {
        let outbound = {
            let mut lobby = self.lobby.lock().await;
            lobby.leave_game(connection, &session_id)
        };

        deliver(self.pusher.as_ref(), outbound).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingPusher, ScriptedRules};
    use arbiter_shared::protocol::ServerMessage;

    #[tokio::test]
    async fn opponent_wins_by_forfeit() {
        let lobby = Arc::new(Mutex::new(Lobby::new()));
        let pusher = Arc::new(RecordingPusher::new());
        let rules = ScriptedRules::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let id = {
            let mut guard = lobby.lock().await;
            guard.connect(a);
            guard.connect(b);
            guard.join_queue(a, &rules);
            guard.join_queue(b, &rules);
            guard.session_of(&a).unwrap().id().clone()
        };

        LeaveGameUseCase::new(lobby.clone(), pusher.clone())
            .execute(a, id.clone())
            .await;

        assert!(lobby.lock().await.session(&id).is_none());
        assert!(pusher.messages_for(b).iter().any(
            |m| matches!(m, ServerMessage::GameEnd { message, .. } if message.contains("forfeit"))
        ));
        assert!(pusher.messages_for(a).iter().any(
            |m| matches!(m, ServerMessage::Info { message } if message.contains("left the game"))
        ));
    }

    #[tokio::test]
    async fn leaving_a_nonexistent_session_only_acknowledges() {
        let lobby = Arc::new(Mutex::new(Lobby::new()));
        let pusher = Arc::new(RecordingPusher::new());
        let a = ConnectionId::new();
        lobby.lock().await.connect(a);

        LeaveGameUseCase::new(lobby.clone(), pusher.clone())
            .execute(a, SessionId::new("game-404"))
            .await;

        let messages = pusher.messages_for(a);
        assert_eq!(messages.len(), 1);
        assert!(matches!(&messages[0], ServerMessage::Info { .. }));
    }
}
