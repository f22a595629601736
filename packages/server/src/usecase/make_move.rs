//! UseCase: a participant proposed an action in an active session.

use std::sync::Arc;

use arbiter_shared::protocol::SessionId;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Lobby, MessagePusher, RulesEngine};

use super::deliver;

/// Runs the session state machine for one proposed action: session,
/// participation, and turn checks, then the rules-engine verdict, then the
/// resulting broadcast (and terminal check) to both participants.
pub struct MakeMoveUseCase {
    lobby: Arc<Mutex<Lobby>>,
    rules: Arc<dyn RulesEngine>,
    pusher: Arc<dyn MessagePusher>,
}

impl MakeMoveUseCase {
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

    pub async fn execute(
        &self,
        connection: ConnectionId,
        session_id: SessionId,
        action: serde_json::Value,
    ) {
        let outbound = {
            let mut lobby = self.lobby.lock().await;
            lobby.make_move(connection, &session_id, &action, self.rules.as_ref())
        };

        deliver(self.pusher.as_ref(), outbound).await;
    }
}
