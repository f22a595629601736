//! Test doubles shared across unit tests.

use std::sync::Mutex;

use arbiter_shared::protocol::{Position, ServerMessage, Side};
use async_trait::async_trait;

use crate::domain::{
    AppliedAction, ConnectionId, GameOutcome, MessagePushError, MessagePusher, Outbound,
    OutcomeKind, PusherChannel, RulesEngine, RulesError,
};

/// Messages addressed to one connection, in emission order.
pub fn outbound_to(out: &[Outbound], target: ConnectionId) -> Vec<ServerMessage> {
    out.iter()
        .filter(|o| o.target == target)
        .map(|o| o.message.clone())
        .collect()
}

/// A deterministic counting game standing in for a real rules engine.
///
/// The position is a counter starting at "0". The side to act alternates
/// with parity (even counts are the first side's turn). The only legal
/// action is the JSON string `"advance"`, which increments the counter;
/// `"boom"` simulates an unexpected engine failure; anything else is
/// illegal. Reaching `limit` is a decisive win for whoever moved last.
pub struct ScriptedRules {
    limit: i64,
}

impl ScriptedRules {
    pub fn new() -> Self {
        Self::with_limit(1_000)
    }

    pub fn with_limit(limit: i64) -> Self {
        Self { limit }
    }

    fn count(position: &Position) -> Result<i64, RulesError> {
        position
            .as_str()
            .parse()
            .map_err(|_| RulesError::Failed(format!("bad position: {}", position.as_str())))
    }

    fn side_to_act(count: i64) -> Side {
        if count % 2 == 0 { Side::First } else { Side::Second }
    }
}

impl RulesEngine for ScriptedRules {
    fn initial_position(&self) -> Position {
        Position::new("0")
    }

    fn turn(&self, position: &Position) -> Result<Side, RulesError> {
        Ok(Self::side_to_act(Self::count(position)?))
    }

    fn apply(
        &self,
        position: &Position,
        action: &serde_json::Value,
    ) -> Result<AppliedAction, RulesError> {
        let count = Self::count(position)?;
        match action.as_str() {
            Some("advance") => Ok(AppliedAction {
                position: Position::new((count + 1).to_string()),
                description: format!("{} advanced to {}", Self::side_to_act(count), count + 1),
            }),
            Some("boom") => Err(RulesError::Failed("synthetic engine failure".to_string())),
            _ => Err(RulesError::IllegalAction),
        }
    }

    fn terminal_status(&self, position: &Position) -> Result<Option<GameOutcome>, RulesError> {
        let count = Self::count(position)?;
        if count < self.limit {
            return Ok(None);
        }
        let winner = Self::side_to_act(count - 1);
        Ok(Some(GameOutcome {
            kind: OutcomeKind::DecisiveWin(winner),
            description: format!("The {winner} side wins the count!"),
        }))
    }
}

/// A [`MessagePusher`] that records everything it is asked to deliver.
#[derive(Default)]
pub struct RecordingPusher {
    sent: Mutex<Vec<(ConnectionId, String)>>,
}

impl RecordingPusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed messages delivered to one connection, in delivery order.
    pub fn messages_for(&self, connection: ConnectionId) -> Vec<ServerMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(target, _)| *target == connection)
            .map(|(_, json)| serde_json::from_str(json).expect("recorded message should parse"))
            .collect()
    }

    pub fn delivery_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MessagePusher for RecordingPusher {
    async fn register_client(&self, _connection: ConnectionId, _sender: PusherChannel) {}

    async fn unregister_client(&self, _connection: &ConnectionId) {}

    async fn push_to(
        &self,
        connection: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        self.sent
            .lock()
            .unwrap()
            .push((*connection, content.to_string()));
        Ok(())
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) {
        let mut sent = self.sent.lock().unwrap();
        for target in targets {
            sent.push((target, content.to_string()));
        }
    }
}
