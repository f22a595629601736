//! Wire protocol for the matchmaking and session-relay endpoint.
//!
//! Every frame is a JSON object tagged by a `type` field. Inbound frames
//! ([`ClientMessage`]) drive the matchmaking queue and the active sessions;
//! outbound frames ([`ServerMessage`]) carry state back to one or both
//! participants. Payloads the server cannot understand never mutate state:
//! they are answered with a single `error` frame, classified by
//! [`parse_client_message`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A participant's fixed role within a session, determining turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// The other side of the same session.
    pub fn opposite(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::First => write!(f, "first"),
            Side::Second => write!(f, "second"),
        }
    }
}

/// Identifier of one two-participant session, e.g. `game-3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The complete authoritative game state at a point in time, as produced
/// and consumed by the rules engine. Opaque to everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(String);

impl Position {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Messages a client may send to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enter the matchmaking queue.
    JoinQueue,
    /// Leave the matchmaking queue.
    CancelQueue,
    /// Attempt an action in an active session. The action payload is opaque
    /// to the relay and handed to the rules engine as-is.
    #[serde(rename_all = "camelCase")]
    MakeMove {
        session_id: SessionId,
        action: serde_json::Value,
    },
    /// Leave an active session, forfeiting it.
    #[serde(rename_all = "camelCase")]
    LeaveGame { session_id: SessionId },
    /// Resume a previous session. Always answered with a not-implemented
    /// error; kept on the wire so clients get a stable answer.
    Reconnect,
}

/// Messages the server sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Info {
        message: String,
    },
    Error {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    QueueStatus {
        players_in_queue: usize,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    GameStart {
        game_id: SessionId,
        side: Side,
        position: Position,
        /// Display tokens of both participants, first side first.
        players: Vec<String>,
        message: String,
    },
    BoardUpdate {
        position: Position,
        message: String,
    },
    GameEnd {
        /// Omitted only on the "session not found" notice, where there is
        /// no position left to report.
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
        message: String,
    },
}

/// Why an inbound frame was rejected before reaching any handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Not a JSON object of the expected shape.
    #[error("Invalid message format.")]
    InvalidFormat,
    /// Valid JSON, but the `type` tag names no known command.
    #[error("Unknown command.")]
    UnknownCommand(String),
}

const KNOWN_COMMANDS: &[&str] = &[
    "join_queue",
    "cancel_queue",
    "make_move",
    "leave_game",
    "reconnect",
];

/// Parse one inbound text frame.
///
/// Distinguishes unparseable payloads from well-formed JSON carrying an
/// unrecognized command, so the two can be answered differently.
pub fn parse_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| ProtocolError::InvalidFormat)?;

    let kind = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or(ProtocolError::InvalidFormat)?;

    if !KNOWN_COMMANDS.contains(&kind) {
        return Err(ProtocolError::UnknownCommand(kind.to_string()));
    }

    serde_json::from_value(value).map_err(|_| ProtocolError::InvalidFormat)
}
