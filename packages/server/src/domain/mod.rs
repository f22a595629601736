//! Domain layer: connection bookkeeping, matchmaking queue, session store,
//! the lobby that ties them into one serialized unit, and the traits the
//! core depends on (`RulesEngine`, `MessagePusher`).

mod connection;
mod lobby;
mod pusher;
mod queue;
mod rules;
mod session;

pub use connection::{ConnectionId, ConnectionRegistry, Token};
pub use lobby::{ActionError, Lobby, Outbound};
pub use pusher::{MessagePushError, MessagePusher, PusherChannel};
pub use queue::{MatchQueue, QueueEntry, QueueError};
pub use rules::{AppliedAction, GameOutcome, OutcomeKind, RulesEngine, RulesError};
pub use session::{Participant, Session, SessionStore};

// Wire types double as domain vocabulary; the protocol is the contract.
pub use arbiter_shared::protocol::{Position, ServerMessage, SessionId, Side};

#[cfg(test)]
pub use rules::MockRulesEngine;
