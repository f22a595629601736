//! Sessions and the session store.
//!
//! A session is one ongoing two-participant game instance with its own
//! authoritative position. It is created only by successful pairing,
//! mutated only by accepted actions, and destroyed on a terminal game
//! condition, an explicit leave, or a participant disconnecting.

use std::collections::HashMap;

use arbiter_shared::protocol::{Position, SessionId, Side};

use super::connection::{ConnectionId, Token};

/// One of the two members of a session. The side is fixed for the
/// session's lifetime once assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection: ConnectionId,
    pub token: Token,
    pub side: Side,
}

/// An isolated authoritative game instance between exactly two participants.
///
/// Side assignment is a bijection onto {first, second} by construction:
/// the only constructor takes one participant per side.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    participants: [Participant; 2],
    position: Position,
}

impl Session {
    fn new(
        id: SessionId,
        first: (ConnectionId, Token),
        second: (ConnectionId, Token),
        position: Position,
    ) -> Self {
        Self {
            id,
            participants: [
                Participant {
                    connection: first.0,
                    token: first.1,
                    side: Side::First,
                },
                Participant {
                    connection: second.0,
                    token: second.1,
                    side: Side::Second,
                },
            ],
            position,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Replace the authoritative position with one accepted by the rules
    /// engine.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn participants(&self) -> &[Participant; 2] {
        &self.participants
    }

    pub fn participant(&self, connection: &ConnectionId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.connection == *connection)
    }

    /// The participant on the other end of the session, if `connection` is
    /// a participant at all.
    pub fn opponent_of(&self, connection: &ConnectionId) -> Option<&Participant> {
        match self.participant(connection) {
            Some(me) => self.participants.iter().find(|p| p.side != me.side),
            None => None,
        }
    }

    pub fn contains(&self, connection: &ConnectionId) -> bool {
        self.participant(connection).is_some()
    }

    /// Display tokens of both participants, first side first.
    pub fn player_tokens(&self) -> Vec<String> {
        self.participants
            .iter()
            .map(|p| p.token.to_string())
            .collect()
    }
}

/// Owns every active session, reachable by id and by participant.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
    next_id: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh monotonic id and store a new session.
    pub fn create(
        &mut self,
        first: (ConnectionId, Token),
        second: (ConnectionId, Token),
        position: Position,
    ) -> &Session {
        self.next_id += 1;
        let id = SessionId::new(format!("game-{}", self.next_id));
        let session = Session::new(id.clone(), first, second, position);
        self.sessions.entry(id).or_insert(session)
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    pub fn remove(&mut self, id: &SessionId) -> Option<Session> {
        self.sessions.remove(id)
    }

    /// Linear scan; fine at the scale of an in-process lobby.
    pub fn find_by_connection(&self, connection: &ConnectionId) -> Option<&Session> {
        self.sessions.values().find(|s| s.contains(connection))
    }

    /// Ids of every session this connection participates in. Expected to be
    /// at most one, but disconnect cleanup sweeps all of them.
    pub fn sessions_of(&self, connection: &ConnectionId) -> Vec<SessionId> {
        self.sessions
            .values()
            .filter(|s| s.contains(connection))
            .map(|s| s.id().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
