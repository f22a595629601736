//! The lobby: every piece of process-wide mutable state, composed into one
//! unit so that event handling is a single critical section.
//!
//! Each inbound event (message, close, error) maps to one method here.
//! Methods mutate state synchronously and return an *outbox* of
//! `(target, message)` pairs; callers deliver the outbox after releasing
//! the lock. The only external call made inside a method is the rules
//! engine, which is synchronous and side-effect-free by contract.

use arbiter_shared::protocol::{Position, ServerMessage, SessionId, Side};
use rand::Rng;
use thiserror::Error;

use super::connection::{ConnectionId, ConnectionRegistry, Token};
use super::queue::{MatchQueue, QueueEntry, QueueError};
use super::rules::{RulesEngine, RulesError};
use super::session::{Session, SessionStore};

/// One message addressed to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub target: ConnectionId,
    pub message: ServerMessage,
}

impl Outbound {
    fn new(target: ConnectionId, message: ServerMessage) -> Self {
        Self { target, message }
    }
}

/// Why an action attempt was rejected. The display text is what the
/// originating client sees in the `error` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Error: Game not found or already ended.")]
    SessionNotFound,
    #[error("You are not participating in this game.")]
    NotAParticipant,
    #[error("It's not your turn.")]
    WrongTurn,
    #[error("Illegal action.")]
    IllegalAction,
    #[error("An error occurred while processing your action.")]
    EngineFailure,
}

impl ActionError {
    /// Note attached to the corrective `board_update` that re-pushes the
    /// authoritative position after a rejection.
    fn restore_note(self) -> &'static str {
        match self {
            ActionError::SessionNotFound => "Game not found. Please return to the lobby.",
            ActionError::NotAParticipant => "You are not part of this game. Board restored.",
            ActionError::WrongTurn => "Not your turn. Board restored.",
            ActionError::IllegalAction => "Illegal action. Please try again.",
            ActionError::EngineFailure => "Internal error while applying the action.",
        }
    }
}

/// Process-wide state: connection registry, matchmaking queue, session
/// store. Mutated only through the methods below, which the use-case layer
/// serializes behind a single mutex.
#[derive(Debug, Default)]
pub struct Lobby {
    registry: ConnectionRegistry,
    queue: MatchQueue,
    sessions: SessionStore,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- connection lifecycle ----------------------------------------

    /// A connection was accepted: assign a token, welcome it, and tell
    /// every open connection the current queue size.
    pub fn connect(&mut self, connection: ConnectionId) -> (Token, Vec<Outbound>) {
        let token = self.registry.register(connection);
        tracing::info!(%connection, %token, "connection registered");

        let mut out = vec![Outbound::new(
            connection,
            ServerMessage::Info {
                message: "Welcome! Connected to the game server.".to_string(),
            },
        )];
        out.extend(self.queue_status(self.registry.connections(), "Queue updated."));
        (token, out)
    }

    /// A connection closed or errored: drop its queue slot, terminate any
    /// session it participated in (notifying the survivor), and forget it.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Vec<Outbound> {
        let mut out = Vec::new();

        let _ = self.queue.remove(&connection);

        for session_id in self.sessions.sessions_of(&connection) {
            if let Some(session) = self.sessions.remove(&session_id) {
                tracing::info!(%connection, session = %session_id, "session terminated by disconnect");
                out.extend(Self::forfeit_notice(
                    &session,
                    &connection,
                    "disconnected. You win!",
                ));
            }
        }

        self.registry.unregister(&connection);
        tracing::info!(%connection, "connection unregistered");

        out.extend(self.queue_status(self.registry.connections(), "Queue updated."));
        out
    }

    // ---- matchmaking queue -------------------------------------------

    /// Handle `join_queue`: enforce queue exclusivity, append, broadcast
    /// the new queue size, then pair as many couples as possible.
    pub fn join_queue(
        &mut self,
        connection: ConnectionId,
        rules: &dyn RulesEngine,
    ) -> Vec<Outbound> {
        if self.queue.contains(&connection) || self.sessions.find_by_connection(&connection).is_some()
        {
            tracing::warn!(%connection, "join_queue rejected: already queued or in game");
            return vec![Self::error(connection, QueueError::AlreadyQueuedOrInGame)];
        }

        let token = match self.registry.token_of(&connection) {
            Some(token) => token.clone(),
            // A connection we never saw connect; register it on the fly.
            None => self.registry.register(connection),
        };

        if let Err(e) = self.queue.push(QueueEntry { connection, token }) {
            return vec![Self::error(connection, e)];
        }
        tracing::info!(%connection, waiting = self.queue.len(), "connection queued");

        let mut out = vec![Outbound::new(
            connection,
            ServerMessage::Info {
                message: "You are in the queue. Waiting for an opponent...".to_string(),
            },
        )];
        out.extend(self.queue_status(self.queue.connections(), "Queue updated."));
        out.extend(self.try_match_all(rules));
        out
    }

    /// Handle `cancel_queue`.
    pub fn cancel_queue(&mut self, connection: ConnectionId) -> Vec<Outbound> {
        if let Err(e) = self.queue.remove(&connection) {
            tracing::warn!(%connection, "cancel_queue rejected: not queued");
            return vec![Self::error(connection, e)];
        }
        tracing::info!(%connection, waiting = self.queue.len(), "connection left the queue");

        let mut out = vec![Outbound::new(
            connection,
            ServerMessage::Info {
                message: "You have left the queue.".to_string(),
            },
        )];
        out.extend(self.queue_status(self.queue.connections(), "Queue updated."));
        out
    }

    /// Pair the two earliest waiting connections while at least two remain,
    /// creating one session per pair, then report the queue size to whoever
    /// is left. Sides are assigned uniformly at random so join order never
    /// determines side advantage.
    fn try_match_all(&mut self, rules: &dyn RulesEngine) -> Vec<Outbound> {
        let mut out = Vec::new();

        while let Some((a, b)) = self.queue.take_pair() {
            let (first, second) = if rand::thread_rng().gen_bool(0.5) {
                (a, b)
            } else {
                (b, a)
            };

            let position = rules.initial_position();
            let session = self.sessions.create(
                (first.connection, first.token.clone()),
                (second.connection, second.token.clone()),
                position.clone(),
            );
            let session_id = session.id().clone();
            let players = session.player_tokens();
            tracing::info!(
                session = %session_id,
                first = %first.token,
                second = %second.token,
                "session started"
            );

            out.push(Outbound::new(
                first.connection,
                ServerMessage::GameStart {
                    game_id: session_id.clone(),
                    side: Side::First,
                    position: position.clone(),
                    players: players.clone(),
                    message: "Game started! You play first. It's your turn.".to_string(),
                },
            ));
            out.push(Outbound::new(
                second.connection,
                ServerMessage::GameStart {
                    game_id: session_id,
                    side: Side::Second,
                    position,
                    players,
                    message: "Game started! You play second. Waiting for your opponent's move."
                        .to_string(),
                },
            ));
        }

        out.extend(self.queue_status(self.queue.connections(), "Still waiting for an opponent..."));
        out
    }

    // ---- session state machine ---------------------------------------

    /// Handle `make_move`: validate session, participation, and turn, then
    /// delegate to the rules engine and apply its verdict.
    pub fn make_move(
        &mut self,
        connection: ConnectionId,
        session_id: &SessionId,
        action: &serde_json::Value,
        rules: &dyn RulesEngine,
    ) -> Vec<Outbound> {
        let (position, side) = match self.sessions.get(session_id) {
            None => {
                tracing::warn!(%connection, session = %session_id, "move on unknown session");
                return vec![
                    Self::error(connection, ActionError::SessionNotFound),
                    Outbound::new(
                        connection,
                        ServerMessage::GameEnd {
                            position: None,
                            message: ActionError::SessionNotFound.restore_note().to_string(),
                        },
                    ),
                ];
            }
            Some(session) => match session.participant(&connection) {
                None => {
                    let position = session.position().clone();
                    return Self::reject(connection, ActionError::NotAParticipant, position);
                }
                Some(participant) => (session.position().clone(), participant.side),
            },
        };

        match rules.turn(&position) {
            Ok(turn) if turn == side => {}
            Ok(_) => return Self::reject(connection, ActionError::WrongTurn, position),
            Err(e) => {
                tracing::error!(%connection, error = %e, "rules engine failed reporting the turn");
                return Self::reject(connection, ActionError::EngineFailure, position);
            }
        }

        let applied = match rules.apply(&position, action) {
            Ok(applied) => applied,
            Err(RulesError::IllegalAction) => {
                return Self::reject(connection, ActionError::IllegalAction, position);
            }
            Err(RulesError::Failed(reason)) => {
                tracing::error!(%connection, %reason, "rules engine failed applying an action");
                return Self::reject(connection, ActionError::EngineFailure, position);
            }
        };

        let Some(session) = self.sessions.get_mut(session_id) else {
            // The session vanished mid-handling; treat as unknown.
            return vec![Self::error(connection, ActionError::SessionNotFound)];
        };
        session.set_position(applied.position.clone());
        let targets: Vec<ConnectionId> =
            session.participants().iter().map(|p| p.connection).collect();

        let mut out: Vec<Outbound> = targets
            .iter()
            .map(|&target| {
                Outbound::new(
                    target,
                    ServerMessage::BoardUpdate {
                        position: applied.position.clone(),
                        message: applied.description.clone(),
                    },
                )
            })
            .collect();

        match rules.terminal_status(&applied.position) {
            Ok(Some(outcome)) => {
                tracing::info!(session = %session_id, outcome = %outcome.description, "session ended");
                for &target in &targets {
                    out.push(Outbound::new(
                        target,
                        ServerMessage::GameEnd {
                            position: Some(applied.position.clone()),
                            message: outcome.description.clone(),
                        },
                    ));
                }
                self.sessions.remove(session_id);
            }
            Ok(None) => {}
            Err(e) => {
                // The action itself stood; the session stays active.
                tracing::error!(session = %session_id, error = %e, "terminal check failed");
            }
        }

        out
    }

    /// Handle `leave_game`: forfeit in favor of the opponent if the session
    /// exists and the originator is in it; always acknowledge the leaver.
    pub fn leave_game(&mut self, connection: ConnectionId, session_id: &SessionId) -> Vec<Outbound> {
        let mut out = Vec::new();

        let is_participant = self
            .sessions
            .get(session_id)
            .is_some_and(|s| s.contains(&connection));
        if is_participant {
            if let Some(session) = self.sessions.remove(session_id) {
                tracing::info!(%connection, session = %session_id, "session terminated by leave");
                out.extend(Self::forfeit_notice(
                    &session,
                    &connection,
                    "left the game. You win by forfeit!",
                ));
            }
        }

        out.push(Outbound::new(
            connection,
            ServerMessage::Info {
                message: "You have left the game.".to_string(),
            },
        ));
        out
    }

    // ---- read access (handlers, tests) -------------------------------

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_queued(&self, connection: &ConnectionId) -> bool {
        self.queue.contains(connection)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn session_of(&self, connection: &ConnectionId) -> Option<&Session> {
        self.sessions.find_by_connection(connection)
    }

    // ---- helpers ------------------------------------------------------

    /// `game_end` notice to the opponent of `leaver`, carrying the final
    /// position. Empty if the leaver had no opponent in this session.
    fn forfeit_notice(
        session: &Session,
        leaver: &ConnectionId,
        reason: &str,
    ) -> Vec<Outbound> {
        let Some(opponent) = session.opponent_of(leaver) else {
            return Vec::new();
        };
        let leaver_token = session
            .participant(leaver)
            .map(|p| p.token.to_string())
            .unwrap_or_default();
        vec![Outbound::new(
            opponent.connection,
            ServerMessage::GameEnd {
                position: Some(session.position().clone()),
                message: format!("Your opponent ({leaver_token}) {reason}"),
            },
        )]
    }

    fn queue_status(&self, targets: Vec<ConnectionId>, message: &str) -> Vec<Outbound> {
        let players_in_queue = self.queue.len();
        targets
            .into_iter()
            .map(|target| {
                Outbound::new(
                    target,
                    ServerMessage::QueueStatus {
                        players_in_queue,
                        message: message.to_string(),
                    },
                )
            })
            .collect()
    }

    fn error(target: ConnectionId, error: impl std::fmt::Display) -> Outbound {
        Outbound::new(
            target,
            ServerMessage::Error {
                message: error.to_string(),
            },
        )
    }

    /// Rejection of a single action: one `error` frame plus a corrective
    /// `board_update` re-pushing the authoritative position.
    fn reject(connection: ConnectionId, error: ActionError, position: Position) -> Vec<Outbound> {
        tracing::warn!(%connection, %error, "action rejected");
        vec![
            Self::error(connection, error),
            Outbound::new(
                connection,
                ServerMessage::BoardUpdate {
                    position,
                    message: error.restore_note().to_string(),
                },
            ),
        ]
    }
}
