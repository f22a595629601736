//! Connection identity and registry.

use std::collections::HashMap;

use uuid::Uuid;

/// Process-unique handle for one live WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display token assigned to a connection at accept time.
///
/// Used only for display and bookkeeping, never for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn generate() -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        Self(format!("player-{}", &raw[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tracks every live connection and the token assigned to it.
///
/// Pure bookkeeping; no business logic lives here.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    tokens: HashMap<ConnectionId, Token>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a fresh token to a connection. Re-registering an already
    /// known connection keeps its existing token.
    pub fn register(&mut self, connection: ConnectionId) -> Token {
        self.tokens
            .entry(connection)
            .or_insert_with(Token::generate)
            .clone()
    }

    /// Remove all trace of a connection. Safe to call for connections that
    /// were never registered.
    pub fn unregister(&mut self, connection: &ConnectionId) {
        self.tokens.remove(connection);
    }

    pub fn token_of(&self, connection: &ConnectionId) -> Option<&Token> {
        self.tokens.get(connection)
    }

    /// All currently registered connections, in no particular order.
    pub fn connections(&self) -> Vec<ConnectionId> {
        self.tokens.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
