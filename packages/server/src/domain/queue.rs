//! Matchmaking queue: an ordered waiting list of connections seeking an
//! opponent. Order determines pairing priority; earliest joined pairs first.

use std::collections::VecDeque;

use thiserror::Error;

use super::connection::{ConnectionId, Token};

/// One waiting connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub connection: ConnectionId,
    pub token: Token,
}

/// Errors surfaced to the client on queue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("You are already in the queue or in a game.")]
    AlreadyQueuedOrInGame,
    #[error("You were not in the queue.")]
    NotQueued,
}

/// FIFO queue of connections waiting for an opponent.
///
/// The queue itself only guards against double-queueing; the "not already
/// in a session" half of the exclusivity invariant is enforced by the
/// [`Lobby`](super::Lobby), which can see the session store.
#[derive(Debug, Default)]
pub struct MatchQueue {
    entries: VecDeque<QueueEntry>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, connection: &ConnectionId) -> bool {
        self.entries.iter().any(|e| e.connection == *connection)
    }

    /// Append a waiting connection. Callers must have checked exclusivity
    /// first; pushing a duplicate is a logic error guarded here anyway.
    pub fn push(&mut self, entry: QueueEntry) -> Result<(), QueueError> {
        if self.contains(&entry.connection) {
            return Err(QueueError::AlreadyQueuedOrInGame);
        }
        self.entries.push_back(entry);
        Ok(())
    }

    /// Remove a waiting connection, wherever it sits in the queue.
    pub fn remove(&mut self, connection: &ConnectionId) -> Result<(), QueueError> {
        let before = self.entries.len();
        self.entries.retain(|e| e.connection != *connection);
        if self.entries.len() == before {
            return Err(QueueError::NotQueued);
        }
        Ok(())
    }

    /// Pop the two chronologically earliest entries, if at least two wait.
    pub fn take_pair(&mut self) -> Option<(QueueEntry, QueueEntry)> {
        if self.entries.len() < 2 {
            return None;
        }
        let a = self.entries.pop_front()?;
        let b = self.entries.pop_front()?;
        Some((a, b))
    }

    /// Connections still waiting, in queue order.
    pub fn connections(&self) -> Vec<ConnectionId> {
        self.entries.iter().map(|e| e.connection).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
