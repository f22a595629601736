//! Matchmaking and session-relay server.
//!
//! Pairs waiting connections two at a time, runs one authoritative session
//! per pair, enforces turn order before consulting the rules engine, and
//! relays resulting state to both participants.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

#[cfg(test)]
pub(crate) mod testing;
