//! Shared vocabulary for the Arbiter matchmaking and session-relay service.
//!
//! Holds the wire protocol spoken over the WebSocket endpoint and the
//! logging setup used by every binary.

pub mod logger;
pub mod protocol;
