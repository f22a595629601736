//! Axum surface: router, WebSocket and HTTP handlers, graceful shutdown.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, app};
