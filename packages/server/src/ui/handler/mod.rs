//! Request handlers.

mod http;
mod websocket;

pub use http::{health_check, send_email};
pub use websocket::websocket_handler;
