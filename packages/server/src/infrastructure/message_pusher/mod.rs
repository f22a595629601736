//! Concrete [`MessagePusher`](crate::domain::MessagePusher) implementations.

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
