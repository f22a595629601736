//! Use cases: one struct per inbound event.
//!
//! Every use case owns the shared [`Lobby`](crate::domain::Lobby) behind a
//! single mutex plus the collaborators it needs. Handling an event locks
//! the lobby exactly once, computes the state change and its outbox, then
//! delivers the outbox after the lock is released. That lock is the
//! serialization point the whole service relies on: no two events observe
//! or mutate shared state concurrently.

mod cancel_queue;
mod connect;
mod disconnect;
mod join_queue;
mod leave_game;
mod make_move;

pub use cancel_queue::CancelQueueUseCase;
pub use connect::ConnectUseCase;
pub use disconnect::DisconnectUseCase;
pub use join_queue::JoinQueueUseCase;
pub use leave_game::LeaveGameUseCase;
pub use make_move::MakeMoveUseCase;

use crate::domain::{MessagePusher, Outbound};

/// Fire-and-forget delivery of an outbox. Failures affect only the target
/// connection and are logged, never propagated.
pub(crate) async fn deliver(pusher: &dyn MessagePusher, outbound: Vec<Outbound>) {
    for Outbound { target, message } in outbound {
        match serde_json::to_string(&message) {
            Ok(json) => {
                if let Err(e) = pusher.push_to(&target, &json).await {
                    tracing::warn!(connection = %target, error = %e, "skipping undeliverable message");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize outbound message");
            }
        }
    }
}
