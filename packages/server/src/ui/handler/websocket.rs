//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use arbiter_shared::protocol::{ClientMessage, ServerMessage, parse_client_message};

use crate::{
    domain::{ConnectionId, PusherChannel},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Identity is assigned server-side; any upgrade is accepted.
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains the connection's outbound channel into its
/// WebSocket sink. All pushes to this client, from whichever event
/// produced them, funnel through here.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Answers a frame the dispatcher rejected, straight down this
/// connection's own channel.
fn push_error(tx: &PusherChannel, message: &str) {
    let frame = ServerMessage::Error {
        message: message.to_string(),
    };
    match serde_json::to_string(&frame) {
        Ok(json) => {
            // A send failure means the connection is tearing down.
            let _ = tx.send(json);
        }
        Err(e) => {
            tracing::error!("Failed to serialize error frame: {}", e);
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection = ConnectionId::new();
    let (tx, rx) = mpsc::unbounded_channel();

    let token = state.connect_usecase.execute(connection, tx.clone()).await;
    tracing::info!(%connection, token = %token, "connection established");

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!(%connection, "WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match parse_client_message(&text) {
                    Ok(ClientMessage::JoinQueue) => {
                        state_clone.join_queue_usecase.execute(connection).await;
                    }
                    Ok(ClientMessage::CancelQueue) => {
                        state_clone.cancel_queue_usecase.execute(connection).await;
                    }
                    Ok(ClientMessage::MakeMove { session_id, action }) => {
                        state_clone
                            .make_move_usecase
                            .execute(connection, session_id, action)
                            .await;
                    }
                    Ok(ClientMessage::LeaveGame { session_id }) => {
                        state_clone
                            .leave_game_usecase
                            .execute(connection, session_id)
                            .await;
                    }
                    Ok(ClientMessage::Reconnect) => {
                        push_error(
                            &tx,
                            "Reconnect functionality not fully implemented. Please rejoin the queue.",
                        );
                    }
                    Err(e) => {
                        tracing::warn!(%connection, "rejected inbound frame: {}", e);
                        push_error(&tx, &e.to_string());
                    }
                },
                Message::Ping(_) => {
                    // Answered automatically by the protocol layer.
                    tracing::debug!(%connection, "received ping");
                }
                Message::Close(_) => {
                    tracing::info!(%connection, "client requested close");
                    break;
                }
                _ => {}
            }
        }
    });

    // If either half finishes, tear down the other.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.disconnect_usecase.execute(connection).await;
    tracing::info!(%connection, "connection closed");
}
