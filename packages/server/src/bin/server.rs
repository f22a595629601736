//! Matchmaking and session-relay server for two-player turn-based games.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin arbiter-server
//! cargo run --bin arbiter-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use arbiter_server::{
    domain::{Lobby, MessagePusher, RulesEngine},
    infrastructure::{
        mailer::{LogMailer, Mailer},
        message_pusher::WebSocketMessagePusher,
        rules::ShakmatyRules,
    },
    ui::{Server, state::AppState},
    usecase::{
        CancelQueueUseCase, ConnectUseCase, DisconnectUseCase, JoinQueueUseCase, LeaveGameUseCase,
        MakeMoveUseCase,
    },
};
use arbiter_shared::logger::setup_logger;
use clap::Parser;
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "arbiter-server")]
#[command(about = "Matchmaking and game-session relay over WebSockets", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Wire dependencies in order: lobby, pusher, rules, mailer, use cases,
    // then the server itself.
    let lobby = Arc::new(Mutex::new(Lobby::new()));
    let pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());
    let rules: Arc<dyn RulesEngine> = Arc::new(ShakmatyRules::new());

    let contact_address =
        std::env::var("CONTACT_EMAIL").unwrap_or_else(|_| "contact@localhost".to_string());
    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new(contact_address));

    let state = Arc::new(AppState {
        connect_usecase: Arc::new(ConnectUseCase::new(lobby.clone(), pusher.clone())),
        disconnect_usecase: Arc::new(DisconnectUseCase::new(lobby.clone(), pusher.clone())),
        join_queue_usecase: Arc::new(JoinQueueUseCase::new(
            lobby.clone(),
            rules.clone(),
            pusher.clone(),
        )),
        cancel_queue_usecase: Arc::new(CancelQueueUseCase::new(lobby.clone(), pusher.clone())),
        make_move_usecase: Arc::new(MakeMoveUseCase::new(
            lobby.clone(),
            rules.clone(),
            pusher.clone(),
        )),
        leave_game_usecase: Arc::new(LeaveGameUseCase::new(lobby.clone(), pusher.clone())),
        mailer,
    });

    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
