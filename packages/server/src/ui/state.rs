//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::infrastructure::mailer::Mailer;
use crate::usecase::{
    CancelQueueUseCase, ConnectUseCase, DisconnectUseCase, JoinQueueUseCase, LeaveGameUseCase,
    MakeMoveUseCase,
};

pub struct AppState {
    pub connect_usecase: Arc<ConnectUseCase>,
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    pub join_queue_usecase: Arc<JoinQueueUseCase>,
    pub cancel_queue_usecase: Arc<CancelQueueUseCase>,
    pub make_move_usecase: Arc<MakeMoveUseCase>,
    pub leave_game_usecase: Arc<LeaveGameUseCase>,
    pub mailer: Arc<dyn Mailer>,
}
