//! The rules-engine boundary.
//!
//! The core never interprets game rules itself. It hands a position and a
//! proposed action to a [`RulesEngine`] and relays the verdict. Engine
//! calls are synchronous, non-suspending, and side-effect-free; they are
//! the only external call allowed inside the serialized event-handling
//! critical section.

use arbiter_shared::protocol::{Position, Side};
use thiserror::Error;

/// A proposed action the engine accepted, with the resulting position and
/// a human-readable description of what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAction {
    pub position: Position,
    pub description: String,
}

/// The kind of game-ending outcome, in reporting precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    DecisiveWin(Side),
    ForcedDraw,
    StalemateDraw,
    RepetitionDraw,
    InsufficientMaterialDraw,
}

/// A terminal condition reported by the engine, with display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    pub kind: OutcomeKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    /// The engine rejected the proposed action as illegal.
    #[error("illegal action")]
    IllegalAction,
    /// The engine failed unexpectedly. Converted at the boundary into a
    /// single-action rejection; never fatal to the session.
    #[error("rules engine failure: {0}")]
    Failed(String),
}

/// Narrow capability interface any concrete rules implementation must
/// satisfy. The core is written against this trait only.
#[cfg_attr(test, mockall::automock)]
pub trait RulesEngine: Send + Sync {
    /// The starting position for a fresh session.
    fn initial_position(&self) -> Position;

    /// Which side the authoritative position says must act next.
    fn turn(&self, position: &Position) -> Result<Side, RulesError>;

    /// Apply a proposed action to a position, returning the new position
    /// or rejecting the action.
    fn apply(
        &self,
        position: &Position,
        action: &serde_json::Value,
    ) -> Result<AppliedAction, RulesError>;

    /// Report the first matching terminal condition, if any, in precedence
    /// order: decisive win, forced draw, stalemate draw, repetition draw,
    /// insufficient-resources draw.
    fn terminal_status(&self, position: &Position) -> Result<Option<GameOutcome>, RulesError>;
}
