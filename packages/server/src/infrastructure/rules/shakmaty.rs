//! Chess rules engine backed by `shakmaty`.
//!
//! The adapter holds no state of its own. Everything it needs to judge a
//! position travels inside the opaque position string, encoded as JSON:
//! the current FEN plus the repetition keys (the first four FEN fields) of
//! every position seen since the start of the session, which makes the
//! threefold-repetition draw decidable from the position alone.
//!
//! Actions are `{ "from": "e2", "to": "e4", "promotion": "q"? }` objects,
//! converted to UCI and validated against the position.

use arbiter_shared::protocol::{Position, Side};
use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position as _};

use crate::domain::{AppliedAction, GameOutcome, OutcomeKind, RulesEngine, RulesError};

#[derive(Debug, Serialize, Deserialize)]
struct EncodedPosition {
    fen: String,
    history: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MoveAction {
    from: String,
    to: String,
    #[serde(default)]
    promotion: Option<String>,
}

#[derive(Debug, Default)]
pub struct ShakmatyRules;

impl ShakmatyRules {
    pub fn new() -> Self {
        Self
    }

    fn decode(position: &Position) -> Result<(Chess, Vec<String>), RulesError> {
        let encoded: EncodedPosition = serde_json::from_str(position.as_str())
            .map_err(|e| RulesError::Failed(format!("undecodable position: {e}")))?;
        let fen: Fen = encoded
            .fen
            .parse()
            .map_err(|e| RulesError::Failed(format!("bad FEN in position: {e}")))?;
        let board = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::Failed(format!("unplayable position: {e}")))?;
        Ok((board, encoded.history))
    }

    fn encode(board: &Chess, history: Vec<String>) -> Result<Position, RulesError> {
        let encoded = EncodedPosition {
            fen: Self::fen_of(board),
            history,
        };
        serde_json::to_string(&encoded)
            .map(Position::new)
            .map_err(|e| RulesError::Failed(format!("unencodable position: {e}")))
    }

    fn fen_of(board: &Chess) -> String {
        Fen(board.clone().into_setup(EnPassantMode::Legal)).to_string()
    }

    /// Board occupancy, side to move, castling rights, and en-passant
    /// square; the fields that must coincide for a repetition.
    fn repetition_key(fen: &str) -> String {
        fen.split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn side_of(color: Color) -> Side {
        match color {
            Color::White => Side::First,
            Color::Black => Side::Second,
        }
    }

    fn color_name(color: Color) -> &'static str {
        match color {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl RulesEngine for ShakmatyRules {
    fn initial_position(&self) -> Position {
        let board = Chess::default();
        let fen = Self::fen_of(&board);
        let history = vec![Self::repetition_key(&fen)];
        // The default chess position always encodes.
        Self::encode(&board, history)
            .unwrap_or_else(|_| Position::new(r#"{"fen":"","history":[]}"#))
    }

    fn turn(&self, position: &Position) -> Result<Side, RulesError> {
        let (board, _) = Self::decode(position)?;
        Ok(Self::side_of(board.turn()))
    }

    fn apply(
        &self,
        position: &Position,
        action: &serde_json::Value,
    ) -> Result<AppliedAction, RulesError> {
        let (board, mut history) = Self::decode(position)?;

        let action: MoveAction =
            serde_json::from_value(action.clone()).map_err(|_| RulesError::IllegalAction)?;
        let uci_text = format!(
            "{}{}{}",
            action.from,
            action.to,
            action.promotion.as_deref().unwrap_or("")
        );
        let uci: UciMove = uci_text.parse().map_err(|_| RulesError::IllegalAction)?;
        let chess_move = uci.to_move(&board).map_err(|_| RulesError::IllegalAction)?;

        let mover = board.turn();
        let board = board
            .play(&chess_move)
            .map_err(|_| RulesError::IllegalAction)?;

        let fen = Self::fen_of(&board);
        history.push(Self::repetition_key(&fen));
        let description = format!(
            "{} moved {}",
            Self::color_name(mover),
            chess_move.to_uci(CastlingMode::Standard)
        );

        Ok(AppliedAction {
            position: Self::encode(&board, history)?,
            description,
        })
    }

    fn terminal_status(&self, position: &Position) -> Result<Option<GameOutcome>, RulesError> {
        let (board, history) = Self::decode(position)?;

        if board.is_checkmate() {
            let winner = !board.turn();
            return Ok(Some(GameOutcome {
                kind: OutcomeKind::DecisiveWin(Self::side_of(winner)),
                description: format!("Checkmate! {} wins!", Self::color_name(winner)),
            }));
        }

        if board.halfmoves() >= 100 {
            return Ok(Some(GameOutcome {
                kind: OutcomeKind::ForcedDraw,
                description: "Draw by the fifty-move rule!".to_string(),
            }));
        }

        if board.is_stalemate() {
            return Ok(Some(GameOutcome {
                kind: OutcomeKind::StalemateDraw,
                description: "Stalemate! It's a draw!".to_string(),
            }));
        }

        let key = Self::repetition_key(&Self::fen_of(&board));
        if history.iter().filter(|k| **k == key).count() >= 3 {
            return Ok(Some(GameOutcome {
                kind: OutcomeKind::RepetitionDraw,
                description: "Draw by threefold repetition!".to_string(),
            }));
        }

        if board.is_insufficient_material() {
            return Ok(Some(GameOutcome {
                kind: OutcomeKind::InsufficientMaterialDraw,
                description: "Draw by insufficient material!".to_string(),
            }));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action(from: &str, to: &str) -> serde_json::Value {
        json!({ "from": from, "to": to })
    }

    fn fen_of(position: &Position) -> String {
        let encoded: EncodedPosition = serde_json::from_str(position.as_str()).unwrap();
        encoded.fen
    }

    /// Play a sequence of moves from the initial position.
    fn play(moves: &[(&str, &str)]) -> Position {
        let rules = ShakmatyRules::new();
        let mut position = rules.initial_position();
        for (from, to) in moves {
            position = rules
                .apply(&position, &action(from, to))
                .unwrap_or_else(|e| panic!("move {from}{to} should be legal: {e}"))
                .position;
        }
        position
    }

    #[test]
    fn initial_position_is_the_standard_setup() {
        let rules = ShakmatyRules::new();
        let position = rules.initial_position();

        assert_eq!(
            fen_of(&position),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
        assert_eq!(rules.turn(&position).unwrap(), Side::First);
        assert_eq!(rules.terminal_status(&position).unwrap(), None);
    }

    #[test]
    fn a_legal_opening_move_is_applied_and_described() {
        let rules = ShakmatyRules::new();
        let position = rules.initial_position();

        let applied = rules.apply(&position, &action("e2", "e4")).unwrap();

        assert_eq!(applied.description, "White moved e2e4");
        assert!(fen_of(&applied.position).contains(" b "));
        assert_eq!(rules.turn(&applied.position).unwrap(), Side::Second);
        // The original position is untouched.
        assert_eq!(rules.turn(&position).unwrap(), Side::First);
    }

    #[test]
    fn illegal_moves_are_rejected() {
        let rules = ShakmatyRules::new();
        let position = rules.initial_position();

        assert_eq!(
            rules.apply(&position, &action("e2", "e5")),
            Err(RulesError::IllegalAction)
        );
        // Moving the opponent's piece out of turn is just as illegal.
        assert_eq!(
            rules.apply(&position, &action("e7", "e5")),
            Err(RulesError::IllegalAction)
        );
    }

    #[test]
    fn malformed_actions_are_rejected_without_failing() {
        let rules = ShakmatyRules::new();
        let position = rules.initial_position();

        assert_eq!(
            rules.apply(&position, &json!({ "from": "e2" })),
            Err(RulesError::IllegalAction)
        );
        assert_eq!(
            rules.apply(&position, &json!("e2e4")),
            Err(RulesError::IllegalAction)
        );
        assert_eq!(
            rules.apply(&position, &json!({ "from": "zz", "to": "e4" })),
            Err(RulesError::IllegalAction)
        );
    }

    #[test]
    fn fools_mate_is_a_decisive_win_for_black() {
        let rules = ShakmatyRules::new();
        let position = play(&[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")]);

        let outcome = rules.terminal_status(&position).unwrap().unwrap();
        assert_eq!(outcome.kind, OutcomeKind::DecisiveWin(Side::Second));
        assert_eq!(outcome.description, "Checkmate! Black wins!");
    }

    #[test]
    fn stalemate_is_reported_as_a_draw() {
        let rules = ShakmatyRules::new();
        let fen = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";
        let position = Position::new(
            serde_json::to_string(&EncodedPosition {
                fen: fen.to_string(),
                history: vec![ShakmatyRules::repetition_key(fen)],
            })
            .unwrap(),
        );

        let outcome = rules.terminal_status(&position).unwrap().unwrap();
        assert_eq!(outcome.kind, OutcomeKind::StalemateDraw);
    }

    #[test]
    fn knight_shuffle_reaches_threefold_repetition() {
        let rules = ShakmatyRules::new();
        let shuffle = [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")];
        let mut moves = Vec::new();
        moves.extend_from_slice(&shuffle);
        moves.extend_from_slice(&shuffle);

        let position = play(&moves);

        let outcome = rules.terminal_status(&position).unwrap().unwrap();
        assert_eq!(outcome.kind, OutcomeKind::RepetitionDraw);
    }

    #[test]
    fn corrupt_positions_fail_instead_of_panicking() {
        let rules = ShakmatyRules::new();
        let position = Position::new("not a position at all");

        assert!(matches!(rules.turn(&position), Err(RulesError::Failed(_))));
        assert!(matches!(
            rules.apply(&position, &action("e2", "e4")),
            Err(RulesError::Failed(_))
        ));
    }
}
