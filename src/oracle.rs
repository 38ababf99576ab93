//! Game-state classification: checkmate, stalemate, 50-move draw, and
//! insufficient-material draw. Kept separate from `Board::status`, which
//! only distinguishes ongoing/checkmate/stalemate, since the rest of the
//! engine (search, TT probing) wants that cheaper three-way split on its
//! hot path and doesn't want every node paying for a material scan.

use crate::board::{insufficient_material, Board, BoardStatus};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Ongoing,
    Checkmate,
    Stalemate,
    Draw50,
    DrawInsufficientMaterial,
}

impl GameState {
    pub fn is_game_over(self) -> bool {
        !matches!(self, GameState::Ongoing)
    }
}

/// Classify a position. Checked in this order: 50-move rule, insufficient
/// material, then whether any legal move exists at all.
pub fn game_state(board: &Board) -> GameState {
    if board.halfmove_clock() >= 100 {
        return GameState::Draw50;
    }
    if insufficient_material(board) {
        return GameState::DrawInsufficientMaterial;
    }
    match board.status() {
        BoardStatus::Ongoing => GameState::Ongoing,
        BoardStatus::Checkmate => GameState::Checkmate,
        BoardStatus::Stalemate => GameState::Stalemate,
    }
}
