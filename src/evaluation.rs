//! Static position evaluation: material, piece-square tables, pawn
//! structure, king safety, mobility, and rook-file terms. Single-phase (no
//! midgame/endgame taper) — every term is evaluated once per piece in a
//! straight per-square scan.

use crate::board::{BitBoard, Board, Color, Piece, Square, ALL_SQUARES};
use crate::types::Score;

pub const PAWN_VALUE: Score = 100;
pub const KNIGHT_VALUE: Score = 320;
pub const BISHOP_VALUE: Score = 330;
pub const ROOK_VALUE: Score = 500;
pub const QUEEN_VALUE: Score = 900;
pub const KING_VALUE: Score = 20_000;

pub const BISHOP_PAIR_BONUS: Score = 30;

const DOUBLED_PAWN_PENALTY: Score = -10;
const ISOLATED_PAWN_PENALTY: Score = -15;

const KING_SHIELD_BONUS: Score = 10;
const KING_NO_SHIELD_PENALTY: Score = -15;

const MOBILITY_WEIGHT: Score = 3;

const ROOK_OPEN_FILE_BONUS: Score = 20;
const ROOK_SEMI_OPEN_FILE_BONUS: Score = 10;

pub fn piece_value(piece: Piece) -> Score {
    match piece {
        Piece::Pawn => PAWN_VALUE,
        Piece::Knight => KNIGHT_VALUE,
        Piece::Bishop => BISHOP_VALUE,
        Piece::Rook => ROOK_VALUE,
        Piece::Queen => QUEEN_VALUE,
        Piece::King => KING_VALUE,
    }
}

#[rustfmt::skip]
const PAWN_PST: [Score; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     50,  50,  50,  50,  50,  50,  50,  50,
     10,  10,  20,  30,  30,  20,  10,  10,
      5,   5,  10,  25,  25,  10,   5,   5,
      0,   0,   0,  20,  20,   0,   0,   0,
      5,  -5, -10,   0,   0, -10,  -5,   5,
      5,  10,  10, -20, -20,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_PST: [Score; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP_PST: [Score; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOK_PST: [Score; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10,  10,  10,  10,  10,   5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      0,   0,   0,   5,   5,   0,   0,   0,
];

#[rustfmt::skip]
const QUEEN_PST: [Score; 64] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
     -5,   0,   5,   5,   5,   5,   0,  -5,
      0,   0,   5,   5,   5,   5,   0,  -5,
    -10,   5,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

#[rustfmt::skip]
const KING_PST: [Score; 64] = [
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20,   0,   0,   0,   0,  20,  20,
     20,  30,  10,   0,   0,  10,  30,  20,
];

/// White is indexed directly (rank 0 = PST row 7, our arrays are written
/// a8-first so row 0 is the back rank from White's view already matches
/// `sq.to_index()` when read top-down); Black mirrors vertically via
/// `(7-rank)*8+file`.
fn pst_value(table: &[Score; 64], sq: Square, color: Color) -> Score {
    let idx = match color {
        Color::White => (7 - sq.rank().to_index()) * 8 + sq.file().to_index(),
        Color::Black => sq.rank().to_index() * 8 + sq.file().to_index(),
    };
    table[idx]
}

fn pst_for(piece: Piece) -> &'static [Score; 64] {
    match piece {
        Piece::Pawn => &PAWN_PST,
        Piece::Knight => &KNIGHT_PST,
        Piece::Bishop => &BISHOP_PST,
        Piece::Rook => &ROOK_PST,
        Piece::Queen => &QUEEN_PST,
        Piece::King => &KING_PST,
    }
}

/// Evaluate `board` from White's perspective: positive means White is
/// better off, regardless of whose move it is. Callers that need a
/// side-to-move-relative score negate it themselves.
pub fn evaluate(board: &Board) -> Score {
    let mut score = 0;

    for sq in ALL_SQUARES {
        if let Some(piece) = board.piece_on(sq) {
            let color = board.color_on(sq).unwrap();
            let sign = if color == Color::White { 1 } else { -1 };
            score += sign * piece_value(piece);
            score += sign * pst_value(pst_for(piece), sq, color);
        }
    }

    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        score += sign * bishop_pair_bonus(board, color);
        score += sign * pawn_structure(board, color);
        score += sign * king_safety(board, color);
        score += sign * mobility(board, color);
        score += sign * rook_file_bonus(board, color);
    }

    score
}

fn bishop_pair_bonus(board: &Board, color: Color) -> Score {
    let bishops = board.pieces(Piece::Bishop) & board.color_combined(color);
    if bishops.popcnt() >= 2 {
        BISHOP_PAIR_BONUS
    } else {
        0
    }
}

fn file_mask(file: usize) -> BitBoard {
    let mut bb = 0u64;
    for rank in 0..8 {
        bb |= 1u64 << (rank * 8 + file);
    }
    BitBoard(bb)
}

/// Doubled pawns (-10 per extra pawn sharing a file) and isolated pawns
/// (-15 each, no friendly pawn on an adjacent file). Passed pawns are
/// rewarded `10 + r^2` where `r` is the number of ranks advanced past the
/// second rank.
fn pawn_structure(board: &Board, color: Color) -> Score {
    let our_pawns = board.pieces(Piece::Pawn) & board.color_combined(color);
    let their_pawns = board.pieces(Piece::Pawn) & board.color_combined(!color);
    let mut score = 0;

    for file in 0..8usize {
        let on_file = (our_pawns & file_mask(file)).popcnt();
        if on_file >= 2 {
            score += DOUBLED_PAWN_PENALTY * (on_file as Score - 1);
        }
        if on_file > 0 {
            let left = if file > 0 { (our_pawns & file_mask(file - 1)).popcnt() } else { 0 };
            let right = if file < 7 { (our_pawns & file_mask(file + 1)).popcnt() } else { 0 };
            if left == 0 && right == 0 {
                score += ISOLATED_PAWN_PENALTY;
            }
        }
    }

    for sq in our_pawns.iter() {
        if is_passed_pawn(sq, color, their_pawns) {
            let r = match color {
                Color::White => sq.rank().to_index(),
                Color::Black => 7 - sq.rank().to_index(),
            } as Score;
            score += 10 + r * r;
        }
    }

    score
}

fn is_passed_pawn(sq: Square, color: Color, enemy_pawns: BitBoard) -> bool {
    let file = sq.file().to_index();
    let rank = sq.rank().to_index();
    let files = (file.saturating_sub(1))..=(file + 1).min(7);
    for f in files {
        for enemy_sq in (enemy_pawns & file_mask(f)).iter() {
            let enemy_rank = enemy_sq.rank().to_index();
            let ahead = match color {
                Color::White => enemy_rank > rank,
                Color::Black => enemy_rank < rank,
            };
            if ahead {
                return false;
            }
        }
    }
    true
}

/// +10 per file in front of the king with a friendly pawn shield, -15 per
/// file with none, restricted to the three files around the king.
fn king_safety(board: &Board, color: Color) -> Score {
    let king_bb = board.pieces(Piece::King) & board.color_combined(color);
    if king_bb.is_empty() {
        return 0;
    }
    let king_sq = Square::new(king_bb.0.trailing_zeros() as u8);
    let king_file = king_sq.file().to_index();
    let our_pawns = board.pieces(Piece::Pawn) & board.color_combined(color);

    let mut score = 0;
    for file in (king_file.saturating_sub(1))..=(king_file + 1).min(7) {
        if (our_pawns & file_mask(file)).is_empty() {
            score += KING_NO_SHIELD_PENALTY;
        } else {
            score += KING_SHIELD_BONUS;
        }
    }
    score
}

/// `3 * (count of pseudo-legal destination squares)` per piece, knights,
/// bishops, rooks and queens only — pawns and king are excluded, matching
/// the simple attack-count model this term approximates.
fn mobility(board: &Board, color: Color) -> Score {
    use crate::board::{bishop_attacks, knight_attacks, rook_attacks};
    let own = board.color_combined(color);
    let occupied = board.combined();
    let mut squares = 0u32;

    for sq in (board.pieces(Piece::Knight) & own).iter() {
        squares += (knight_attacks(sq) & !own).popcnt();
    }
    for sq in (board.pieces(Piece::Bishop) & own).iter() {
        squares += (bishop_attacks(sq, occupied) & !own).popcnt();
    }
    for sq in (board.pieces(Piece::Rook) & own).iter() {
        squares += (rook_attacks(sq, occupied) & !own).popcnt();
    }
    for sq in (board.pieces(Piece::Queen) & own).iter() {
        squares += ((bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)) & !own).popcnt();
    }

    MOBILITY_WEIGHT * squares as Score
}

fn rook_file_bonus(board: &Board, color: Color) -> Score {
    let our_pawns = board.pieces(Piece::Pawn) & board.color_combined(color);
    let their_pawns = board.pieces(Piece::Pawn) & board.color_combined(!color);
    let rooks = board.pieces(Piece::Rook) & board.color_combined(color);

    let mut score = 0;
    for sq in rooks.iter() {
        let file = sq.file().to_index();
        let has_own = !(our_pawns & file_mask(file)).is_empty();
        let has_enemy = !(their_pawns & file_mask(file)).is_empty();
        if !has_own && !has_enemy {
            score += ROOK_OPEN_FILE_BONUS;
        } else if !has_own {
            score += ROOK_SEMI_OPEN_FILE_BONUS;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn init() {
        crate::board::init();
    }

    #[test]
    fn test_startpos_near_zero() {
        init();
        let board = Board::default();
        assert_eq!(evaluate(&board), 0, "symmetric startpos should evaluate to exactly 0");
    }

    #[test]
    fn test_material_advantage_queen_up() {
        init();
        let board = Board::from_str("4k3/8/8/8/8/8/8/4KQ2 w - - 0 1").unwrap();
        assert!(evaluate(&board) > QUEEN_VALUE);
    }

    #[test]
    fn test_eval_is_side_to_move_independent() {
        init();
        let white_to_move = Board::from_str("4k3/8/8/8/8/8/8/4KQ2 w - - 0 1").unwrap();
        let black_to_move = Board::from_str("4k3/8/8/8/8/8/8/4KQ2 b - - 0 1").unwrap();
        assert_eq!(evaluate(&white_to_move), evaluate(&black_to_move));
    }

    #[test]
    fn test_bishop_pair_bonus_applied() {
        init();
        let one_bishop = Board::from_str("4k3/8/8/8/8/8/8/4KB2 w - - 0 1").unwrap();
        let two_bishops = Board::from_str("4k3/8/8/8/8/3B4/4K1B1/8 w - - 0 1").unwrap();
        let diff = evaluate(&two_bishops) - evaluate(&one_bishop);
        assert!(diff > BISHOP_VALUE, "second bishop plus pair bonus should beat one bishop's value alone");
    }

    #[test]
    fn test_doubled_pawns_penalized() {
        init();
        let healthy = Board::from_str("4k3/8/8/8/8/8/P3P3/4K3 w - - 0 1").unwrap();
        let doubled = Board::from_str("4k3/8/8/8/4P3/8/4P3/4K3 w - - 0 1").unwrap();
        assert!(evaluate(&doubled) < evaluate(&healthy));
    }

    #[test]
    fn test_rook_open_file_bonus() {
        init();
        let closed = Board::from_str("4k3/4p3/8/8/8/8/4P3/4K2R w - - 0 1").unwrap();
        let open = Board::from_str("4k3/8/8/8/8/8/8/4K2R w - - 0 1").unwrap();
        assert!(evaluate(&open) > evaluate(&closed));
    }
}
