//! Move ordering for the search. Move generation and legality filtering
//! live in `board::MoveGen`; this module only scores and orders the
//! resulting candidates so alpha-beta sees the most promising moves
//! first.

use arrayvec::ArrayVec;
use crate::board::{Board, ChessMove, MoveGen};

use crate::evaluation::piece_value;
use crate::types::Score;

const TT_MOVE_SCORE: Score = 100_000;
const PROMOTION_SCORE: Score = 48_000;
const KILLER_SCORE: [Score; 2] = [40_000, 39_000];

/// Value of the piece a capture removes from the board. En passant's
/// victim is a pawn even though the destination square is empty.
pub fn victim_value(board: &Board, mv: ChessMove) -> Score {
    if mv.is_en_passant() {
        piece_value(crate::board::Piece::Pawn)
    } else {
        board
            .piece_on(mv.get_dest())
            .map(piece_value)
            .unwrap_or(0)
    }
}

pub struct ScoredMove {
    pub mv: ChessMove,
    pub score: Score,
}

/// History table indexed by [side-to-move, from, to].
pub type History = [[[Score; 64]; 64]; 2];

/// Lazily yields moves in descending score order via partial selection
/// sort: before handing out slot `i`, scan `i..len` for the maximum and
/// swap it into place. Cheaper than a full sort when the search cuts off
/// before exhausting the list.
pub struct OrderedMoves {
    moves: ArrayVec<ScoredMove, 256>,
    next: usize,
}

impl Iterator for OrderedMoves {
    type Item = ChessMove;

    fn next(&mut self) -> Option<ChessMove> {
        if self.next >= self.moves.len() {
            return None;
        }
        let mut best = self.next;
        for i in (self.next + 1)..self.moves.len() {
            if self.moves[i].score > self.moves[best].score {
                best = i;
            }
        }
        self.moves.swap(self.next, best);
        let mv = self.moves[self.next].mv;
        self.next += 1;
        Some(mv)
    }
}

/// Scores and orders every legal move at an interior node.
/// Priority: TT move, captures by MVV-LVA, promotions, killer moves,
/// history heuristic, remaining quiet moves.
pub fn order_moves(
    board: &Board,
    hash_move: Option<ChessMove>,
    killers: &[Option<ChessMove>; 2],
    history: &History,
) -> OrderedMoves {
    let side = board.side_to_move().to_index();
    let mut scored: ArrayVec<ScoredMove, 256> = ArrayVec::new();

    for mv in MoveGen::new_legal(board) {
        let score = score_move(board, mv, hash_move, killers, history, side);
        scored.push(ScoredMove { mv, score });
    }

    OrderedMoves { moves: scored, next: 0 }
}

fn score_move(
    board: &Board,
    mv: ChessMove,
    hash_move: Option<ChessMove>,
    killers: &[Option<ChessMove>; 2],
    history: &History,
    side: usize,
) -> Score {
    if Some(mv) == hash_move {
        return TT_MOVE_SCORE;
    }

    if mv.is_capture() {
        let attacker = board
            .piece_on(mv.get_source())
            .expect("move source is occupied");
        return 50_000 + 10 * victim_value(board, mv) - piece_value(attacker);
    }

    if mv.is_promotion() {
        return PROMOTION_SCORE;
    }

    if Some(mv) == killers[0] {
        return KILLER_SCORE[0];
    }
    if Some(mv) == killers[1] {
        return KILLER_SCORE[1];
    }

    history[side][mv.get_source().to_index()][mv.get_dest().to_index()]
}

/// Generates only legal captures (and capture-promotions) for quiescence
/// search, ordered by MVV-LVA.
pub fn order_captures(board: &Board) -> OrderedMoves {
    let mut scored: ArrayVec<ScoredMove, 256> = ArrayVec::new();

    for mv in MoveGen::new_captures(board) {
        let attacker = board
            .piece_on(mv.get_source())
            .expect("move source is occupied");
        let mut score = 10 * victim_value(board, mv) - piece_value(attacker);
        if mv.is_promotion() {
            score += PROMOTION_SCORE;
        }
        scored.push(ScoredMove { mv, score });
    }

    OrderedMoves { moves: scored, next: 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn init() {
        crate::board::init();
    }

    fn empty_history() -> History {
        [[[0; 64]; 64]; 2]
    }

    #[test]
    fn test_hash_move_sorts_first() {
        init();
        let board = Board::default();
        let hash_move = crate::notation::parse_coordinate_move(&board, "g1f3").unwrap();
        let ordered: Vec<_> =
            order_moves(&board, Some(hash_move), &[None, None], &empty_history()).collect();
        assert_eq!(ordered[0], hash_move);
    }

    #[test]
    fn test_captures_outrank_quiet_moves() {
        init();
        let board =
            Board::from_str("rnbqkbnr/pppp1ppp/8/4p3/3PP3/8/PPP2PPP/RNBQKBNR b KQkq - 0 2").unwrap();
        let ordered: Vec<_> = order_moves(&board, None, &[None, None], &empty_history()).collect();
        let capture = crate::notation::parse_coordinate_move(&board, "e5d4").unwrap();
        let capture_pos = ordered.iter().position(|&m| m == capture).unwrap();
        let quiet = crate::notation::parse_coordinate_move(&board, "b8c6").unwrap();
        let quiet_pos = ordered.iter().position(|&m| m == quiet).unwrap();
        assert!(capture_pos < quiet_pos);
    }

    #[test]
    fn test_killer_outranks_plain_quiet_move() {
        init();
        let board = Board::default();
        let killer = crate::notation::parse_coordinate_move(&board, "b1c3").unwrap();
        let other = crate::notation::parse_coordinate_move(&board, "a2a3").unwrap();
        let ordered: Vec<_> =
            order_moves(&board, None, &[Some(killer), None], &empty_history()).collect();
        let killer_pos = ordered.iter().position(|&m| m == killer).unwrap();
        let other_pos = ordered.iter().position(|&m| m == other).unwrap();
        assert!(killer_pos < other_pos);
    }

    #[test]
    fn test_order_captures_only_returns_captures() {
        init();
        let board =
            Board::from_str("rnbqkbnr/pppp1ppp/8/4p3/3PP3/8/PPP2PPP/RNBQKBNR b KQkq - 0 2").unwrap();
        let caps: Vec<_> = order_captures(&board).collect();
        assert!(caps.iter().all(|mv| mv.is_capture() || mv.is_promotion()));
        assert!(!caps.is_empty());
    }

    #[test]
    fn test_ordered_moves_is_fully_descending() {
        init();
        let board =
            Board::from_str("rnbqkbnr/pppp1ppp/8/4p3/3PP3/8/PPP2PPP/RNBQKBNR b KQkq - 0 2").unwrap();
        let mut history = empty_history();
        history[board.side_to_move().to_index()][1][2] = 500;
        let ordered_scores: Vec<Score> = order_moves(&board, None, &[None, None], &history)
            .map(|mv| score_move(&board, mv, None, &[None, None], &history, board.side_to_move().to_index()))
            .collect();
        assert!(!ordered_scores.is_empty());
        for pair in ordered_scores.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }
}
