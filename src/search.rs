use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::board::{Board, ChessMove, Color, Piece};

use crate::evaluation::evaluate;
use crate::movegen::{order_captures, order_moves, victim_value, History};
use crate::tt::{TTFlag, TranspositionTable};
use crate::types::{Score, SearchResult, DEFAULT_HASH_MB, HISTORY_MAX, INF, MATE, MAX_PLY, ASP_WINDOW};

/// Margin below which a non-promoting capture is skipped during
/// quiescence delta pruning.
const DELTA_MARGIN: Score = 200;

/// Mutable search state shared across recursion.
pub struct SearchState {
    pub nodes: u64,
    pub start_time: Instant,
    pub stop: Arc<AtomicBool>,
    pub time_limit_ms: u64,
    pub killers: [[Option<ChessMove>; 2]; MAX_PLY],
    pub history: History,
    pub tt: TranspositionTable,
    pub root_best_move: Option<ChessMove>,
    pub position_history: Vec<u64>,
    /// Suppresses `info` line output; set by benchmarks that only care
    /// about node counts.
    pub silent: bool,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            nodes: 0,
            start_time: Instant::now(),
            stop: Arc::new(AtomicBool::new(false)),
            time_limit_ms: 0,
            killers: [[None; 2]; MAX_PLY],
            history: [[[0; 64]; 64]; 2],
            tt: TranspositionTable::new(DEFAULT_HASH_MB),
            root_best_move: None,
            position_history: Vec::new(),
            silent: false,
        }
    }

    /// Full reset for a `ucinewgame` signal: clears TT, killers, and
    /// history entirely.
    pub fn new_game(&mut self) {
        self.killers = [[None; 2]; MAX_PLY];
        self.history = [[[0; 64]; 64]; 2];
        self.tt.clear();
        self.root_best_move = None;
        self.position_history.clear();
    }

    /// Per-search reset: clears node/stop state and decays (rather than
    /// clears) the history table so long-lived knowledge survives across
    /// moves within the same game.
    pub fn reset(&mut self) {
        self.nodes = 0;
        self.stop.store(false, Ordering::SeqCst);
        self.start_time = Instant::now();
        self.tt.new_search();
        self.root_best_move = None;
        for side in self.history.iter_mut() {
            for from in side.iter_mut() {
                for v in from.iter_mut() {
                    *v /= 4;
                }
            }
        }
    }

    pub fn resize_tt(&mut self, mb: usize) {
        self.tt = TranspositionTable::new(mb);
    }

    fn check_time(&self) {
        if self.time_limit_ms > 0 {
            let elapsed = self.start_time.elapsed().as_millis() as u64;
            if elapsed >= self.time_limit_ms {
                self.stop.store(true, Ordering::Relaxed);
            }
        }
    }

    fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the principal variation by following the TT hash-move chain
/// from the root, stopping at a cycle, a missing entry, or an illegal
/// stored move.
fn extract_pv(board: &Board, tt: &TranspositionTable, max_moves: usize) -> Vec<ChessMove> {
    let mut pv = Vec::new();
    let mut current_board = *board;
    let mut seen: Vec<u64> = Vec::new();

    for _ in 0..max_moves {
        let hash = current_board.get_hash();
        if seen.contains(&hash) {
            break;
        }
        seen.push(hash);

        let Some(entry) = tt.probe(hash, 0) else {
            break;
        };
        let Some(mv) = entry.best_move else {
            break;
        };
        if !current_board.legal(mv) {
            break;
        }
        pv.push(mv);
        current_board = current_board.make_move_new(mv);
    }

    pv
}

/// Format a score for UCI `info` output: `score cp <n>` or
/// `score mate <n>`.
pub fn format_score(score: Score) -> String {
    if score.abs() > MATE - MAX_PLY as Score {
        let mate_plies = MATE - score.abs();
        let mate_moves = (mate_plies + 1) / 2;
        if score > 0 {
            format!("score mate {}", mate_moves)
        } else {
            format!("score mate -{}", mate_moves)
        }
    } else {
        format!("score cp {}", score)
    }
}

/// Iterative deepening search from `board` down to `max_depth`. Returns
/// the best move found and prints one UCI `info` line per completed
/// iteration (unless `state.silent`).
pub fn search(board: &Board, state: &mut SearchState, max_depth: u8) -> SearchResult {
    let mut best_move: Option<ChessMove> = None;
    let mut best_score: Score = -INF;
    let mut prev_score: Score = 0;

    for depth in 1..=max_depth {
        state.nodes = 0;
        state.root_best_move = None;

        let mut score = if depth >= 4 {
            let alpha = prev_score.saturating_sub(ASP_WINDOW);
            let beta = prev_score.saturating_add(ASP_WINDOW);
            negamax(board, state, depth, 0, alpha, beta, true)
        } else {
            negamax(board, state, depth, 0, -INF, INF, true)
        };

        if !state.is_stopped() && depth >= 4 && (score <= prev_score - ASP_WINDOW || score >= prev_score + ASP_WINDOW)
        {
            score = negamax(board, state, depth, 0, -INF, INF, true);
        }

        if state.is_stopped() {
            if best_move.is_none() {
                best_move = state.root_best_move;
            }
            break;
        }

        prev_score = score;
        best_score = score;
        if let Some(mv) = state.root_best_move {
            best_move = Some(mv);
        }

        if !state.silent {
            let elapsed_ms = state.start_time.elapsed().as_millis().max(1) as u64;
            let nps = state.nodes * 1000 / elapsed_ms;
            let pv = extract_pv(board, &state.tt, depth as usize);
            let pv_str: String = pv.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(" ");
            let score_str = format_score(best_score);
            println!(
                "info depth {} {} nodes {} time {} nps {} pv {}",
                depth, score_str, state.nodes, elapsed_ms, nps, pv_str
            );
        }

        if state.time_limit_ms > 0 {
            let elapsed = state.start_time.elapsed().as_millis() as u64;
            if elapsed >= state.time_limit_ms / 2 {
                break;
            }
        }

        if best_score.abs() > MATE - MAX_PLY as Score {
            break;
        }
    }

    SearchResult {
        best_move,
        score: best_score,
        depth: max_depth,
        nodes: state.nodes,
    }
}

/// Negamax alpha-beta core: TT, null-move pruning, late-move reductions,
/// check extension, killer/history move ordering.
fn negamax(
    board: &Board,
    state: &mut SearchState,
    depth: u8,
    ply: usize,
    mut alpha: Score,
    beta: Score,
    do_null: bool,
) -> Score {
    state.nodes += 1;
    if state.nodes & 4095 == 0 {
        state.check_time();
    }
    if state.is_stopped() {
        return 0;
    }

    if board.halfmove_clock() >= 100 {
        return 0;
    }

    let hash = board.get_hash();
    if ply > 0 && state.position_history.contains(&hash) {
        return 0;
    }

    let is_pv = beta - alpha > 1;

    let mut hash_move: Option<ChessMove> = None;
    if let Some(entry) = state.tt.probe(hash, ply) {
        hash_move = entry.best_move;
        if entry.depth >= depth && !is_pv {
            if let Some(score) = TranspositionTable::retrieve_score(entry, ply, alpha, beta) {
                return score;
            }
        }
    }

    if depth == 0 {
        return quiescence(board, state, ply, alpha, beta);
    }

    let in_check = board.checkers().0 != 0;
    let depth = if in_check { depth + 1 } else { depth };

    if do_null && !is_pv && !in_check && depth >= 3 && ply > 0 {
        let our_pieces = board.color_combined(board.side_to_move());
        let pawns_and_king = board.pieces(Piece::Pawn) | board.pieces(Piece::King);
        let has_non_pawn_material = (our_pieces & !pawns_and_king).0 != 0;

        if has_non_pawn_material {
            if let Some(null_board) = board.null_move() {
                let r: u8 = 2 + if depth >= 6 { 1 } else { 0 };
                let reduced = depth.saturating_sub(1 + r);
                let score = -negamax(&null_board, state, reduced, ply + 1, -beta, -beta + 1, false);
                if state.is_stopped() {
                    return 0;
                }
                if score >= beta {
                    return beta;
                }
            }
        }
    }

    let moves = order_moves(board, hash_move, &state.killers[ply], &state.history);

    let mut best_score = -INF;
    let mut best_move: Option<ChessMove> = None;
    let original_alpha = alpha;
    let mut searched_count: usize = 0;
    state.position_history.push(hash);

    for mv in moves {
        searched_count += 1;
        let new_board = board.make_move_new(mv);

        let score = if searched_count == 1 {
            -negamax(&new_board, state, depth - 1, ply + 1, -beta, -alpha, true)
        } else {
            let lmr_eligible = searched_count >= 4
                && depth >= 3
                && !in_check
                && !mv.is_capture()
                && !mv.is_promotion()
                && Some(mv) != state.killers[ply][0]
                && Some(mv) != state.killers[ply][1];
            let r: u8 = if lmr_eligible {
                1 + if searched_count >= 8 { 1 } else { 0 }
            } else {
                0
            };
            let reduced = depth.saturating_sub(1 + r);

            let mut s = -negamax(&new_board, state, reduced, ply + 1, -alpha - 1, -alpha, true);
            if s > alpha {
                if r > 0 {
                    s = -negamax(&new_board, state, depth - 1, ply + 1, -alpha - 1, -alpha, true);
                }
                if s > alpha && s < beta {
                    s = -negamax(&new_board, state, depth - 1, ply + 1, -beta, -alpha, true);
                }
            }
            s
        };

        if state.is_stopped() {
            state.position_history.pop();
            return best_score;
        }

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
            if ply == 0 {
                state.root_best_move = Some(mv);
            }
        }
        if score > alpha {
            alpha = score;
        }

        if alpha >= beta {
            if !mv.is_capture() && !mv.is_promotion() {
                state.killers[ply][1] = state.killers[ply][0];
                state.killers[ply][0] = Some(mv);

                let side = board.side_to_move().to_index();
                let from = mv.get_source().to_index();
                let to = mv.get_dest().to_index();
                state.history[side][from][to] += (depth as Score) * (depth as Score);
                if state.history[side][from][to] > HISTORY_MAX {
                    state.history[side][from][to] = HISTORY_MAX;
                }
            }
            state.position_history.pop();
            state.tt.store(hash, depth, beta, TTFlag::LowerBound, Some(mv), ply);
            return beta;
        }
    }

    state.position_history.pop();

    if searched_count == 0 {
        return if in_check { -(MATE - ply as Score) } else { 0 };
    }

    let flag = if best_score > original_alpha {
        TTFlag::Exact
    } else {
        TTFlag::UpperBound
    };
    state.tt.store(hash, depth, best_score, flag, best_move, ply);

    best_score
}

/// Quiescence search: stand-pat plus captures only, with delta pruning.
/// Does not consult the TT and does not extend for checks.
fn quiescence(board: &Board, state: &mut SearchState, ply: usize, mut alpha: Score, beta: Score) -> Score {
    state.nodes += 1;

    let relative_eval = |b: &Board| -> Score {
        if b.side_to_move() == Color::White {
            evaluate(b)
        } else {
            -evaluate(b)
        }
    };

    if ply >= MAX_PLY {
        return relative_eval(board);
    }

    let stand_pat = relative_eval(board);
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    for mv in order_captures(board) {
        if !mv.is_promotion() && stand_pat + victim_value(board, mv) + DELTA_MARGIN < alpha {
            continue;
        }

        let new_board = board.make_move_new(mv);
        let score = -quiescence(&new_board, state, ply + 1, -beta, -alpha);

        if state.is_stopped() {
            return alpha;
        }

        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn init() {
        crate::board::init();
    }

    #[test]
    fn test_search_finds_move() {
        init();
        let board = Board::default();
        let mut state = SearchState::new();
        let result = search(&board, &mut state, 3);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn test_search_finds_mate_in_one() {
        init();
        let board =
            Board::from_str("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4")
                .unwrap();
        let mut state = SearchState::new();
        let result = search(&board, &mut state, 2);
        let best = result.best_move.unwrap();
        assert_eq!(best.to_string(), "h5f7", "Expected Qxf7# but got {}", best);
    }

    #[test]
    fn test_search_avoids_giving_material() {
        init();
        let board = Board::default();
        let mut state = SearchState::new();
        let result = search(&board, &mut state, 4);
        assert!(result.best_move.is_some());
        assert!(result.nodes > 0);
    }

    #[test]
    fn test_checkmate_score() {
        init();
        let board =
            Board::from_str("rnbqkbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        let mut state = SearchState::new();
        let score = negamax(&board, &mut state, 1, 0, -INF, INF, true);
        assert!(score < -MATE + 200, "Checkmate score should be very negative, got {}", score);
    }

    #[test]
    fn test_tt_reduces_nodes() {
        init();
        let board = Board::default();
        let mut state = SearchState::new();

        search(&board, &mut state, 4);
        let nodes_first = state.nodes;

        state.reset();
        search(&board, &mut state, 4);
        let nodes_second = state.nodes;

        assert!(
            nodes_second <= nodes_first,
            "Second search ({} nodes) should use <= first ({} nodes) due to TT",
            nodes_second,
            nodes_first
        );
    }

    #[test]
    fn test_halfmove_clock_draw() {
        init();
        let board = Board::from_str("8/8/8/4k3/8/4K3/8/8 w - - 100 60").unwrap();
        let mut state = SearchState::new();
        let score = negamax(&board, &mut state, 3, 0, -INF, INF, true);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_draw_detection_repetition() {
        init();
        let board = Board::default();
        let mut state = SearchState::new();
        state.position_history.push(board.get_hash());
        let score = negamax(&board, &mut state, 3, 1, -INF, INF, true);
        assert_eq!(score, 0, "Repeated position should return 0 (draw), got {}", score);
    }

    #[test]
    fn test_quiescence_stand_pat_cutoff() {
        init();
        let board = Board::default();
        let mut state = SearchState::new();
        let score = quiescence(&board, &mut state, 0, -INF, INF);
        // Startpos is roughly balanced; quiescence shouldn't blow past a
        // reasonable bound with no captures available at the root.
        assert!(score.abs() < 1000);
    }

    #[test]
    fn test_stop_preserves_best_move() {
        init();
        let board = Board::default();
        let mut state = SearchState::new();
        state.time_limit_ms = 1;
        state.start_time = Instant::now();
        let result = search(&board, &mut state, 20);
        assert!(result.best_move.is_some(), "Should find a move even when stopped early");
    }

    #[test]
    fn test_pv_extraction() {
        init();
        let board = Board::default();
        let mut state = SearchState::new();
        search(&board, &mut state, 4);
        let pv = extract_pv(&board, &state.tt, 4);
        assert!(!pv.is_empty(), "PV should contain at least one move after search");
    }

    #[test]
    fn test_mate_score_format() {
        assert_eq!(format_score(MATE - 1), "score mate 1");
        assert_eq!(format_score(MATE - 3), "score mate 2");
        assert_eq!(format_score(-(MATE - 1)), "score mate -1");
        assert_eq!(format_score(-(MATE - 3)), "score mate -2");
        assert_eq!(format_score(100), "score cp 100");
        assert_eq!(format_score(-50), "score cp -50");
    }

    #[test]
    fn test_history_decays_not_clears_on_reset() {
        init();
        let mut state = SearchState::new();
        state.history[0][12][28] = 100;
        state.reset();
        assert_eq!(state.history[0][12][28], 25);
    }

    #[test]
    fn test_new_game_clears_history_and_killers() {
        init();
        let mut state = SearchState::new();
        state.history[0][12][28] = 100;
        state.killers[0][0] = Some(ChessMove::quiet(
            crate::board::Square::make_square(
                crate::board::Rank::from_index(1),
                crate::board::File::from_index(4),
            ),
            crate::board::Square::make_square(
                crate::board::Rank::from_index(3),
                crate::board::File::from_index(4),
            ),
        ));
        state.new_game();
        assert_eq!(state.history[0][12][28], 0);
        assert!(state.killers[0][0].is_none());
    }
}
