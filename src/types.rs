use crate::board::ChessMove;

pub type Score = i32;

pub const INF: Score = 1_000_000;
pub const MATE: Score = 999_000;
pub const MAX_PLY: usize = 128;
pub const DEFAULT_DEPTH: u8 = 5;
pub const DEFAULT_HASH_MB: usize = 24;
pub const HISTORY_MAX: Score = 30_000;

/// Window half-width for aspiration search around the previous iteration's
/// score.
pub const ASP_WINDOW: Score = 50;

/// Default transposition table size in entries: 2^20.
pub const DEFAULT_TT_ENTRIES: usize = 1 << 20;

pub struct EngineConfig {
    pub hash_mb: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: DEFAULT_HASH_MB,
        }
    }
}

pub struct SearchResult {
    pub best_move: Option<ChessMove>,
    pub score: Score,
    pub depth: u8,
    pub nodes: u64,
}
