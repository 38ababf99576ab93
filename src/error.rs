use thiserror::Error;

/// Why a textual board descriptor failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionParseError {
    #[error("expected at least 4 whitespace-separated fields, got {0}")]
    WrongFieldCount(usize),
    #[error("invalid piece character: {0:?}")]
    InvalidPieceChar(char),
    #[error("piece placement field runs off the board")]
    RankFileOutOfBounds,
    #[error("invalid side-to-move field: {0:?}")]
    InvalidSideToMove(String),
    #[error("invalid castling-rights character: {0:?}")]
    InvalidCastlingChar(char),
    #[error("invalid halfmove clock field: {0:?}")]
    InvalidHalfmoveClock(String),
    #[error("invalid fullmove number field: {0:?}")]
    InvalidFullmoveNumber(String),
}

/// Why a move string failed to parse, or parsed but named no legal move.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("move string {0:?} is too short to name a square pair")]
    TooShort(String),
    #[error("invalid square in move string: {0:?}")]
    InvalidSquare(String),
    #[error("unrecognized promotion piece character: {0:?}")]
    InvalidPromotionChar(char),
    #[error("{0:?} does not name a legal move in this position")]
    NotLegal(String),
    #[error("could not parse SAN move: {0:?}")]
    InvalidSan(String),
    #[error("SAN move {0:?} is ambiguous or matches no legal move")]
    AmbiguousOrUnmatchedSan(String),
}
