//! Bidirectional move notation: UCI coordinate strings and standard
//! algebraic notation (SAN), both built on top of a position's legal move
//! list rather than duplicating move-generation rules.

use std::str::FromStr;

use crate::board::{Board, BoardStatus, ChessMove, MoveGen, Piece, Square};
use crate::error::MoveParseError;

/// Parse a UCI coordinate move ("e2e4", "a7a8q") against the legal moves of
/// `board`, returning the matching `ChessMove`.
pub fn parse_coordinate_move(board: &Board, text: &str) -> Result<ChessMove, MoveParseError> {
    let text = text.trim();
    if text.len() < 4 {
        return Err(MoveParseError::TooShort(text.to_string()));
    }
    let src = parse_square(&text[0..2])?;
    let dst = parse_square(&text[2..4])?;
    let promo = if text.len() > 4 {
        Some(match text.as_bytes()[4].to_ascii_lowercase() {
            b'n' => Piece::Knight,
            b'b' => Piece::Bishop,
            b'r' => Piece::Rook,
            b'q' => Piece::Queen,
            c => return Err(MoveParseError::InvalidPromotionChar(c as char)),
        })
    } else {
        None
    };

    for mv in MoveGen::new_legal(board) {
        if mv.get_source() == src && mv.get_dest() == dst && mv.get_promotion() == promo {
            return Ok(mv);
        }
    }
    Err(MoveParseError::NotLegal(text.to_string()))
}

/// Render a move as a UCI coordinate string. Delegates to `ChessMove`'s
/// `Display` impl, which already produces this format.
pub fn to_coordinate_string(mv: ChessMove) -> String {
    mv.to_string()
}

fn parse_square(s: &str) -> Result<Square, MoveParseError> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return Err(MoveParseError::InvalidSquare(s.to_string()));
    }
    let file = bytes[0].wrapping_sub(b'a');
    let rank = bytes[1].wrapping_sub(b'1');
    if file >= 8 || rank >= 8 {
        return Err(MoveParseError::InvalidSquare(s.to_string()));
    }
    Ok(Square::make_square(
        crate::board::Rank::from_index(rank as usize),
        crate::board::File::from_index(file as usize),
    ))
}

/// Render a move played from `board` as standard algebraic notation,
/// including `+`/`#` suffixes and minimal disambiguation.
pub fn to_san(board: &Board, mv: ChessMove) -> String {
    let piece = board.piece_on(mv.get_source()).expect("move source is empty");
    let is_capture = mv.is_capture();

    if mv.is_castle() {
        let s = if mv.get_dest().file().to_index() == 6 {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
        return add_check_suffix(board, mv, s);
    }

    let mut san = String::new();

    if piece == Piece::Pawn {
        if is_capture {
            san.push((b'a' + mv.get_source().file().to_index() as u8) as char);
        }
    } else {
        san.push(piece_char(piece));
        san.push_str(&disambiguation(board, mv, piece));
    }

    if is_capture {
        san.push('x');
    }

    san.push((b'a' + mv.get_dest().file().to_index() as u8) as char);
    san.push((b'1' + mv.get_dest().rank().to_index() as u8) as char);

    if let Some(promo) = mv.get_promotion() {
        san.push('=');
        san.push(piece_char(promo));
    }

    add_check_suffix(board, mv, san)
}

fn add_check_suffix(board: &Board, mv: ChessMove, mut san: String) -> String {
    let new_board = board.make_move_new(mv);
    match new_board.status() {
        BoardStatus::Checkmate => san.push('#'),
        _ => {
            if new_board.checkers().popcnt() > 0 {
                san.push('+');
            }
        }
    }
    san
}

fn piece_char(piece: Piece) -> char {
    match piece {
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
        Piece::Pawn => 'P',
    }
}

/// File-first, then rank, then both: the minimal disambiguation needed
/// among same-piece-type moves sharing the destination square.
fn disambiguation(board: &Board, mv: ChessMove, piece: Piece) -> String {
    let mut needs_file = false;
    let mut needs_rank = false;
    let mut ambiguous = false;

    for other in MoveGen::new_legal(board) {
        if other == mv {
            continue;
        }
        if board.piece_on(other.get_source()) == Some(piece) && other.get_dest() == mv.get_dest() {
            ambiguous = true;
            if other.get_source().file() == mv.get_source().file() {
                needs_rank = true;
            }
            if other.get_source().rank() == mv.get_source().rank() {
                needs_file = true;
            }
        }
    }

    if !ambiguous {
        return String::new();
    }
    if !needs_file && !needs_rank {
        needs_file = true;
    }

    let mut s = String::new();
    if needs_file {
        s.push((b'a' + mv.get_source().file().to_index() as u8) as char);
    }
    if needs_rank {
        s.push((b'1' + mv.get_source().rank().to_index() as u8) as char);
    }
    s
}

/// Parse a SAN move string against the legal moves of `board`.
pub fn parse_san(board: &Board, text: &str) -> Result<ChessMove, MoveParseError> {
    let cleaned = text.trim().trim_end_matches(['+', '#']);

    if cleaned == "O-O" || cleaned == "0-0" {
        return find_castle(board, true);
    }
    if cleaned == "O-O-O" || cleaned == "0-0-0" {
        return find_castle(board, false);
    }

    for mv in MoveGen::new_legal(board) {
        if to_san(board, mv).trim_end_matches(['+', '#']) == cleaned {
            return Ok(mv);
        }
    }
    Err(MoveParseError::AmbiguousOrUnmatchedSan(text.to_string()))
}

fn find_castle(board: &Board, kingside: bool) -> Result<ChessMove, MoveParseError> {
    for mv in MoveGen::new_legal(board) {
        let is_match = if kingside {
            mv.get_dest().file().to_index() == 6
        } else {
            mv.get_dest().file().to_index() == 2
        };
        if mv.is_castle() && is_match {
            return Ok(mv);
        }
    }
    Err(MoveParseError::NotLegal(if kingside {
        "O-O".to_string()
    } else {
        "O-O-O".to_string()
    }))
}

/// Parse the position-describing text format: either the literal
/// `startpos` keyword or a full board descriptor.
pub fn parse_position_text(text: &str) -> Result<Board, crate::error::PositionParseError> {
    if text.trim() == "startpos" {
        Ok(Board::default())
    } else {
        Board::from_str(text.trim())
    }
}
