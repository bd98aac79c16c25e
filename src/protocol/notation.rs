//! Compact move notation.
//!
//! A move is written `<piece id><direction char><distance>`, for example
//! `3r4` (piece 3, right, four steps) or `1u1`. Direction characters are
//! `u`, `d`, `l` and `r`. Multiple moves are separated by whitespace.

use thiserror::Error;

use crate::board::{Direction, Move};

/// Errors that can occur when parsing move notation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty input")]
    EmptyInput,

    #[error("missing direction in '{0}'")]
    MissingDirection(String),

    #[error("unknown direction '{0}'")]
    UnknownDirection(char),

    #[error("invalid piece id in '{0}'")]
    InvalidPieceId(String),

    #[error("invalid distance in '{0}'")]
    InvalidDistance(String),
}

/// Parses a single move such as `2d3`.
pub fn parse_move(s: &str) -> Result<Move, NotationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(NotationError::EmptyInput);
    }
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| NotationError::MissingDirection(s.to_string()))?;
    let (id_part, rest) = s.split_at(split);
    let piece_id: u8 = id_part
        .parse()
        .map_err(|_| NotationError::InvalidPieceId(s.to_string()))?;

    let mut chars = rest.chars();
    let dir_char = chars
        .next()
        .ok_or_else(|| NotationError::MissingDirection(s.to_string()))?;
    let direction = Direction::from_notation_char(dir_char.to_ascii_lowercase())
        .ok_or(NotationError::UnknownDirection(dir_char))?;
    let distance: u32 = chars
        .as_str()
        .parse()
        .map_err(|_| NotationError::InvalidDistance(s.to_string()))?;

    Ok(Move::new(piece_id, direction, distance))
}

/// Parses a whitespace-separated list of moves.
pub fn parse_moves(s: &str) -> Result<Vec<Move>, NotationError> {
    s.split_whitespace().map(parse_move).collect()
}

/// Formats a move in notation.
pub fn format_move(mv: &Move) -> String {
    format!("{}{}{}", mv.piece_id, mv.direction.notation_char(), mv.distance)
}

/// Formats a list of moves separated by single spaces.
pub fn format_moves(moves: &[Move]) -> String {
    moves.iter().map(format_move).collect::<Vec<_>>().join(" ")
}
