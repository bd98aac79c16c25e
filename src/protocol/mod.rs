//! Text protocol for the referee binary.
//!
//! Provides move notation, command parsing and JSON snapshots of game state.

pub mod notation;
pub mod parser;
pub mod snapshot;

pub use notation::{format_move, format_moves, parse_move, parse_moves, NotationError};
pub use parser::{parse_command, Command, ParseError};
pub use snapshot::{record_json, state_json, StateSnapshot};
