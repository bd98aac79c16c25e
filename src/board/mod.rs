//! Board representation and game-state types.
//!
//! Contains the static layout (territories, zones, spawns), pieces and
//! rosters, movement commands, round events and the mutable game state.

pub mod event;
pub mod geometry;
pub mod history;
pub mod layout;
pub mod order;
pub mod piece;
pub mod state;
pub mod team;

pub use event::{CollisionRecord, DropReason, Event};
pub use geometry::{Cell, Direction, Rect, RowBand, ALL_DIRECTIONS};
pub use history::{PieceSnapshot, RoundRecord, ScoreBreakdown, TeamScore};
pub use layout::Layout;
pub use order::{Move, RoundCommands};
pub use piece::{Piece, Roster, MAX_PIECES_PER_TEAM};
pub use state::{Carrier, Flag, GameState, PendingReset, RescueKey, Status};
pub use team::{Team, ALL_TEAMS};
