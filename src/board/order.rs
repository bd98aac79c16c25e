//! Movement commands.
//!
//! A round's input is one list of moves per team. Each move names a piece,
//! a direction and a number of steps. Pieces without a move hold position.

use serde::{Deserialize, Serialize};

use super::geometry::Direction;
use super::team::Team;

/// A single per-piece movement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub piece_id: u8,
    pub direction: Direction,
    pub distance: u32,
}

impl Move {
    pub const fn new(piece_id: u8, direction: Direction, distance: u32) -> Self {
        Move {
            piece_id,
            direction,
            distance,
        }
    }
}

/// Both teams' moves for a single round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundCommands {
    pub red: Vec<Move>,
    pub blue: Vec<Move>,
}

impl RoundCommands {
    pub fn new(red: Vec<Move>, blue: Vec<Move>) -> Self {
        RoundCommands { red, blue }
    }

    pub fn for_team(&self, team: Team) -> &[Move] {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    pub fn for_team_mut(&mut self, team: Team) -> &mut Vec<Move> {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.red.is_empty() && self.blue.is_empty()
    }
}
