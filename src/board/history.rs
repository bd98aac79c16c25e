//! Per-round history records.
//!
//! A `RoundRecord` is written once by the round orchestrator and never
//! modified afterwards.

use serde::{Deserialize, Serialize};

use super::event::{CollisionRecord, Event};
use super::geometry::Cell;
use super::order::RoundCommands;
use super::piece::Roster;
use super::team::Team;

/// A piece's position and status at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub id: u8,
    pub pos: Cell,
    pub alive: bool,
}

/// Captures every piece of a roster.
pub fn snapshot_roster(roster: &Roster) -> Vec<PieceSnapshot> {
    roster
        .pieces
        .iter()
        .map(|p| PieceSnapshot {
            id: p.id,
            pos: p.pos,
            alive: p.alive,
        })
        .collect()
}

/// One team's tallies after a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub alive: u8,
    pub jailed: u8,
    /// Opposing pieces this team sent to jail during the round.
    pub tags: u8,
    /// Teammates freed by a rescue during the round.
    pub rescued: u8,
    /// True while this team carries the opposing flag.
    pub carrying_flag: bool,
    pub captured_flag: bool,
}

/// Both teams' tallies, indexed by `Team::index()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub teams: [TeamScore; 2],
}

impl ScoreBreakdown {
    pub fn team(&self, team: Team) -> &TeamScore {
        &self.teams[team.index()]
    }
}

/// Immutable record of one executed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub commands: RoundCommands,
    pub before: [Vec<PieceSnapshot>; 2],
    pub after: [Vec<PieceSnapshot>; 2],
    pub collisions: Vec<CollisionRecord>,
    pub events: Vec<Event>,
    pub score: ScoreBreakdown,
}
