//! Observable outcomes of a round.

use serde::{Deserialize, Serialize};

use super::geometry::Cell;
use super::team::Team;

/// One piece's share of an encounter: where and at which simulated step it
/// first shared a cell with an opposing piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionRecord {
    pub team: Team,
    pub piece_id: u8,
    pub cell: Cell,
    pub step: usize,
}

/// Why a command never reached movement resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    UnknownPiece,
    PieceJailed,
    ZeroDistance,
    Duplicate,
}

/// A state change produced while resolving a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    CommandDropped {
        team: Team,
        piece_id: u8,
        reason: DropReason,
    },
    Jailed {
        team: Team,
        piece_id: u8,
        cell: Cell,
    },
    /// `flag` names the team that owns the flag.
    FlagPickedUp {
        flag: Team,
        piece_id: u8,
    },
    FlagReturned {
        flag: Team,
    },
    FlagCaptured {
        team: Team,
        piece_id: u8,
    },
    Teleported {
        team: Team,
        piece_id: u8,
        to: Cell,
    },
    KeySpawned {
        team: Team,
        cell: Cell,
    },
    KeyRemoved {
        team: Team,
    },
    Rescued {
        team: Team,
        rescuer: u8,
        freed: Vec<u8>,
    },
    RescuerReset {
        team: Team,
        piece_id: u8,
    },
}
