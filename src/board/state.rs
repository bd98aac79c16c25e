//! Mutable game state for a single room.
//!
//! Holds everything a round mutates: rosters, flags, no-guard zones, rescue
//! keys, pending rescuer resets, the round counter, status and history.
//! Per-team data uses two-element arrays indexed by `Team::index()`.

use serde::{Deserialize, Serialize};

use super::geometry::Cell;
use super::history::RoundRecord;
use super::layout::Layout;
use super::piece::{Piece, Roster};
use super::team::Team;

/// Lifecycle of a room's game. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Waiting,
    Playing,
    Paused,
    Finished,
}

impl Status {
    pub const fn name(self) -> &'static str {
        match self {
            Status::Waiting => "waiting",
            Status::Playing => "playing",
            Status::Paused => "paused",
            Status::Finished => "finished",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The piece currently holding a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    pub team: Team,
    pub piece_id: u8,
}

/// A team's flag. While carried its position tracks the carrier; otherwise
/// it sits on its spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub spawn: Cell,
    pub pos: Cell,
    pub carrier: Option<Carrier>,
}

impl Flag {
    pub const fn at_spawn(spawn: Cell) -> Self {
        Flag {
            spawn,
            pos: spawn,
            carrier: None,
        }
    }

    pub const fn is_carried(&self) -> bool {
        self.carrier.is_some()
    }
}

/// A rescue key; `pos` is None while the key is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescueKey {
    pub spawn: Cell,
    pub pos: Option<Cell>,
}

/// A rescuer waiting to be sent home at the start of the next round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReset {
    pub team: Team,
    pub piece_id: u8,
}

/// Complete state of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub layout: Layout,
    pub rosters: [Roster; 2],
    /// Flags by owning team.
    pub flags: [Flag; 2],
    /// Whether each team's no-guard zone currently restricts its own pieces.
    pub zone_active: [bool; 2],
    pub keys: [RescueKey; 2],
    pub pending_resets: Vec<PendingReset>,
    /// Number of the next round to execute, starting at 1.
    pub round: u32,
    pub status: Status,
    pub winner: Option<Team>,
    /// Milliseconds since the Unix epoch when the last round executed.
    pub updated_at_ms: u64,
    pub history: Vec<RoundRecord>,
}

impl GameState {
    /// Creates a waiting game with every piece on its start cell.
    pub fn new(layout: Layout) -> Self {
        let rosters = [
            Roster::new(layout.starts(Team::Red)),
            Roster::new(layout.starts(Team::Blue)),
        ];
        let flags = [
            Flag::at_spawn(layout.flag_spawn(Team::Red)),
            Flag::at_spawn(layout.flag_spawn(Team::Blue)),
        ];
        let keys = [
            RescueKey {
                spawn: layout.key_spawn(Team::Red),
                pos: None,
            },
            RescueKey {
                spawn: layout.key_spawn(Team::Blue),
                pos: None,
            },
        ];
        GameState {
            layout,
            rosters,
            flags,
            zone_active: [true, true],
            keys,
            pending_resets: Vec::new(),
            round: 1,
            status: Status::Waiting,
            winner: None,
            updated_at_ms: 0,
            history: Vec::new(),
        }
    }

    pub fn roster(&self, team: Team) -> &Roster {
        &self.rosters[team.index()]
    }

    pub fn roster_mut(&mut self, team: Team) -> &mut Roster {
        &mut self.rosters[team.index()]
    }

    pub fn piece(&self, team: Team, id: u8) -> Option<&Piece> {
        self.roster(team).get(id)
    }

    pub fn piece_mut(&mut self, team: Team, id: u8) -> Option<&mut Piece> {
        self.roster_mut(team).get_mut(id)
    }

    /// The flag owned by `team`.
    pub fn flag(&self, team: Team) -> &Flag {
        &self.flags[team.index()]
    }

    pub fn flag_mut(&mut self, team: Team) -> &mut Flag {
        &mut self.flags[team.index()]
    }

    pub fn key(&self, team: Team) -> &RescueKey {
        &self.keys[team.index()]
    }

    pub fn is_zone_active(&self, team: Team) -> bool {
        self.zone_active[team.index()]
    }

    /// Returns true if the given cell lies in `team`'s active no-guard zone.
    pub fn blocks_own_entry(&self, team: Team, cell: Cell) -> bool {
        self.is_zone_active(team) && self.layout.zone(team).contains(cell)
    }

    /// Returns the flag owner whose flag this piece is carrying, if any.
    pub fn carried_flag(&self, team: Team, piece_id: u8) -> Option<Team> {
        let owner = team.opponent();
        match self.flag(owner).carrier {
            Some(c) if c.team == team && c.piece_id == piece_id => Some(owner),
            _ => None,
        }
    }

    /// Places a piece directly, bypassing movement rules. Intended for
    /// setting up positions.
    pub fn place(&mut self, team: Team, id: u8, cell: Cell) -> bool {
        match self.piece_mut(team, id) {
            Some(p) => {
                p.pos = cell;
                true
            }
            None => false,
        }
    }

    /// True once a round can no longer execute.
    pub fn is_finished(&self) -> bool {
        self.status == Status::Finished
    }
}
