//! Static board geometry.
//!
//! A `Layout` fixes the board size, each team's territory band, the neutral
//! band between them, the flag spawns with their no-guard zones, the rescue
//! key spawns and the starting positions. It never changes during a game.

use serde::{Deserialize, Serialize};

use super::geometry::{Cell, Rect, RowBand};
use super::team::Team;
use crate::config::GameConfig;

/// Immutable board geometry, indexed by `Team::index()` where per-team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    pub territories: [RowBand; 2],
    pub flag_spawns: [Cell; 2],
    pub zones: [Rect; 2],
    pub key_spawns: [Cell; 2],
    pub starts: [Vec<(u8, Cell)>; 2],
}

impl Layout {
    /// The standard 20x20 board.
    pub fn standard() -> Self {
        Layout::from(&GameConfig::default())
    }

    pub const fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    /// Returns the team whose territory contains `cell`, or None for the
    /// neutral band and off-board cells.
    pub fn territory_owner(&self, cell: Cell) -> Option<Team> {
        if !self.in_bounds(cell) {
            return None;
        }
        [Team::Red, Team::Blue]
            .into_iter()
            .find(|t| self.territories[t.index()].contains_row(cell.y))
    }

    pub fn is_neutral(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && self.territory_owner(cell).is_none()
    }

    pub fn in_territory(&self, team: Team, cell: Cell) -> bool {
        self.territory_owner(cell) == Some(team)
    }

    /// Returns true if `cell` is exactly either team's flag spawn.
    pub fn is_flag_spawn(&self, cell: Cell) -> bool {
        self.flag_spawns.contains(&cell)
    }

    pub fn flag_spawn(&self, team: Team) -> Cell {
        self.flag_spawns[team.index()]
    }

    pub fn zone(&self, team: Team) -> Rect {
        self.zones[team.index()]
    }

    pub fn key_spawn(&self, team: Team) -> Cell {
        self.key_spawns[team.index()]
    }

    pub fn starts(&self, team: Team) -> &[(u8, Cell)] {
        &self.starts[team.index()]
    }
}

impl From<&GameConfig> for Layout {
    fn from(config: &GameConfig) -> Self {
        let zone = |flag: Cell| Rect::around(flag, config.zone_radius);
        let starts = |t: &crate::config::TeamConfig| -> Vec<(u8, Cell)> {
            t.starts.iter().map(|s| (s.id, s.cell)).collect()
        };
        Layout {
            width: config.width,
            height: config.height,
            territories: [config.red.territory, config.blue.territory],
            flag_spawns: [config.red.flag, config.blue.flag],
            zones: [zone(config.red.flag), zone(config.blue.flag)],
            key_spawns: [config.red.key, config.blue.key],
            starts: [starts(&config.red), starts(&config.blue)],
        }
    }
}
