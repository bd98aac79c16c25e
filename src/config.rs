//! Game and room configuration.
//!
//! Layouts are described in JSON and validated before a `Layout` is built
//! from them. Every field has a default, so a partial document overrides
//! only what it names.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::geometry::{Cell, Rect, RowBand};
use crate::board::layout::Layout;
use crate::board::piece::MAX_PIECES_PER_TEAM;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("board dimensions must be positive, got {width}x{height}")]
    BadDimensions { width: i32, height: i32 },

    #[error("{team} territory rows {first}..={last} are outside the board")]
    TerritoryOutOfBounds { team: &'static str, first: i32, last: i32 },

    #[error("territories must be separated by a neutral band")]
    NoNeutralBand,

    #[error("{team} {what} {cell} is outside the board")]
    CellOutOfBounds {
        team: &'static str,
        what: &'static str,
        cell: Cell,
    },

    #[error("{team} flag must lie inside its own territory")]
    FlagOutsideTerritory { team: &'static str },

    #[error("{team} has {count} pieces, at most {} allowed", MAX_PIECES_PER_TEAM)]
    TooManyPieces { team: &'static str, count: usize },

    #[error("{team} has duplicate piece id {id}")]
    DuplicatePieceId { team: &'static str, id: u8 },

    #[error("{team} piece {id} starts inside its own no-guard zone")]
    StartInsideZone { team: &'static str, id: u8 },

    #[error("zone radius must be between 0 and the board size, got {0}")]
    BadZoneRadius(i32),
}

/// A piece's identity and starting cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPosition {
    pub id: u8,
    pub cell: Cell,
}

/// Per-team layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamConfig {
    pub territory: RowBand,
    pub flag: Cell,
    pub key: Cell,
    pub starts: Vec<StartPosition>,
}

/// Board layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    /// Half-width of the square no-guard zone around each flag spawn.
    pub zone_radius: i32,
    pub red: TeamConfig,
    pub blue: TeamConfig,
}

fn starts(row: i32, xs: [i32; 5]) -> Vec<StartPosition> {
    xs.iter()
        .zip(1u8..)
        .map(|(&x, id)| StartPosition {
            id,
            cell: Cell::new(x, row),
        })
        .collect()
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 20,
            height: 20,
            zone_radius: 1,
            red: TeamConfig {
                territory: RowBand::new(0, 8),
                flag: Cell::new(10, 2),
                key: Cell::new(19, 9),
                starts: starts(5, [2, 6, 10, 14, 18]),
            },
            blue: TeamConfig {
                territory: RowBand::new(11, 19),
                flag: Cell::new(9, 17),
                key: Cell::new(0, 10),
                starts: starts(14, [1, 5, 9, 13, 17]),
            },
        }
    }
}

impl GameConfig {
    /// Parses a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Validates the configuration and builds the board layout.
    pub fn layout(&self) -> Result<Layout, ConfigError> {
        self.validate()?;
        Ok(Layout::from(self))
    }

    /// Checks geometric consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::BadDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.zone_radius < 0 || self.zone_radius > self.width.max(self.height) {
            return Err(ConfigError::BadZoneRadius(self.zone_radius));
        }
        for (name, team) in [("red", &self.red), ("blue", &self.blue)] {
            self.validate_team(name, team)?;
        }

        let (r, b) = (self.red.territory, self.blue.territory);
        let gap = if r.last < b.first {
            b.first - r.last
        } else {
            r.first - b.last
        };
        if r.overlaps(b) || gap < 2 {
            return Err(ConfigError::NoNeutralBand);
        }
        Ok(())
    }

    fn validate_team(&self, name: &'static str, team: &TeamConfig) -> Result<(), ConfigError> {
        let band = team.territory;
        if band.first < 0 || band.last >= self.height || band.first > band.last {
            return Err(ConfigError::TerritoryOutOfBounds {
                team: name,
                first: band.first,
                last: band.last,
            });
        }

        let in_bounds = |c: Cell| c.x >= 0 && c.x < self.width && c.y >= 0 && c.y < self.height;
        for (what, cell) in [("flag", team.flag), ("key", team.key)] {
            if !in_bounds(cell) {
                return Err(ConfigError::CellOutOfBounds { team: name, what, cell });
            }
        }
        if !band.contains_row(team.flag.y) {
            return Err(ConfigError::FlagOutsideTerritory { team: name });
        }

        if team.starts.len() > MAX_PIECES_PER_TEAM {
            return Err(ConfigError::TooManyPieces {
                team: name,
                count: team.starts.len(),
            });
        }
        let zone = Rect::around(team.flag, self.zone_radius);
        let mut seen = HashSet::new();
        for start in &team.starts {
            if !seen.insert(start.id) {
                return Err(ConfigError::DuplicatePieceId { team: name, id: start.id });
            }
            if !in_bounds(start.cell) {
                return Err(ConfigError::CellOutOfBounds {
                    team: name,
                    what: "start",
                    cell: start.cell,
                });
            }
            if zone.contains(start.cell) {
                return Err(ConfigError::StartInsideZone { team: name, id: start.id });
            }
        }
        Ok(())
    }
}

/// Room-level settings for the surrounding scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Finish the room as a draw once this many rounds have executed.
    pub max_rounds: Option<u32>,
    /// Suggested tick cadence for the external timer, in milliseconds.
    pub round_interval_ms: u64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        RoomConfig {
            max_rounds: None,
            round_interval_ms: 1000,
        }
    }
}
