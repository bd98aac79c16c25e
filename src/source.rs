//! Command sources.
//!
//! Anything that produces a team's moves for a round implements
//! `CommandSource`, whether it is a human session, a scripted opponent or a
//! remote model. The room only sees the resulting move list.

use std::collections::HashSet;

use thiserror::Error;

use crate::board::{Cell, Direction, GameState, Move, Team};

/// Errors a command source may report. They never reach round resolution;
/// the room substitutes an empty move list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("command source unavailable: {0}")]
    Unavailable(String),

    #[error("command source failed: {0}")]
    Failed(String),
}

/// What a source is asked to produce.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub room_id: u64,
    pub round: u32,
    pub team: Team,
    /// Snapshot of the game when the request was made.
    pub state: GameState,
}

/// Produces one team's moves for a round.
pub trait CommandSource: Send + Sync {
    fn generate(&self, request: &CommandRequest) -> Result<Vec<Move>, SourceError>;
}

impl<F> CommandSource for F
where
    F: Fn(&CommandRequest) -> Result<Vec<Move>, SourceError> + Send + Sync,
{
    fn generate(&self, request: &CommandRequest) -> Result<Vec<Move>, SourceError> {
        self(request)
    }
}

/// Filters a move list down to what the core accepts: known alive pieces,
/// positive distances, one move per piece.
pub fn sanitize(state: &GameState, team: Team, moves: Vec<Move>) -> Vec<Move> {
    let roster = state.roster(team);
    let mut seen = HashSet::new();
    moves
        .into_iter()
        .filter(|m| m.distance > 0 && roster.is_alive(m.piece_id) && seen.insert(m.piece_id))
        .collect()
}

/// A deterministic opponent: carriers run home, the piece nearest an
/// active rescue key goes for it, everyone else heads for the enemy flag.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedSource {
    /// Longest distance issued in a single move.
    pub max_step: u32,
}

impl Default for ScriptedSource {
    fn default() -> Self {
        ScriptedSource { max_step: 3 }
    }
}

impl ScriptedSource {
    fn home_row(state: &GameState, team: Team, from: Cell) -> Cell {
        let band = state.layout.territories[team.index()];
        let y = from.y.clamp(band.first, band.last);
        Cell::new(from.x, y)
    }

    /// Picks a single straight move from `from` toward `to`, preferring the
    /// longer axis and avoiding the team's own active zone.
    fn step_toward(&self, state: &GameState, team: Team, from: Cell, to: Cell) -> Option<(Direction, u32)> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let vertical = (dy != 0).then(|| (if dy < 0 { Direction::Up } else { Direction::Down }, dy.unsigned_abs()));
        let horizontal =
            (dx != 0).then(|| (if dx < 0 { Direction::Left } else { Direction::Right }, dx.unsigned_abs()));
        let ordered = if dy.abs() >= dx.abs() {
            [vertical, horizontal]
        } else {
            [horizontal, vertical]
        };
        ordered
            .into_iter()
            .flatten()
            .find(|&(dir, _)| !state.blocks_own_entry(team, from.step(dir)))
            .map(|(dir, dist)| (dir, dist.min(self.max_step)))
    }
}

impl CommandSource for ScriptedSource {
    fn generate(&self, request: &CommandRequest) -> Result<Vec<Move>, SourceError> {
        let state = &request.state;
        let team = request.team;
        let roster = state.roster(team);

        let key_runner = state.key(team).pos.and_then(|key| {
            roster
                .alive()
                .min_by_key(|p| (p.pos.distance(key), p.id))
                .map(|p| (p.id, key))
        });
        let target_flag = state.flag(team.opponent()).pos;

        let mut moves = Vec::new();
        for piece in roster.alive() {
            let target = if state.carried_flag(team, piece.id).is_some() {
                Self::home_row(state, team, piece.pos)
            } else if let Some((_, key)) = key_runner.filter(|&(id, _)| id == piece.id) {
                key
            } else {
                target_flag
            };
            if let Some((direction, distance)) = self.step_toward(state, team, piece.pos, target) {
                moves.push(Move::new(piece.id, direction, distance));
            }
        }
        Ok(moves)
    }
}
