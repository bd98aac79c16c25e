//! Movement path computation.
//!
//! Every alive piece gets a path: the ordered cells it occupies during the
//! round, step 0 being its pre-round cell. Commanded pieces advance one cell
//! at a time and stop early on the board edge, at their own active no-guard
//! zone, or on entering a cell held by an opposing piece before the round.

use std::collections::HashSet;

use tracing::debug;

use crate::board::{
    Cell, CollisionRecord, DropReason, Event, GameState, Move, RoundCommands, Team, ALL_TEAMS,
};

/// The cells one piece occupies during a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiecePath {
    pub team: Team,
    pub piece_id: u8,
    /// Non-empty; `cells[0]` is the pre-round position.
    pub cells: Vec<Cell>,
}

impl PiecePath {
    /// Position at simulated step `step`. A piece that has finished moving
    /// stays on its last cell.
    pub fn at(&self, step: usize) -> Cell {
        self.cells[step.min(self.cells.len() - 1)]
    }

    pub fn end(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    pub fn start(&self) -> Cell {
        self.cells[0]
    }

    /// Index of the last step taken.
    pub fn last_step(&self) -> usize {
        self.cells.len() - 1
    }
}

/// Traces a single commanded move.
///
/// `opponents` holds the pre-round cells of alive opposing pieces.
pub fn trace_path(state: &GameState, team: Team, start: Cell, mv: &Move, opponents: &HashSet<Cell>) -> Vec<Cell> {
    let mut cells = vec![start];
    let mut current = start;
    for _ in 0..mv.distance {
        let next = current.step(mv.direction);
        if !state.layout.in_bounds(next) {
            break;
        }
        if state.blocks_own_entry(team, next) {
            break;
        }
        cells.push(next);
        current = next;
        if opponents.contains(&next) {
            break;
        }
    }
    cells
}

/// Selects at most one valid move per alive piece, in submission order.
fn accepted_moves(state: &GameState, team: Team, moves: &[Move], events: &mut Vec<Event>) -> Vec<Move> {
    let roster = state.roster(team);
    let mut seen = HashSet::new();
    let mut accepted = Vec::with_capacity(moves.len());
    for mv in moves {
        let reason = match roster.get(mv.piece_id) {
            None => Some(DropReason::UnknownPiece),
            Some(p) if !p.alive => Some(DropReason::PieceJailed),
            Some(_) if mv.distance == 0 => Some(DropReason::ZeroDistance),
            Some(_) if !seen.insert(mv.piece_id) => Some(DropReason::Duplicate),
            Some(_) => None,
        };
        match reason {
            Some(reason) => {
                debug!(team = %team, piece = mv.piece_id, ?reason, "dropping command");
                events.push(Event::CommandDropped {
                    team,
                    piece_id: mv.piece_id,
                    reason,
                });
            }
            None => accepted.push(*mv),
        }
    }
    accepted
}

/// Computes paths for every alive piece, red roster first.
///
/// Invalid commands are dropped and reported through `events`; the piece
/// they named simply holds position.
pub fn resolve_paths(state: &GameState, commands: &RoundCommands, events: &mut Vec<Event>) -> Vec<PiecePath> {
    let mut paths = Vec::new();
    for team in ALL_TEAMS {
        let opponents: HashSet<Cell> = state.roster(team.opponent()).alive().map(|p| p.pos).collect();
        let moves = accepted_moves(state, team, commands.for_team(team), events);
        for piece in state.roster(team).alive() {
            let cells = match moves.iter().find(|m| m.piece_id == piece.id) {
                Some(mv) => trace_path(state, team, piece.pos, mv, &opponents),
                None => vec![piece.pos],
            };
            paths.push(PiecePath {
                team,
                piece_id: piece.id,
                cells,
            });
        }
    }
    paths
}

/// Writes each piece's final cell back to the state. A piece involved in a
/// collision stops on the collision cell instead of its path end.
pub fn commit_positions(state: &mut GameState, paths: &[PiecePath], collisions: &[CollisionRecord]) {
    for path in paths {
        let cell = collisions
            .iter()
            .find(|c| c.team == path.team && c.piece_id == path.piece_id)
            .map_or_else(|| path.end(), |c| c.cell);
        state.place(path.team, path.piece_id, cell);
    }
}
