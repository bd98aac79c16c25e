//! Collision detection and tagging resolution.
//!
//! Detection walks every pair of opposing paths step by step and reports
//! the first step at which the two share a cell. Each piece takes part in at
//! most one collision per round; earlier steps claim pieces first. Pieces
//! that reach a claimed cell on the same step join that collision.
//!
//! Resolution groups records by cell and applies, in order:
//! 1. all pieces on one team: nobody is jailed;
//! 2. the cell is a flag spawn: everybody is jailed;
//! 3. the cell is in the neutral band: everybody is jailed;
//! 4. otherwise the territory owner's pieces are safe and all others jailed.

use std::collections::BTreeMap;

use tracing::debug;

use super::movement::PiecePath;
use crate::board::{Cell, CollisionRecord, Event, GameState, Team};

/// Returns the earliest step (from 1) at which both paths share a cell.
///
/// Step 0 is the pre-round position, which the previous round already
/// resolved. Paths of different lengths are compared with the shorter one
/// held on its final cell, so a stationary piece meets every step of a mover.
fn first_meeting(a: &PiecePath, b: &PiecePath) -> Option<usize> {
    let last = a.last_step().max(b.last_step()).max(1);
    (1..=last).find(|&step| a.at(step) == b.at(step))
}

/// Finds every encounter between opposing pieces.
///
/// Candidate meetings are taken in (step, path order). A piece is claimed by
/// its first meeting; a later meeting only adds a piece when it is still
/// unclaimed and its partner was claimed at the same cell on the same step,
/// so every piece converging on one cell lands in the same group.
pub fn detect(paths: &[PiecePath]) -> Vec<CollisionRecord> {
    let mut candidates = Vec::new();
    for (i, a) in paths.iter().enumerate() {
        for (j, b) in paths.iter().enumerate().skip(i + 1) {
            if a.team == b.team {
                continue;
            }
            if let Some(step) = first_meeting(a, b) {
                candidates.push((step, i, j));
            }
        }
    }
    candidates.sort_unstable();

    let mut claimed: Vec<Option<(usize, Cell)>> = vec![None; paths.len()];
    let mut order = Vec::new();
    for (step, i, j) in candidates {
        let cell = paths[i].at(step);
        let meeting = Some((step, cell));
        match (claimed[i], claimed[j]) {
            (None, None) => {
                claimed[i] = meeting;
                claimed[j] = meeting;
                order.extend([i, j]);
            }
            (Some(c), None) if c == (step, cell) => {
                claimed[j] = meeting;
                order.push(j);
            }
            (None, Some(c)) if c == (step, cell) => {
                claimed[i] = meeting;
                order.push(i);
            }
            _ => {}
        }
    }

    order
        .into_iter()
        .filter_map(|k| {
            claimed[k].map(|(step, cell)| CollisionRecord {
                team: paths[k].team,
                piece_id: paths[k].piece_id,
                cell,
                step,
            })
        })
        .collect()
}

/// Decides which of the pieces gathered on `cell` go to jail.
pub fn jailed_on(state: &GameState, cell: Cell, present: &[(Team, u8)]) -> Vec<(Team, u8)> {
    let first_team = match present.first() {
        Some(&(team, _)) => team,
        None => return Vec::new(),
    };
    if present.iter().all(|&(team, _)| team == first_team) {
        return Vec::new();
    }
    let layout = &state.layout;
    if layout.is_flag_spawn(cell) || layout.is_neutral(cell) {
        return present.to_vec();
    }
    match layout.territory_owner(cell) {
        Some(owner) => present.iter().copied().filter(|&(team, _)| team != owner).collect(),
        None => present.to_vec(),
    }
}

/// Applies jailing for every collision group.
///
/// `on_carrier_jailed` runs once for each newly jailed piece, after it has
/// been marked jailed, so the flag lifecycle can return anything it carried.
pub fn resolve<F>(state: &mut GameState, records: &[CollisionRecord], mut on_carrier_jailed: F) -> Vec<Event>
where
    F: FnMut(&mut GameState, Team, u8),
{
    let mut groups: BTreeMap<Cell, Vec<(Team, u8)>> = BTreeMap::new();
    for r in records {
        let group = groups.entry(r.cell).or_default();
        if !group.contains(&(r.team, r.piece_id)) {
            group.push((r.team, r.piece_id));
        }
    }

    let mut events = Vec::new();
    for (cell, present) in groups {
        for (team, piece_id) in jailed_on(state, cell, &present) {
            if !state.roster_mut(team).jail(piece_id) {
                continue;
            }
            debug!(team = %team, piece = piece_id, %cell, "piece jailed");
            events.push(Event::Jailed { team, piece_id, cell });
            on_carrier_jailed(state, team, piece_id);
        }
    }
    events
}
