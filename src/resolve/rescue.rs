//! Rescue keys.
//!
//! Each team has its own key. The key is on the board exactly while the team
//! has pieces in jail, except that no key appears while a rescuer from that
//! team is still waiting to be sent home. An alive piece standing on its
//! own team's key frees every jailed teammate at once; the rescuer itself
//! stays on the key cell until the start of the next round.

use tracing::{debug, info};

use super::flag;
use crate::board::{Event, GameState, PendingReset, ALL_TEAMS};

/// Sends rescuers from the previous round back to their start cells.
/// Must run before movement is resolved.
pub fn apply_pending_resets(state: &mut GameState, events: &mut Vec<Event>) {
    for PendingReset { team, piece_id } in std::mem::take(&mut state.pending_resets) {
        flag::drop_carried(state, team, piece_id, events);
        let Some(piece) = state.piece_mut(team, piece_id) else {
            continue;
        };
        if !piece.alive {
            continue;
        }
        piece.pos = piece.start;
        debug!(team = %team, piece = piece_id, "rescuer sent home");
        events.push(Event::RescuerReset { team, piece_id });
    }
}

/// Spawns or removes each team's key to match its jail occupancy.
pub fn update_keys(state: &mut GameState, events: &mut Vec<Event>) {
    for team in ALL_TEAMS {
        let jailed = state.roster(team).jailed_count();
        let pending = state.pending_resets.iter().any(|p| p.team == team);
        let key = &mut state.keys[team.index()];
        match key.pos {
            None if jailed > 0 && !pending => {
                key.pos = Some(key.spawn);
                debug!(team = %team, cell = %key.spawn, "rescue key spawned");
                events.push(Event::KeySpawned { team, cell: key.spawn });
            }
            Some(_) if jailed == 0 => {
                key.pos = None;
                debug!(team = %team, "rescue key removed");
                events.push(Event::KeyRemoved { team });
            }
            _ => {}
        }
    }
}

/// Performs a rescue for every team whose alive piece stands on its key.
pub fn collect_keys(state: &mut GameState, events: &mut Vec<Event>) {
    for team in ALL_TEAMS {
        let Some(cell) = state.key(team).pos else {
            continue;
        };
        if state.roster(team).jailed_count() == 0 {
            continue;
        }
        let Some(rescuer) = state.roster(team).alive_at(cell).map(|p| p.id) else {
            continue;
        };

        let freed = state.roster_mut(team).release_all();
        state.keys[team.index()].pos = None;
        state.pending_resets.push(PendingReset {
            team,
            piece_id: rescuer,
        });
        info!(team = %team, rescuer, freed = freed.len(), "jail rescue");
        events.push(Event::Rescued { team, rescuer, freed });
    }
}
