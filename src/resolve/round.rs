//! Round orchestration.
//!
//! Runs the fixed per-round pipeline over a `GameState`:
//! - send pending rescuers home
//! - compute movement paths
//! - detect collisions and commit final positions
//! - jail tagged pieces, returning any flag they carried
//! - flag pickup, follow and capture check
//! - rescue-key pass and rescues
//! - win check, history append, round counter advance
//!
//! The orchestrator owns no spatial rules itself.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, info};

use super::{collision, flag, movement, rescue};
use crate::board::history::snapshot_roster;
use crate::board::{
    Event, GameState, RoundCommands, RoundRecord, ScoreBreakdown, Status, Team, TeamScore, ALL_TEAMS,
};

/// Errors returned when a round cannot run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoundError {
    #[error("round {round} cannot execute while the game is {status}")]
    NotPlaying { round: u32, status: Status },
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Tallies both teams after the round's events.
fn score(state: &GameState, events: &[Event], captured: &[Team]) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::default();
    for team in ALL_TEAMS {
        let roster = state.roster(team);
        let tags = events
            .iter()
            .filter(|e| matches!(e, Event::Jailed { team: t, .. } if *t == team.opponent()))
            .count();
        let rescued: usize = events
            .iter()
            .map(|e| match e {
                Event::Rescued { team: t, freed, .. } if *t == team => freed.len(),
                _ => 0,
            })
            .sum();
        breakdown.teams[team.index()] = TeamScore {
            alive: u8::try_from(roster.alive().count()).unwrap_or(u8::MAX),
            jailed: u8::try_from(roster.jailed_count()).unwrap_or(u8::MAX),
            tags: u8::try_from(tags).unwrap_or(u8::MAX),
            rescued: u8::try_from(rescued).unwrap_or(u8::MAX),
            carrying_flag: state.flag(team.opponent()).carrier.is_some_and(|c| c.team == team),
            captured_flag: captured.contains(&team),
        };
    }
    breakdown
}

/// Executes one round with the given commands and appends its record.
///
/// Only a `Playing` game advances; any other status is rejected without
/// touching the state. Returns the new history entry.
pub fn execute_round(state: &mut GameState, commands: RoundCommands) -> Result<&RoundRecord, RoundError> {
    if state.status != Status::Playing {
        return Err(RoundError::NotPlaying {
            round: state.round,
            status: state.status,
        });
    }
    let round = state.round;
    let mut events = Vec::new();

    rescue::apply_pending_resets(state, &mut events);
    let before = [
        snapshot_roster(state.roster(Team::Red)),
        snapshot_roster(state.roster(Team::Blue)),
    ];

    let paths = movement::resolve_paths(state, &commands, &mut events);
    let collisions = collision::detect(&paths);
    movement::commit_positions(state, &paths, &collisions);

    let mut drops = Vec::new();
    let jailings = collision::resolve(state, &collisions, |state, team, piece_id| {
        flag::drop_carried(state, team, piece_id, &mut drops);
    });
    events.extend(jailings);
    events.append(&mut drops);

    flag::pickup(state, &mut events);
    flag::follow(state, &mut events);
    let captured = flag::captures(state);

    rescue::update_keys(state, &mut events);
    rescue::collect_keys(state, &mut events);

    for &team in &captured {
        let piece_id = state
            .flag(team.opponent())
            .carrier
            .map_or(0, |c| c.piece_id);
        events.push(Event::FlagCaptured { team, piece_id });
    }
    match captured.as_slice() {
        [] => {}
        [team] => {
            state.status = Status::Finished;
            state.winner = Some(*team);
            info!(round, winner = %team, "flag captured, game over");
        }
        _ => {
            state.status = Status::Finished;
            state.winner = None;
            info!(round, "both flags captured in one round, game drawn");
        }
    }

    let record = RoundRecord {
        round,
        commands,
        before,
        after: [
            snapshot_roster(state.roster(Team::Red)),
            snapshot_roster(state.roster(Team::Blue)),
        ],
        collisions,
        score: score(state, &events, &captured),
        events,
    };
    debug!(round, events = record.events.len(), "round resolved");
    state.history.push(record);
    state.round += 1;
    state.updated_at_ms = now_ms();

    let last = state.history.len() - 1;
    Ok(&state.history[last])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, Direction, Layout, Move};

    fn playing() -> GameState {
        let mut s = GameState::new(Layout::standard());
        s.status = Status::Playing;
        s
    }

    #[test]
    fn rejects_rounds_unless_playing() {
        for status in [Status::Waiting, Status::Paused, Status::Finished] {
            let mut s = GameState::new(Layout::standard());
            s.status = status;
            let err = execute_round(&mut s, RoundCommands::default()).unwrap_err();
            assert_eq!(err, RoundError::NotPlaying { round: 1, status });
            assert_eq!(s.round, 1);
            assert!(s.history.is_empty());
        }
    }

    #[test]
    fn empty_round_still_advances() {
        let mut s = playing();
        let record = execute_round(&mut s, RoundCommands::default()).unwrap();
        assert_eq!(record.round, 1);
        assert!(record.collisions.is_empty());
        assert_eq!(record.before, record.after);
        assert_eq!(s.round, 2);
        assert_eq!(s.history.len(), 1);
        assert!(s.updated_at_ms > 0);
    }

    #[test]
    fn record_captures_before_and_after() {
        let mut s = playing();
        let cmds = RoundCommands::new(vec![Move::new(1, Direction::Down, 2)], vec![]);
        let record = execute_round(&mut s, cmds.clone()).unwrap();
        assert_eq!(record.commands, cmds);
        assert_eq!(record.before[0][0].pos, Cell::new(2, 5));
        assert_eq!(record.after[0][0].pos, Cell::new(2, 7));
    }

    #[test]
    fn carrier_reaching_home_wins() {
        let mut s = playing();
        s.zone_active[Team::Blue.index()] = false;
        s.place(Team::Red, 1, Cell::new(4, 9));
        s.flag_mut(Team::Blue).carrier = Some(crate::board::Carrier {
            team: Team::Red,
            piece_id: 1,
        });
        let cmds = RoundCommands::new(vec![Move::new(1, Direction::Up, 1)], vec![]);
        let record = execute_round(&mut s, cmds).unwrap();
        assert!(record.score.team(Team::Red).captured_flag);
        assert_eq!(s.status, Status::Finished);
        assert_eq!(s.winner, Some(Team::Red));
        assert_eq!(s.flag(Team::Blue).pos, Cell::new(4, 8));
        assert!(execute_round(&mut s, RoundCommands::default()).is_err());
    }

    #[test]
    fn simultaneous_captures_draw() {
        let mut s = playing();
        s.place(Team::Red, 1, Cell::new(4, 8));
        s.place(Team::Blue, 1, Cell::new(15, 11));
        s.flag_mut(Team::Blue).carrier = Some(crate::board::Carrier {
            team: Team::Red,
            piece_id: 1,
        });
        s.flag_mut(Team::Red).carrier = Some(crate::board::Carrier {
            team: Team::Blue,
            piece_id: 1,
        });
        execute_round(&mut s, RoundCommands::default()).unwrap();
        assert_eq!(s.status, Status::Finished);
        assert_eq!(s.winner, None);
    }
}
