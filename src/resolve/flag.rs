//! Flag lifecycle: pickup, follow, capture and return.

use tracing::{debug, info};

use crate::board::{Carrier, Event, GameState, Team, ALL_TEAMS};

/// Returns `owner`'s flag to its spawn and reactivates `owner`'s no-guard
/// zone. Alive pieces of `owner` left standing inside the zone are sent back
/// to their start cells.
pub fn return_flag(state: &mut GameState, owner: Team, events: &mut Vec<Event>) {
    let flag = state.flag_mut(owner);
    flag.pos = flag.spawn;
    flag.carrier = None;
    state.zone_active[owner.index()] = true;
    info!(flag = %owner, "flag returned to spawn");
    events.push(Event::FlagReturned { flag: owner });

    let zone = state.layout.zone(owner);
    for piece in state.roster_mut(owner).pieces.iter_mut() {
        if piece.alive && zone.contains(piece.pos) {
            piece.pos = piece.start;
            debug!(team = %owner, piece = piece.id, "moved out of reactivated zone");
            events.push(Event::Teleported {
                team: owner,
                piece_id: piece.id,
                to: piece.start,
            });
        }
    }
}

/// Returns any flag carried by the given piece. Used when the piece is
/// jailed or otherwise taken off its cell.
pub fn drop_carried(state: &mut GameState, team: Team, piece_id: u8, events: &mut Vec<Event>) {
    if let Some(owner) = state.carried_flag(team, piece_id) {
        return_flag(state, owner, events);
    }
}

/// Hands each uncarried flag to an alive opposing piece standing on it.
/// The flag owner's zone stops restricting its own pieces while carried.
pub fn pickup(state: &mut GameState, events: &mut Vec<Event>) {
    for owner in ALL_TEAMS {
        let flag = *state.flag(owner);
        if flag.is_carried() {
            continue;
        }
        let taker = owner.opponent();
        let Some(piece_id) = state.roster(taker).alive_at(flag.pos).map(|p| p.id) else {
            continue;
        };
        state.flag_mut(owner).carrier = Some(Carrier {
            team: taker,
            piece_id,
        });
        state.zone_active[owner.index()] = false;
        info!(flag = %owner, team = %taker, piece = piece_id, "flag picked up");
        events.push(Event::FlagPickedUp { flag: owner, piece_id });
    }
}

/// Moves each carried flag onto its carrier. A carrier that is missing or
/// jailed means the state is inconsistent; the flag goes back to spawn.
pub fn follow(state: &mut GameState, events: &mut Vec<Event>) {
    for owner in ALL_TEAMS {
        let Some(carrier) = state.flag(owner).carrier else {
            continue;
        };
        let carrier_pos = state
            .piece(carrier.team, carrier.piece_id)
            .filter(|p| p.alive)
            .map(|p| p.pos);
        match carrier_pos {
            Some(pos) => state.flag_mut(owner).pos = pos,
            None => return_flag(state, owner, events),
        }
    }
}

/// Returns every team whose carrier has reached its own territory.
pub fn captures(state: &GameState) -> Vec<Team> {
    ALL_TEAMS
        .into_iter()
        .filter(|&team| {
            state.flag(team.opponent()).carrier.is_some_and(|c| {
                state
                    .piece(c.team, c.piece_id)
                    .is_some_and(|p| p.alive && state.layout.in_territory(team, p.pos))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, Layout};

    fn state() -> GameState {
        GameState::new(Layout::standard())
    }

    #[test]
    fn piece_on_enemy_flag_picks_it_up() {
        let mut s = state();
        let red_flag = s.layout.flag_spawn(Team::Red);
        s.place(Team::Blue, 2, red_flag);
        let mut events = Vec::new();
        pickup(&mut s, &mut events);
        assert_eq!(
            s.flag(Team::Red).carrier,
            Some(Carrier {
                team: Team::Blue,
                piece_id: 2
            })
        );
        assert!(!s.is_zone_active(Team::Red));
        assert_eq!(events, vec![Event::FlagPickedUp { flag: Team::Red, piece_id: 2 }]);
    }

    #[test]
    fn own_flag_is_never_picked_up() {
        let mut s = state();
        let red_flag = s.layout.flag_spawn(Team::Red);
        s.place(Team::Red, 1, red_flag);
        pickup(&mut s, &mut Vec::new());
        assert!(!s.flag(Team::Red).is_carried());
    }

    #[test]
    fn jailed_piece_cannot_pick_up() {
        let mut s = state();
        let blue_flag = s.layout.flag_spawn(Team::Blue);
        s.place(Team::Red, 1, blue_flag);
        s.roster_mut(Team::Red).jail(1);
        pickup(&mut s, &mut Vec::new());
        assert!(!s.flag(Team::Blue).is_carried());
    }

    #[test]
    fn flag_follows_carrier() {
        let mut s = state();
        s.flag_mut(Team::Blue).carrier = Some(Carrier {
            team: Team::Red,
            piece_id: 3,
        });
        s.place(Team::Red, 3, Cell::new(4, 12));
        follow(&mut s, &mut Vec::new());
        assert_eq!(s.flag(Team::Blue).pos, Cell::new(4, 12));
    }

    #[test]
    fn follow_returns_flag_of_jailed_carrier() {
        let mut s = state();
        s.flag_mut(Team::Blue).carrier = Some(Carrier {
            team: Team::Red,
            piece_id: 3,
        });
        s.zone_active[Team::Blue.index()] = false;
        s.roster_mut(Team::Red).jail(3);
        let mut events = Vec::new();
        follow(&mut s, &mut events);
        let flag = s.flag(Team::Blue);
        assert!(!flag.is_carried());
        assert_eq!(flag.pos, flag.spawn);
        assert!(s.is_zone_active(Team::Blue));
        assert!(events.contains(&Event::FlagReturned { flag: Team::Blue }));
    }

    #[test]
    fn follow_returns_flag_of_unknown_carrier() {
        let mut s = state();
        s.flag_mut(Team::Blue).carrier = Some(Carrier {
            team: Team::Red,
            piece_id: 42,
        });
        follow(&mut s, &mut Vec::new());
        assert!(!s.flag(Team::Blue).is_carried());
    }

    #[test]
    fn return_teleports_defenders_out_of_zone() {
        let mut s = state();
        s.zone_active[Team::Blue.index()] = false;
        let inside = Cell::new(9, 16);
        s.place(Team::Blue, 2, inside);
        let mut events = Vec::new();
        return_flag(&mut s, Team::Blue, &mut events);
        let p = s.piece(Team::Blue, 2).unwrap();
        assert_eq!(p.pos, p.start);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::Teleported { team: Team::Blue, piece_id: 2, .. }
        )));
    }

    #[test]
    fn return_leaves_attackers_in_zone() {
        let mut s = state();
        let inside = Cell::new(9, 16);
        s.place(Team::Red, 2, inside);
        return_flag(&mut s, Team::Blue, &mut Vec::new());
        assert_eq!(s.piece(Team::Red, 2).unwrap().pos, inside);
    }

    #[test]
    fn drop_carried_only_affects_carrier() {
        let mut s = state();
        s.flag_mut(Team::Red).carrier = Some(Carrier {
            team: Team::Blue,
            piece_id: 1,
        });
        s.flag_mut(Team::Red).pos = Cell::new(3, 9);
        drop_carried(&mut s, Team::Blue, 2, &mut Vec::new());
        assert!(s.flag(Team::Red).is_carried());
        drop_carried(&mut s, Team::Blue, 1, &mut Vec::new());
        assert!(!s.flag(Team::Red).is_carried());
        assert_eq!(s.flag(Team::Red).pos, s.flag(Team::Red).spawn);
    }

    #[test]
    fn capture_requires_home_territory() {
        let mut s = state();
        s.flag_mut(Team::Blue).carrier = Some(Carrier {
            team: Team::Red,
            piece_id: 1,
        });
        s.place(Team::Red, 1, Cell::new(5, 9));
        assert!(captures(&s).is_empty());
        s.place(Team::Red, 1, Cell::new(5, 8));
        assert_eq!(captures(&s), vec![Team::Red]);
    }
}
