//! JSON state snapshots for observers.
//!
//! The core never transmits anything itself; these helpers produce the
//! serialized view a transport layer forwards after each round.

use serde::Serialize;

use crate::board::{Flag, GameState, PendingReset, RescueKey, Roster, RoundRecord, Status, Team};

/// One team's slice of the snapshot.
#[derive(Debug, Serialize)]
pub struct TeamView<'a> {
    pub roster: &'a Roster,
    pub flag: &'a Flag,
    pub zone_active: bool,
    pub key: &'a RescueKey,
}

/// Everything an observer needs after a round, without layout or history.
#[derive(Debug, Serialize)]
pub struct StateSnapshot<'a> {
    pub round: u32,
    pub status: Status,
    pub winner: Option<Team>,
    pub updated_at_ms: u64,
    pub red: TeamView<'a>,
    pub blue: TeamView<'a>,
    pub pending_resets: &'a [PendingReset],
}

impl<'a> StateSnapshot<'a> {
    pub fn new(state: &'a GameState) -> Self {
        let view = |team: Team| TeamView {
            roster: state.roster(team),
            flag: state.flag(team),
            zone_active: state.is_zone_active(team),
            key: state.key(team),
        };
        StateSnapshot {
            round: state.round,
            status: state.status,
            winner: state.winner,
            updated_at_ms: state.updated_at_ms,
            red: view(Team::Red),
            blue: view(Team::Blue),
            pending_resets: &state.pending_resets,
        }
    }
}

/// Serializes the observer view of `state` as a single JSON line.
pub fn state_json(state: &GameState) -> serde_json::Result<String> {
    serde_json::to_string(&StateSnapshot::new(state))
}

/// Serializes one history record as a single JSON line.
pub fn record_json(record: &RoundRecord) -> serde_json::Result<String> {
    serde_json::to_string(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Layout;

    #[test]
    fn snapshot_has_expected_shape() {
        let state = GameState::new(Layout::standard());
        let json = state_json(&state).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["round"], 1);
        assert_eq!(value["status"], "waiting");
        assert!(value["winner"].is_null());
        assert_eq!(value["red"]["roster"]["pieces"].as_array().unwrap().len(), 5);
        assert_eq!(value["blue"]["flag"]["pos"]["x"], 9);
        assert_eq!(value["blue"]["zone_active"], true);
        assert!(value["red"]["key"]["pos"].is_null());
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let event = crate::board::Event::KeyRemoved { team: Team::Blue };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"kind":"key_removed","team":"blue"}"#);
    }
}
