//! Round-indexed command queue.
//!
//! Commands may arrive at any time and target the next round or an explicit
//! future round. An entry is removed when its round executes; submissions
//! aimed at a round that has already executed are rejected.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::board::{Move, RoundCommands, Team};

/// Errors returned by command submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("round {target} has already executed (next round is {next})")]
    RoundAlreadyExecuted { target: u32, next: u32 },
}

/// Pending commands keyed by round number.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    entries: BTreeMap<u32, RoundCommands>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `team`'s moves for `target` (or `next_round` when None),
    /// replacing any earlier submission by that team for that round.
    /// Returns the round the moves were queued for.
    pub fn submit(&mut self, next_round: u32, team: Team, target: Option<u32>, moves: Vec<Move>) -> Result<u32, QueueError> {
        let target = target.unwrap_or(next_round);
        if target < next_round {
            return Err(QueueError::RoundAlreadyExecuted {
                target,
                next: next_round,
            });
        }
        *self.entries.entry(target).or_default().for_team_mut(team) = moves;
        Ok(target)
    }

    /// Removes and returns the commands for `round`. Missing teams are empty.
    pub fn take(&mut self, round: u32) -> RoundCommands {
        self.entries.remove(&round).unwrap_or_default()
    }

    /// Returns true if `team` has submitted moves for `round`.
    pub fn has_submitted(&self, round: u32, team: Team) -> bool {
        self.entries
            .get(&round)
            .is_some_and(|c| !c.for_team(team).is_empty())
    }

    /// Drops every entry for rounds before `round`.
    pub fn discard_before(&mut self, round: u32) {
        self.entries = self.entries.split_off(&round);
    }

    pub fn pending_rounds(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
