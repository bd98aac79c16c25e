//! Rooms and the lobby that owns them.
//!
//! A `Room` wraps one game: its status machine, its command queue and the
//! guard for background opponent generation. The `Lobby` owns every room,
//! dispatches generation tasks onto the rayon pool and routes their results
//! back by room id. Rooms share no mutable state and tick independently.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::board::{GameState, Layout, Move, RoundRecord, Status, Team};
use crate::config::RoomConfig;
use crate::queue::{CommandQueue, QueueError};
use crate::resolve::execute_round;
use crate::source::{sanitize, CommandRequest, CommandSource, SourceError};

pub type RoomId = u64;

/// Errors from room and lobby operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("cannot {action} a {status} room")]
    InvalidTransition { action: &'static str, status: Status },

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("no room with id {0}")]
    UnknownRoom(RoomId),
}

/// A single game and its pending input.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    config: RoomConfig,
    state: GameState,
    queue: CommandQueue,
    generating: bool,
}

impl Room {
    pub fn new(id: RoomId, layout: Layout, config: RoomConfig) -> Self {
        Room {
            id,
            config,
            state: GameState::new(layout),
            queue: CommandQueue::new(),
            generating: false,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// True while a background generation task is in flight.
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    fn transition(&mut self, action: &'static str, from: Status, to: Status) -> Result<(), RoomError> {
        if self.state.status != from {
            return Err(RoomError::InvalidTransition {
                action,
                status: self.state.status,
            });
        }
        self.state.status = to;
        info!(room = self.id, %from, %to, "room status changed");
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), RoomError> {
        self.transition("start", Status::Waiting, Status::Playing)
    }

    pub fn pause(&mut self) -> Result<(), RoomError> {
        self.transition("pause", Status::Playing, Status::Paused)
    }

    pub fn resume(&mut self) -> Result<(), RoomError> {
        self.transition("resume", Status::Paused, Status::Playing)
    }

    /// Ends a playing or paused game without a winner.
    pub fn abandon(&mut self) -> Result<(), RoomError> {
        match self.state.status {
            Status::Playing | Status::Paused => {
                let from = self.state.status;
                self.state.status = Status::Finished;
                self.state.winner = None;
                info!(room = self.id, %from, "game abandoned");
                Ok(())
            }
            status => Err(RoomError::InvalidTransition {
                action: "abandon",
                status,
            }),
        }
    }

    /// Queues moves for `team`. `target` defaults to the next round.
    pub fn submit(&mut self, team: Team, target: Option<u32>, moves: Vec<Move>) -> Result<u32, RoomError> {
        if self.state.is_finished() {
            return Err(RoomError::InvalidTransition {
                action: "submit to",
                status: self.state.status,
            });
        }
        Ok(self.queue.submit(self.state.round, team, target, moves)?)
    }

    /// Executes the next round if the room is playing.
    ///
    /// Consumes the queued commands for that round. When the configured
    /// round limit is reached the game finishes without a winner.
    pub fn tick(&mut self) -> Option<&RoundRecord> {
        if self.state.status != Status::Playing {
            return None;
        }
        let round = self.state.round;
        let commands = self.queue.take(round);
        if let Err(e) = execute_round(&mut self.state, commands) {
            warn!(room = self.id, error = %e, "round not executed");
            return None;
        }
        self.queue.discard_before(self.state.round);

        if let Some(limit) = self.config.max_rounds {
            if !self.state.is_finished() && round >= limit {
                self.state.status = Status::Finished;
                self.state.winner = None;
                info!(room = self.id, round, "round limit reached, game drawn");
            }
        }
        self.state.history.last()
    }

    /// Marks a generation task as dispatched. Returns false if one is
    /// already in flight.
    fn begin_generation(&mut self) -> bool {
        if self.generating {
            return false;
        }
        self.generating = true;
        true
    }

    /// Accepts the outcome of a generation task requested for
    /// `requested_round`.
    ///
    /// A late result goes to the current round instead. A failed task
    /// yields an empty move list. Returns the round the moves were queued
    /// for, or None if the game has finished.
    pub fn accept_generated(
        &mut self,
        team: Team,
        requested_round: u32,
        result: Result<Vec<Move>, SourceError>,
    ) -> Option<u32> {
        self.generating = false;
        let moves = match result {
            Ok(moves) => sanitize(&self.state, team, moves),
            Err(e) => {
                warn!(room = self.id, team = %team, error = %e, "move generation failed");
                Vec::new()
            }
        };
        if self.state.is_finished() {
            return None;
        }
        let target = requested_round.max(self.state.round);
        if target != requested_round {
            debug!(room = self.id, requested_round, target, "late moves retargeted");
        }
        self.queue.submit(self.state.round, team, Some(target), moves).ok()
    }
}

/// Result of a background generation task.
struct Completion {
    room_id: RoomId,
    team: Team,
    requested_round: u32,
    result: Result<Vec<Move>, SourceError>,
}

/// Owns every room and the completion channel for background tasks.
pub struct Lobby {
    rooms: HashMap<RoomId, Room>,
    next_id: RoomId,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}

impl Lobby {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Lobby {
            rooms: HashMap::new(),
            next_id: 1,
            tx,
            rx,
        }
    }

    pub fn create_room(&mut self, layout: Layout, config: RoomConfig) -> RoomId {
        let id = self.next_id;
        self.next_id += 1;
        self.rooms.insert(id, Room::new(id, layout, config));
        info!(room = id, "room created");
        id
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(&id)
    }

    /// Removes a room. Results of its in-flight tasks are discarded on arrival.
    pub fn remove_room(&mut self, id: RoomId) -> Option<Room> {
        let room = self.rooms.remove(&id);
        if room.is_some() {
            info!(room = id, "room removed");
        }
        room
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Starts generating `team`'s moves for the room's next round in the
    /// background. Returns Ok(false) when a task is already in flight.
    pub fn request_moves(&mut self, id: RoomId, team: Team, source: Arc<dyn CommandSource>) -> Result<bool, RoomError> {
        let room = self.rooms.get_mut(&id).ok_or(RoomError::UnknownRoom(id))?;
        if room.state.is_finished() {
            return Err(RoomError::InvalidTransition {
                action: "request moves for",
                status: room.state.status,
            });
        }
        if !room.begin_generation() {
            debug!(room = id, "generation already in flight");
            return Ok(false);
        }

        let request = CommandRequest {
            room_id: id,
            round: room.state.round,
            team,
            state: room.state.clone(),
        };
        let tx = self.tx.clone();
        rayon::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| source.generate(&request)))
                .unwrap_or_else(|_| Err(SourceError::Failed("command source panicked".to_string())));
            let _ = tx.send(Completion {
                room_id: request.room_id,
                team: request.team,
                requested_round: request.round,
                result,
            });
        });
        Ok(true)
    }

    fn deliver(&mut self, completion: Completion) {
        let Some(room) = self.rooms.get_mut(&completion.room_id) else {
            debug!(room = completion.room_id, "room gone, dropping generated moves");
            return;
        };
        room.accept_generated(completion.team, completion.requested_round, completion.result);
    }

    /// Applies every completed background task without blocking.
    /// Returns how many were received.
    pub fn poll_completions(&mut self) -> usize {
        let mut received = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.deliver(completion);
            received += 1;
        }
        received
    }

    /// Blocks up to `timeout` for at least one completion, then drains the
    /// rest. Returns how many were received.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => {
                self.deliver(completion);
                1 + self.poll_completions()
            }
            Err(_) => 0,
        }
    }

    /// Applies finished background work, then ticks every room in parallel.
    /// Returns `(room, round)` for each round executed, sorted by room id.
    pub fn tick_all(&mut self) -> Vec<(RoomId, u32)> {
        self.poll_completions();
        let mut ticked: Vec<(RoomId, u32)> = self
            .rooms
            .par_iter_mut()
            .filter_map(|(&id, room)| room.tick().map(|r| (id, r.round)))
            .collect();
        ticked.sort_unstable();
        ticked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, Direction};
    use std::sync::Mutex;

    fn room() -> Room {
        Room::new(7, Layout::standard(), RoomConfig::default())
    }

    /// A source that blocks until the test releases it.
    struct Gated {
        gate: Mutex<mpsc::Receiver<()>>,
        moves: Vec<Move>,
    }

    impl CommandSource for Gated {
        fn generate(&self, _: &CommandRequest) -> Result<Vec<Move>, SourceError> {
            let _ = self.gate.lock().unwrap().recv();
            Ok(self.moves.clone())
        }
    }

    fn gated(moves: Vec<Move>) -> (Arc<Gated>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        (
            Arc::new(Gated {
                gate: Mutex::new(rx),
                moves,
            }),
            tx,
        )
    }

    #[test]
    fn status_machine_transitions() {
        let mut r = room();
        assert!(r.pause().is_err());
        r.start().unwrap();
        assert_eq!(
            r.start(),
            Err(RoomError::InvalidTransition {
                action: "start",
                status: Status::Playing
            })
        );
        r.pause().unwrap();
        assert!(r.tick().is_none());
        r.resume().unwrap();
        assert!(r.tick().is_some());
    }

    #[test]
    fn abandon_finishes_from_playing_or_paused() {
        let mut r = room();
        assert_eq!(
            r.abandon(),
            Err(RoomError::InvalidTransition {
                action: "abandon",
                status: Status::Waiting
            })
        );
        r.start().unwrap();
        r.pause().unwrap();
        r.abandon().unwrap();
        assert_eq!(r.state().status, Status::Finished);
        assert_eq!(r.state().winner, None);
        assert!(r.resume().is_err());
        assert!(r.abandon().is_err());

        let mut r = room();
        r.start().unwrap();
        r.abandon().unwrap();
        assert!(r.tick().is_none());
    }

    #[test]
    fn tick_consumes_queued_commands() {
        let mut r = room();
        r.start().unwrap();
        r.submit(Team::Red, None, vec![Move::new(1, Direction::Down, 2)]).unwrap();
        r.submit(Team::Red, Some(3), vec![Move::new(1, Direction::Down, 1)]).unwrap();
        let record = r.tick().unwrap();
        assert_eq!(record.round, 1);
        assert_eq!(record.commands.red.len(), 1);
        assert_eq!(r.state().piece(Team::Red, 1).unwrap().pos, Cell::new(2, 7));
        assert_eq!(r.queue().pending_rounds().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn submit_to_past_round_is_rejected() {
        let mut r = room();
        r.start().unwrap();
        r.tick();
        assert_eq!(
            r.submit(Team::Blue, Some(1), vec![]),
            Err(RoomError::Queue(QueueError::RoundAlreadyExecuted { target: 1, next: 2 }))
        );
    }

    #[test]
    fn round_limit_finishes_as_draw() {
        let mut r = Room::new(
            1,
            Layout::standard(),
            RoomConfig {
                max_rounds: Some(2),
                ..RoomConfig::default()
            },
        );
        r.start().unwrap();
        r.tick();
        assert_eq!(r.state().status, Status::Playing);
        r.tick();
        assert_eq!(r.state().status, Status::Finished);
        assert_eq!(r.state().winner, None);
        assert!(r.tick().is_none());
        assert!(r.submit(Team::Red, None, vec![]).is_err());
    }

    #[test]
    fn late_result_is_retargeted_to_current_round() {
        let mut r = room();
        r.start().unwrap();
        r.tick();
        r.tick();
        let queued = r.accept_generated(Team::Blue, 1, Ok(vec![Move::new(2, Direction::Up, 1)]));
        assert_eq!(queued, Some(3));
        assert!(r.queue().has_submitted(3, Team::Blue));
    }

    #[test]
    fn failed_generation_queues_empty_moves() {
        let mut r = room();
        r.start().unwrap();
        r.generating = true;
        let queued = r.accept_generated(Team::Blue, 1, Err(SourceError::Failed("boom".into())));
        assert_eq!(queued, Some(1));
        assert!(!r.is_generating());
        assert!(!r.queue().has_submitted(1, Team::Blue));
    }

    #[test]
    fn generated_moves_are_sanitized() {
        let mut r = room();
        r.start().unwrap();
        r.accept_generated(
            Team::Red,
            1,
            Ok(vec![Move::new(9, Direction::Up, 1), Move::new(2, Direction::Down, 1)]),
        );
        let record = r.tick().unwrap();
        assert_eq!(record.commands.red, vec![Move::new(2, Direction::Down, 1)]);
    }

    #[test]
    fn lobby_guards_single_in_flight_task() {
        let mut lobby = Lobby::new();
        let id = lobby.create_room(Layout::standard(), RoomConfig::default());
        lobby.room_mut(id).unwrap().start().unwrap();
        let (source, release) = gated(vec![Move::new(1, Direction::Up, 1)]);

        assert_eq!(lobby.request_moves(id, Team::Blue, source.clone()), Ok(true));
        assert!(lobby.room(id).unwrap().is_generating());
        assert_eq!(lobby.request_moves(id, Team::Blue, source.clone()), Ok(false));

        release.send(()).unwrap();
        assert_eq!(lobby.wait_for_completion(Duration::from_secs(10)), 1);
        let room = lobby.room(id).unwrap();
        assert!(!room.is_generating());
        assert!(room.queue().has_submitted(1, Team::Blue));
    }

    #[test]
    fn lobby_ticks_without_waiting_for_generation() {
        let mut lobby = Lobby::new();
        let id = lobby.create_room(Layout::standard(), RoomConfig::default());
        lobby.room_mut(id).unwrap().start().unwrap();
        let (source, release) = gated(vec![Move::new(1, Direction::Up, 1)]);
        lobby.request_moves(id, Team::Blue, source).unwrap();

        assert_eq!(lobby.tick_all(), vec![(id, 1)]);
        assert_eq!(lobby.tick_all(), vec![(id, 2)]);

        release.send(()).unwrap();
        lobby.wait_for_completion(Duration::from_secs(10));
        assert!(lobby.room(id).unwrap().queue().has_submitted(3, Team::Blue));
    }

    #[test]
    fn results_for_removed_rooms_are_dropped() {
        let mut lobby = Lobby::new();
        let id = lobby.create_room(Layout::standard(), RoomConfig::default());
        let (source, release) = gated(vec![]);
        lobby.request_moves(id, Team::Red, source).unwrap();
        assert!(lobby.remove_room(id).is_some());
        release.send(()).unwrap();
        assert_eq!(lobby.wait_for_completion(Duration::from_secs(10)), 1);
        assert!(lobby.room(id).is_none());
        assert!(lobby.is_empty());
    }

    #[test]
    fn panicking_source_counts_as_failure() {
        let mut lobby = Lobby::new();
        let id = lobby.create_room(Layout::standard(), RoomConfig::default());
        let source = Arc::new(|_: &CommandRequest| -> Result<Vec<Move>, SourceError> {
            panic!("generator bug");
        });
        lobby.request_moves(id, Team::Red, source).unwrap();
        assert_eq!(lobby.wait_for_completion(Duration::from_secs(10)), 1);
        assert!(!lobby.room(id).unwrap().is_generating());
    }

    #[test]
    fn unknown_room_is_reported() {
        let mut lobby = Lobby::new();
        let source = Arc::new(crate::source::ScriptedSource::default());
        assert_eq!(
            lobby.request_moves(99, Team::Red, source),
            Err(RoomError::UnknownRoom(99))
        );
    }

    #[test]
    fn rooms_tick_independently() {
        let mut lobby = Lobby::new();
        let a = lobby.create_room(Layout::standard(), RoomConfig::default());
        let b = lobby.create_room(Layout::standard(), RoomConfig::default());
        lobby.room_mut(a).unwrap().start().unwrap();
        assert_eq!(lobby.tick_all(), vec![(a, 1)]);
        lobby.room_mut(b).unwrap().start().unwrap();
        assert_eq!(lobby.tick_all(), vec![(a, 2), (b, 1)]);
    }
}
