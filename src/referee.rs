//! Referee session state.
//!
//! Drives a single room from line commands: holds the lobby, the id of the
//! current room and the scripted opponent used by `auto`. Each handler
//! writes its response lines to the supplied writer.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::board::{Layout, Status};
use crate::config::RoomConfig;
use crate::protocol::{parse_command, record_json, state_json, Command};
use crate::room::{Lobby, RoomError, RoomId};
use crate::source::{CommandSource, ScriptedSource};

/// Longest the `sync` command waits for background generation.
const SYNC_TIMEOUT: Duration = Duration::from_secs(5);

/// Holds the mutable state of a referee session between commands.
pub struct Referee {
    lobby: Lobby,
    room: RoomId,
    layout: Layout,
    config: RoomConfig,
    source: Arc<dyn CommandSource>,
}

fn json_error(e: serde_json::Error) -> io::Error {
    io::Error::other(e)
}

impl Referee {
    /// Creates a session with one waiting room.
    pub fn new(layout: Layout, config: RoomConfig) -> Self {
        let mut lobby = Lobby::new();
        let room = lobby.create_room(layout.clone(), config.clone());
        Referee {
            lobby,
            room,
            layout,
            config,
            source: Arc::new(ScriptedSource::default()),
        }
    }

    /// Replaces the opponent used by `auto`.
    pub fn set_source(&mut self, source: Arc<dyn CommandSource>) {
        self.source = source;
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    pub fn room_id(&self) -> RoomId {
        self.room
    }

    fn write_result<W: Write>(out: &mut W, result: Result<Status, RoomError>) -> io::Result<()> {
        match result {
            Ok(status) => writeln!(out, "ok {status}"),
            Err(e) => writeln!(out, "error {e}"),
        }
    }

    /// Parses and handles one input line. A recognised command with bad
    /// arguments gets an `error` response; unknown lines are ignored.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<bool> {
        match parse_command(line) {
            Ok(Some(cmd)) => self.handle(cmd, out),
            Ok(None) => Ok(true),
            Err(e) => {
                debug!(line, error = %e, "malformed command");
                writeln!(out, "error {e}")?;
                out.flush()?;
                Ok(true)
            }
        }
    }

    /// Handles one command. Returns false when the session should end.
    pub fn handle<W: Write>(&mut self, cmd: Command, out: &mut W) -> io::Result<bool> {
        self.lobby.poll_completions();
        let id = self.room;
        let Some(room) = self.lobby.room_mut(id) else {
            warn!(room = id, "referee room missing, opening a new one");
            self.room = self.lobby.create_room(self.layout.clone(), self.config.clone());
            writeln!(out, "error room {id} was missing")?;
            return Ok(true);
        };

        match cmd {
            Command::NewGame => {
                self.lobby.remove_room(id);
                self.room = self.lobby.create_room(self.layout.clone(), self.config.clone());
                writeln!(out, "ok {}", Status::Waiting)?;
            }
            Command::Start => {
                let result = room.start().map(|()| room.state().status);
                Self::write_result(out, result)?;
            }
            Command::Pause => {
                let result = room.pause().map(|()| room.state().status);
                Self::write_result(out, result)?;
            }
            Command::Resume => {
                let result = room.resume().map(|()| room.state().status);
                Self::write_result(out, result)?;
            }
            Command::Abandon => {
                let result = room.abandon().map(|()| room.state().status);
                Self::write_result(out, result)?;
            }
            Command::Orders { team, round, moves } => match room.submit(team, round, moves) {
                Ok(target) => writeln!(out, "queued {team} {target}")?,
                Err(e) => writeln!(out, "error {e}")?,
            },
            Command::Auto { team } => match self.lobby.request_moves(id, team, Arc::clone(&self.source)) {
                Ok(true) => writeln!(out, "generating {team}")?,
                Ok(false) => writeln!(out, "busy")?,
                Err(e) => writeln!(out, "error {e}")?,
            },
            Command::Sync => {
                let generating = self.lobby.room(id).is_some_and(|r| r.is_generating());
                if generating && self.lobby.wait_for_completion(SYNC_TIMEOUT) == 0 {
                    writeln!(out, "error generation still running")?;
                } else {
                    writeln!(out, "synced")?;
                }
            }
            Command::Tick => match room.tick() {
                Some(record) => {
                    let (round, collisions) = (record.round, record.collisions.len());
                    let state = room.state();
                    writeln!(out, "round {round} collisions {collisions} status {}", state.status)?;
                    if state.is_finished() {
                        match state.winner {
                            Some(team) => writeln!(out, "winner {team}")?,
                            None => writeln!(out, "winner none")?,
                        }
                    }
                }
                None => writeln!(out, "error room is {}", room.state().status)?,
            },
            Command::State => {
                let json = state_json(room.state()).map_err(json_error)?;
                writeln!(out, "state {json}")?;
            }
            Command::History => {
                for record in &room.state().history {
                    let json = record_json(record).map_err(json_error)?;
                    writeln!(out, "history {json}")?;
                }
            }
            Command::Quit => {
                out.flush()?;
                return Ok(false);
            }
        }
        out.flush()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Direction, Move};
    use crate::protocol::parse_command;
    use crate::source::{CommandRequest, SourceError};

    fn run(referee: &mut Referee, lines: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        for line in lines {
            if let Ok(Some(cmd)) = parse_command(line) {
                if !referee.handle(cmd, &mut out).unwrap() {
                    break;
                }
            }
        }
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn referee() -> Referee {
        Referee::new(Layout::standard(), RoomConfig::default())
    }

    #[test]
    fn start_then_tick() {
        let mut r = referee();
        let lines = run(&mut r, &["start", "orders red 1d2", "tick"]);
        assert_eq!(lines, vec!["ok playing", "queued red 1", "round 1 collisions 0 status playing"]);
    }

    #[test]
    fn tick_before_start_is_an_error() {
        let mut r = referee();
        assert_eq!(run(&mut r, &["tick"]), vec!["error room is waiting"]);
    }

    #[test]
    fn state_line_is_json() {
        let mut r = referee();
        let lines = run(&mut r, &["state"]);
        let json = lines[0].strip_prefix("state ").unwrap();
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["round"], 1);
    }

    #[test]
    fn newgame_replaces_room() {
        let mut r = referee();
        run(&mut r, &["start", "tick"]);
        let old = r.room_id();
        let lines = run(&mut r, &["newgame", "state"]);
        assert_eq!(lines[0], "ok waiting");
        assert_ne!(r.room_id(), old);
        assert_eq!(r.lobby().len(), 1);
    }

    #[test]
    fn auto_then_sync_queues_moves() {
        let mut r = referee();
        r.set_source(Arc::new(|_: &CommandRequest| -> Result<Vec<Move>, SourceError> {
            Ok(vec![Move::new(2, Direction::Down, 1)])
        }));
        let lines = run(&mut r, &["start", "auto blue", "sync", "tick", "history"]);
        assert_eq!(lines[1], "generating blue");
        assert_eq!(lines[2], "synced");
        let json = lines[4].strip_prefix("history ").unwrap();
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["commands"]["blue"][0]["piece_id"], 2);
        assert_eq!(value["commands"]["blue"][0]["direction"], "down");
    }

    #[test]
    fn malformed_lines_get_an_error_response() {
        let mut r = referee();
        let mut out = Vec::new();
        for line in ["orders green 1u1", "bogus", "orders red 1x1", "start"] {
            assert!(r.handle_line(line, &mut out).unwrap());
        }
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["error unknown team 'green'", "error unknown direction 'x'", "ok playing"]
        );
    }

    #[test]
    fn abandon_ends_a_paused_game() {
        let mut r = referee();
        let lines = run(&mut r, &["abandon", "start", "pause", "abandon", "tick"]);
        assert_eq!(
            lines,
            vec![
                "error cannot abandon a waiting room",
                "ok playing",
                "ok paused",
                "ok finished",
                "error room is finished",
            ]
        );
    }

    #[test]
    fn quit_stops_processing() {
        let mut r = referee();
        let lines = run(&mut r, &["quit", "start"]);
        assert!(lines.is_empty());
    }
}
