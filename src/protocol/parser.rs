//! Referee command parser.
//!
//! Parses lines read by the `flagrun` binary into structured `Command`
//! variants the main loop dispatches on.

use thiserror::Error;

use super::notation::{parse_moves, NotationError};
use crate::board::{Move, Team};

/// Errors for recognised commands with malformed arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing {0}")]
    MissingArgument(&'static str),

    #[error("unknown team '{0}'")]
    UnknownTeam(String),

    #[error("invalid round '{0}'")]
    InvalidRound(String),

    #[error(transparent)]
    Notation(#[from] NotationError),
}

/// A parsed referee command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Discard the current game and open a fresh waiting room.
    NewGame,

    /// Begin play.
    Start,

    Pause,

    Resume,

    /// End the game without a winner.
    Abandon,

    /// Queue moves: `orders <team> [@<round>] <move>...`.
    Orders {
        team: Team,
        round: Option<u32>,
        moves: Vec<Move>,
    },

    /// Ask the scripted opponent for `team`'s next moves in the background.
    Auto { team: Team },

    /// Wait for background move generation to finish.
    Sync,

    /// Execute the next round.
    Tick,

    /// Print the current state as JSON.
    State,

    /// Print the round history as JSON, one record per line.
    History,

    Quit,
}

fn parse_team(token: Option<&&str>) -> Result<Team, ParseError> {
    let token = token.ok_or(ParseError::MissingArgument("team"))?;
    Team::from_name(token).ok_or_else(|| ParseError::UnknownTeam((*token).to_string()))
}

/// Parses a single line of input.
///
/// Returns Ok(None) for empty lines and unrecognised commands, which the
/// referee ignores.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(None);
    };

    let cmd = match head {
        "newgame" => Command::NewGame,
        "start" => Command::Start,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "abandon" => Command::Abandon,
        "tick" => Command::Tick,
        "state" => Command::State,
        "history" => Command::History,
        "sync" => Command::Sync,
        "quit" => Command::Quit,
        "auto" => Command::Auto {
            team: parse_team(tokens.get(1))?,
        },
        "orders" => {
            let team = parse_team(tokens.get(1))?;
            let mut rest = &tokens[2..];
            let mut round = None;
            if let Some(r) = rest.first().and_then(|t| t.strip_prefix('@')) {
                round = Some(
                    r.parse::<u32>()
                        .map_err(|_| ParseError::InvalidRound(r.to_string()))?,
                );
                rest = &rest[1..];
            }
            let moves = parse_moves(&rest.join(" "))?;
            Command::Orders { team, round, moves }
        }
        _ => return Ok(None),
    };
    Ok(Some(cmd))
}
