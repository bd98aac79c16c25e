//! flagrun: a round-based capture-the-flag simulation.
//!
//! Two teams of up to five pieces issue straight-line moves each round. The
//! `resolve` module turns one round of moves into paths, tags, flag pickups,
//! captures and rescues. `room` wraps a game in a status machine with a
//! command queue and background opponent generation, and `protocol` gives it
//! a line-oriented text interface used by the `flagrun` binary.

pub mod board;
pub mod config;
pub mod logging;
pub mod protocol;
pub mod queue;
pub mod referee;
pub mod resolve;
pub mod room;
pub mod selfplay;
pub mod source;
