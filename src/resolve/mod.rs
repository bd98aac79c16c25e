//! Round resolution.
//!
//! Resolves a round of simultaneous movement commands into new positions,
//! jailings, flag changes and rescues.

pub mod collision;
pub mod flag;
pub mod movement;
pub mod rescue;
pub mod round;

pub use collision::detect;
pub use movement::{resolve_paths, PiecePath};
pub use round::{execute_round, RoundError};
