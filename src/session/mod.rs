//! The match at the table: teams, players and the session lifecycle.
mod game;
mod player;
mod snapshot;
mod team;

pub use game::*;
pub use player::*;
pub use snapshot::*;
pub use team::*;
