//! Rating calculators: ELO, two-team skill rating and the per-scheme facade.
mod elo;
mod gaussian;
mod ratings;
mod skill;
mod trueskill;

pub use elo::*;
pub use gaussian::*;
pub use ratings::*;
pub use skill::*;
pub use trueskill::*;
