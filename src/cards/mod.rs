mod card;
mod format;

pub use card::*;
pub use format::*;
