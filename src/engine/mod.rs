//! Match lifecycle: scoring rules, the engine state machine and the async
//! arena that feeds it from readers, buttons and the watchdog.
mod arena;
mod clock;
mod command;
mod config;
mod directory;
#[allow(clippy::module_inception)]
mod engine;
mod handle;
mod listener;
mod mirror;
mod notification;
pub mod rules;

pub use arena::*;
pub use clock::*;
pub use command::*;
pub use config::*;
pub use directory::*;
pub use engine::*;
pub use handle::*;
pub use listener::*;
pub use mirror::*;
pub use notification::*;
