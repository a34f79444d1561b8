//! Card readers: device discovery, per-protocol decoding and the
//! multiplexed read loop that turns raw bytes into card events.
mod device;
mod error;
mod keymap;
mod keystream;
mod linestream;
mod listener;
mod port;
mod session;
mod signal;

pub use device::*;
pub use error::*;
pub use keymap::*;
pub use keystream::*;
pub use linestream::*;
pub use listener::*;
pub use port::*;
pub use session::*;
pub use signal::*;
