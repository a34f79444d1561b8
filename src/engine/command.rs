use crate::cards::Card;
use crate::session::Snapshot;
use crate::session::TeamKey;
use tokio::sync::oneshot;

/// Requests queued for the arena, applied one at a time in arrival order.
#[derive(Debug)]
pub enum Command {
    Read { slot: TeamKey, card: Card },
    Point(TeamKey),
    Unpoint(TeamKey),
    Sweep,
    Peek(oneshot::Sender<Snapshot>),
    Stop,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Read { slot, card } => write!(f, "read {} on {}", card, slot),
            Self::Point(team) => write!(f, "point {}", team),
            Self::Unpoint(team) => write!(f, "unpoint {}", team),
            Self::Sweep => write!(f, "sweep"),
            Self::Peek(_) => write!(f, "peek"),
            Self::Stop => write!(f, "stop"),
        }
    }
}
