use crate::CARD_REGISTRATION_TIMEOUT;
use crate::PLAYER_REGISTRATION_TIMEOUT;
use crate::SESSION_TIMEOUT;
use crate::WATCHDOG_INTERVAL;
use std::time::Duration;

/// Timeouts governing the match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// How long an out-of-band card registration stays claimable.
    pub card_registration: Duration,
    /// How long a lone player waits for an opponent.
    pub lobby: Duration,
    /// How long an active match may run without a winner.
    pub session: Duration,
    /// Interval of the staleness sweep.
    pub watchdog: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            card_registration: Duration::from_secs(CARD_REGISTRATION_TIMEOUT),
            lobby: Duration::from_secs(PLAYER_REGISTRATION_TIMEOUT),
            session: Duration::from_secs(SESSION_TIMEOUT),
            watchdog: Duration::from_secs(WATCHDOG_INTERVAL),
        }
    }
}
