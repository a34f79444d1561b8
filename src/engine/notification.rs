use crate::cards::Card;
use crate::session::Identity;
use crate::session::MatchRecord;
use crate::session::PlayerSnapshot;
use crate::session::Snapshot;
use crate::session::TeamKey;
use std::time::Duration;

/// Why a button press changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// The match has not started and the press did not count as ready.
    NotStarted,
    /// The team has no point to take back.
    NoPoints,
}

/// Lifecycle events sent to listeners. Every card read and every button
/// press that is refused produces exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    RegistrationExpired {
        card: Card,
        identity: Identity,
    },
    CardRegistered {
        card: Card,
        identity: Identity,
    },
    RegistrationConflict {
        card: Card,
        identity: Identity,
        owner: Identity,
    },
    UnregisteredCard {
        slot: TeamKey,
        card: Card,
    },
    AlreadyInSession {
        identity: Identity,
    },
    SessionBusy {
        identity: Identity,
        remaining: Duration,
    },
    TeamFull {
        identity: Identity,
        team: TeamKey,
    },
    PlayerRegistered {
        player: PlayerSnapshot,
        team: TeamKey,
    },
    SessionStarted(Snapshot),
    SessionEnded(MatchRecord),
    SessionTimeout(Snapshot),
    PointRefused {
        team: TeamKey,
        reason: Refusal,
    },
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::RegistrationExpired { card, identity } => {
                write!(f, "registration of {} for {} timed out", card, identity)
            }
            Self::CardRegistered { card, identity } => {
                write!(f, "card {} registered to {}", card, identity)
            }
            Self::RegistrationConflict {
                card,
                identity,
                owner,
            } => write!(
                f,
                "card {} requested by {} already belongs to {}",
                card, identity, owner
            ),
            Self::UnregisteredCard { slot, card } => {
                write!(f, "unregistered card {} on side {}", card, slot)
            }
            Self::AlreadyInSession { identity } => write!(f, "{} is already in the session", identity),
            Self::SessionBusy {
                identity,
                remaining,
            } => write!(
                f,
                "{} must wait, session busy for up to {}s",
                identity,
                remaining.as_secs()
            ),
            Self::TeamFull { identity, team } => write!(f, "team {} is full, {} refused", team, identity),
            Self::PlayerRegistered { player, team } => {
                write!(f, "{} ({}) joined team {}", player.identity, player.elo, team)
            }
            Self::SessionStarted(s) => write!(
                f,
                "session {} started, quality {:.3}",
                s.id,
                s.quality.unwrap_or_default()
            ),
            Self::SessionEnded(r) => write!(
                f,
                "session {} won by {} {}-{}",
                r.id, r.winner, r.points[0], r.points[1]
            ),
            Self::SessionTimeout(s) => write!(f, "session {} timed out", s.id),
            Self::PointRefused { team, reason } => match reason {
                Refusal::NotStarted => write!(f, "point for {} refused, session not started", team),
                Refusal::NoPoints => write!(f, "point for {} refused, no points to remove", team),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn displays() {
        let n = Notification::SessionBusy {
            identity: "ada".into(),
            remaining: Duration::from_secs(42),
        };
        assert_eq!(n.to_string(), "ada must wait, session busy for up to 42s");
        let n = Notification::PointRefused {
            team: TeamKey::B,
            reason: Refusal::NoPoints,
        };
        assert_eq!(n.to_string(), "point for B refused, no points to remove");
    }
}
