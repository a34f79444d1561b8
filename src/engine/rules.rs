use crate::DEUCE_POINTS;
use crate::Points;
use crate::WIN_MARGIN;
use crate::WIN_POINTS;
use crate::session::TeamKey;

/// The team that has won at this score, if any.
pub fn winner(a: Points, b: Points) -> Option<TeamKey> {
    match (a, b) {
        (a, b) if a >= WIN_POINTS && a >= b + WIN_MARGIN => Some(TeamKey::A),
        (a, b) if b >= WIN_POINTS && b >= a + WIN_MARGIN => Some(TeamKey::B),
        _ => None,
    }
}

/// Whether the serve changes hands on reaching this score.
/// Every point once either side has reached deuce, every second point before.
pub fn flips(a: Points, b: Points) -> bool {
    a >= DEUCE_POINTS || b >= DEUCE_POINTS || (a + b) % 2 == 0
}

/// Serve owner after `scorer` took the point that made it `a`-`b`.
pub fn after_point(owner: Option<TeamKey>, scorer: TeamKey, a: Points, b: Points) -> Option<TeamKey> {
    match owner {
        None => Some(scorer),
        Some(owner) if flips(a, b) => Some(owner.other()),
        Some(owner) => Some(owner),
    }
}

/// Serve owner after a point is taken back from `a`-`b` (the score before removal).
/// Exactly undoes [`after_point`].
pub fn after_undo(owner: Option<TeamKey>, a: Points, b: Points) -> Option<TeamKey> {
    match owner {
        _ if a + b <= 1 => None,
        Some(owner) if flips(a, b) => Some(owner.other()),
        owner => owner,
    }
}
