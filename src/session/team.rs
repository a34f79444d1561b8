use super::*;
use crate::Points;
use crate::cards::Card;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Side of the table.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamKey {
    A,
    B,
}

impl TeamKey {
    pub const ALL: [Self; 2] = [Self::A, Self::B];
    pub fn other(&self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
    pub fn index(&self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl std::fmt::Display for TeamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

impl TryFrom<&str> for TeamKey {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim() {
            "a" | "A" => Ok(Self::A),
            "b" | "B" => Ok(Self::B),
            other => Err(format!("unknown team {}", other)),
        }
    }
}

/// One side of a session: its players and its points.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    key: TeamKey,
    players: BTreeMap<Identity, SessionPlayer>,
    points: Points,
}

impl Team {
    pub fn new(key: TeamKey) -> Self {
        Self {
            key,
            players: BTreeMap::new(),
            points: 0,
        }
    }
    pub fn key(&self) -> TeamKey {
        self.key
    }
    pub fn points(&self) -> Points {
        self.points
    }
    pub fn len(&self) -> usize {
        self.players.len()
    }
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
    pub fn players(&self) -> impl Iterator<Item = &SessionPlayer> {
        self.players.values()
    }
    pub fn player(&self, identity: &Identity) -> Option<&SessionPlayer> {
        self.players.get(identity)
    }
    pub fn has_identity(&self, identity: &Identity) -> bool {
        self.players.contains_key(identity)
    }
    pub fn has_card(&self, card: &Card) -> bool {
        self.players.values().any(|p| p.card() == card)
    }
    pub(super) fn insert(&mut self, player: SessionPlayer) {
        self.players.insert(player.identity().clone(), player);
    }
    pub(super) fn remove(&mut self, identity: &Identity) -> Option<SessionPlayer> {
        self.players.remove(identity)
    }
    pub(super) fn score(&mut self) {
        self.points = self.points.saturating_add(1);
    }
    /// Takes a point back; false when there is none to take.
    pub(super) fn unscore(&mut self) -> bool {
        match self.points.checked_sub(1) {
            Some(points) => {
                self.points = points;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn keys() {
        assert_eq!(TeamKey::A.other(), TeamKey::B);
        assert_eq!(TeamKey::B.other(), TeamKey::A);
        assert_eq!(TeamKey::try_from("b"), Ok(TeamKey::B));
        assert!(TeamKey::try_from("c").is_err());
        assert_eq!(TeamKey::A.to_string(), "A");
    }
    #[test]
    fn points_floor_at_zero() {
        let mut team = Team::new(TeamKey::A);
        assert!(!team.unscore());
        team.score();
        assert_eq!(team.points(), 1);
        assert!(team.unscore());
        assert_eq!(team.points(), 0);
    }
}
