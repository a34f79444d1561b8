use super::*;
use crate::ELO_DEFAULT;
use crate::Elo;
use crate::cards::Card;
use crate::rating::Revision;
use crate::rating::Skill;
use crate::rating::Standing;
use serde::Deserialize;
use serde::Serialize;
use std::time::SystemTime;

/// Opaque identity of a person, as issued by the directory
/// (an email address or chat handle in practice).
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persistent statistics of a registered player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    identity: Identity,
    cards: Vec<Card>,
    elo: Elo,
    skill: Skill,
    games: u32,
    won: u32,
    lost: u32,
    seconds_played: u64,
}

impl Profile {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            cards: Vec::new(),
            elo: ELO_DEFAULT,
            skill: Skill::default(),
            games: 0,
            won: 0,
            lost: 0,
            seconds_played: 0,
        }
    }
    pub fn identity(&self) -> &Identity {
        &self.identity
    }
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
    pub fn elo(&self) -> Elo {
        self.elo
    }
    pub fn skill(&self) -> Skill {
        self.skill
    }
    pub fn games(&self) -> u32 {
        self.games
    }
    pub fn won(&self) -> u32 {
        self.won
    }
    pub fn lost(&self) -> u32 {
        self.lost
    }
    pub fn seconds_played(&self) -> u64 {
        self.seconds_played
    }
    pub fn standing(&self) -> Standing {
        Standing {
            elo: self.elo,
            skill: self.skill,
        }
    }
    pub fn owns(&self, card: &Card) -> bool {
        self.cards.contains(card)
    }
    /// Adds a card to this profile; binding the same card twice is a no-op.
    pub fn bind(&mut self, card: Card) {
        if !self.owns(&card) {
            self.cards.push(card);
        }
    }
    /// Takes over the ratings and counters of `other`, keeping identity and cards.
    pub fn absorb(&mut self, other: &Profile) {
        self.elo = other.elo;
        self.skill = other.skill;
        self.games = other.games;
        self.won = other.won;
        self.lost = other.lost;
        self.seconds_played = other.seconds_played;
    }
    /// Folds one finished match into the statistics.
    pub fn record(&mut self, revision: Revision, won: bool, seconds: u64) {
        if let Some(elo) = revision.elo {
            self.elo = elo;
        }
        self.skill = revision.skill;
        self.games += 1;
        match won {
            true => self.won += 1,
            false => self.lost += 1,
        }
        self.seconds_played += seconds;
    }
}

/// A player taking part in the current session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlayer {
    profile: Profile,
    card: Card,
    joined: SystemTime,
    team: TeamKey,
}

impl SessionPlayer {
    pub fn new(profile: Profile, card: Card, joined: SystemTime, team: TeamKey) -> Self {
        Self {
            profile,
            card,
            joined,
            team,
        }
    }
    pub fn identity(&self) -> &Identity {
        self.profile.identity()
    }
    pub fn profile(&self) -> &Profile {
        &self.profile
    }
    pub fn card(&self) -> &Card {
        &self.card
    }
    pub fn joined(&self) -> SystemTime {
        self.joined
    }
    pub fn team(&self) -> TeamKey {
        self.team
    }
}

impl std::fmt::Display for SessionPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({}) on team {}", self.identity(), self.profile.elo, self.team)
    }
}
