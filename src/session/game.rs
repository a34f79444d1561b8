use super::*;
use crate::cards::Card;
use crate::rating::Scheme;
use crate::rating::Skill;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;
use std::time::SystemTime;
use uuid::Uuid;

/// What is being played at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    /// One player a side.
    Singles,
    /// Up to two players a side.
    Doubles,
}

impl GameKind {
    /// Most players one team can hold.
    pub fn capacity(&self) -> usize {
        match self {
            Self::Singles => 1,
            Self::Doubles => 2,
        }
    }
    pub fn scheme(&self) -> Scheme {
        match self {
            Self::Singles => Scheme::Pairwise,
            Self::Doubles => Scheme::Team,
        }
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Singles => write!(f, "singles"),
            Self::Doubles => write!(f, "doubles"),
        }
    }
}

impl TryFrom<&str> for GameKind {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "singles" | "1v1" => Ok(Self::Singles),
            "doubles" | "2v2" => Ok(Self::Doubles),
            other => Err(format!("unknown game kind {}", other)),
        }
    }
}

/// Where a session is in its life.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Collecting players. Teams that pressed their button are `ready`.
    Filling { ready: BTreeSet<TeamKey> },
    /// Match under way. `serve` is unset until the first point.
    Active {
        started: SystemTime,
        serve: Option<TeamKey>,
        quality: f64,
    },
}

/// Why a player could not join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    /// The card or the identity is already in the session.
    Duplicate,
    /// The requested team has no free place.
    TeamFull,
    /// The match already started.
    Started,
}

impl std::fmt::Display for JoinError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Duplicate => write!(f, "already in session"),
            Self::TeamFull => write!(f, "team full"),
            Self::Started => write!(f, "session already started"),
        }
    }
}

/// The one match currently filling or being played at the table.
///
/// Membership lives in two places, the per-team maps and the ordered
/// `all_players` list; every mutator updates both or neither.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: Uuid,
    kind: GameKind,
    teams: [Team; 2],
    all_players: Vec<Identity>,
    phase: Phase,
}

impl Session {
    pub fn new(kind: GameKind) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            teams: [Team::new(TeamKey::A), Team::new(TeamKey::B)],
            all_players: Vec::new(),
            phase: Phase::Filling {
                ready: BTreeSet::new(),
            },
        }
    }
    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn kind(&self) -> GameKind {
        self.kind
    }
    pub fn phase(&self) -> &Phase {
        &self.phase
    }
    pub fn team(&self, key: TeamKey) -> &Team {
        &self.teams[key.index()]
    }
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }
    /// Players in the order they joined.
    pub fn players(&self) -> impl Iterator<Item = &SessionPlayer> {
        self.all_players
            .iter()
            .filter_map(|id| self.teams.iter().find_map(|t| t.player(id)))
    }
    pub fn len(&self) -> usize {
        self.all_players.len()
    }
    pub fn is_empty(&self) -> bool {
        self.all_players.is_empty()
    }
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active { .. })
    }
    pub fn started(&self) -> Option<SystemTime> {
        match self.phase {
            Phase::Active { started, .. } => Some(started),
            Phase::Filling { .. } => None,
        }
    }
    pub fn serve(&self) -> Option<TeamKey> {
        match self.phase {
            Phase::Active { serve, .. } => serve,
            Phase::Filling { .. } => None,
        }
    }
    pub fn quality(&self) -> Option<f64> {
        match self.phase {
            Phase::Active { quality, .. } => Some(quality),
            Phase::Filling { .. } => None,
        }
    }
    pub fn points(&self, key: TeamKey) -> crate::Points {
        self.team(key).points()
    }
    pub fn skills(&self, key: TeamKey) -> Vec<Skill> {
        self.team(key).players().map(|p| p.profile().skill()).collect()
    }
}

/// Membership.
impl Session {
    pub fn has_card(&self, card: &Card) -> bool {
        self.teams.iter().any(|t| t.has_card(card))
    }
    pub fn has_identity(&self, identity: &Identity) -> bool {
        self.teams.iter().any(|t| t.has_identity(identity))
    }
    pub fn add(&mut self, player: SessionPlayer) -> Result<(), JoinError> {
        if self.is_active() {
            return Err(JoinError::Started);
        }
        if self.has_card(player.card()) || self.has_identity(player.identity()) {
            return Err(JoinError::Duplicate);
        }
        if self.team(player.team()).len() >= self.kind.capacity() {
            return Err(JoinError::TeamFull);
        }
        self.all_players.push(player.identity().clone());
        self.teams[player.team().index()].insert(player);
        Ok(())
    }
    pub fn remove(&mut self, identity: &Identity) -> Option<SessionPlayer> {
        let player = self
            .teams
            .iter_mut()
            .find_map(|t| t.remove(identity))?;
        self.all_players.retain(|id| id != identity);
        if let Phase::Filling { ref mut ready } = self.phase {
            ready.remove(&player.team());
        }
        Some(player)
    }
}

/// Lifecycle.
impl Session {
    /// Enough players to play: one a side in singles, anyone on both sides in doubles.
    pub fn is_complete(&self) -> bool {
        match self.kind {
            GameKind::Singles => self.teams.iter().all(|t| t.len() == self.kind.capacity()),
            GameKind::Doubles => self.teams.iter().all(|t| !t.is_empty()),
        }
    }
    /// Complete, and in doubles both teams pressed ready.
    pub fn is_ready(&self) -> bool {
        match (&self.phase, self.kind) {
            (Phase::Active { .. }, _) => false,
            (Phase::Filling { .. }, GameKind::Singles) => self.is_complete(),
            (Phase::Filling { ready }, GameKind::Doubles) => {
                self.is_complete() && TeamKey::ALL.iter().all(|k| ready.contains(k))
            }
        }
    }
    pub fn is_team_ready(&self, key: TeamKey) -> bool {
        match &self.phase {
            Phase::Filling { ready } => ready.contains(&key),
            Phase::Active { .. } => true,
        }
    }
    /// Records a readiness press. Only counts once the session is complete;
    /// false when nothing changed.
    pub fn mark_ready(&mut self, key: TeamKey) -> bool {
        let complete = self.is_complete();
        match self.phase {
            Phase::Filling { ref mut ready } if complete => ready.insert(key),
            _ => false,
        }
    }
    /// A lone player has waited longer than `lobby` for an opponent.
    pub fn should_reset(&self, now: SystemTime, lobby: Duration) -> bool {
        match (&self.phase, self.players().collect::<Vec<_>>().as_slice()) {
            (Phase::Filling { .. }, [lone]) => waited(lone.joined(), now) > lobby,
            _ => false,
        }
    }
    /// Starts the match; false when already started.
    pub fn start(&mut self, now: SystemTime, quality: f64) -> bool {
        match self.phase {
            Phase::Active { .. } => false,
            Phase::Filling { .. } => {
                self.phase = Phase::Active {
                    started: now,
                    serve: None,
                    quality,
                };
                true
            }
        }
    }
    /// Time since the start, zero while filling.
    pub fn elapsed(&self, now: SystemTime) -> Duration {
        self.started()
            .map(|started| waited(started, now))
            .unwrap_or_default()
    }
    /// Active for at least `limit`.
    pub fn timed_out(&self, now: SystemTime, limit: Duration) -> bool {
        self.is_active() && self.elapsed(now) >= limit
    }
}

/// Scoring. Points only move once the match is active.
impl Session {
    pub fn score(&mut self, key: TeamKey) -> bool {
        match self.is_active() {
            true => {
                self.teams[key.index()].score();
                true
            }
            false => false,
        }
    }
    pub fn unscore(&mut self, key: TeamKey) -> bool {
        self.is_active() && self.teams[key.index()].unscore()
    }
    pub fn set_serve(&mut self, owner: Option<TeamKey>) {
        if let Phase::Active { ref mut serve, .. } = self.phase {
            *serve = owner;
        }
    }
}

fn waited(since: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(since).unwrap_or_default()
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}-{} ({} players)",
            self.kind,
            self.id,
            self.points(TeamKey::A),
            self.points(TeamKey::B),
            self.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn t0() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }
    fn player(name: &str, uid: &str, team: TeamKey, joined: SystemTime) -> SessionPlayer {
        SessionPlayer::new(Profile::new(name.into()), Card::nfc(uid), joined, team)
    }

    #[test]
    fn add_and_remove_keep_both_views() {
        let mut session = Session::new(GameKind::Doubles);
        session.add(player("ada", "00000001", TeamKey::A, t0())).unwrap();
        session.add(player("bob", "00000002", TeamKey::B, t0())).unwrap();
        session.add(player("cyd", "00000003", TeamKey::A, t0())).unwrap();
        let order = session.players().map(|p| p.identity().to_string()).collect::<Vec<_>>();
        assert_eq!(order, vec!["ada", "bob", "cyd"]);
        assert_eq!(session.team(TeamKey::A).len(), 2);
        let removed = session.remove(&"ada".into()).unwrap();
        assert_eq!(removed.team(), TeamKey::A);
        assert_eq!(session.len(), 2);
        assert_eq!(session.team(TeamKey::A).len(), 1);
        assert!(!session.has_identity(&"ada".into()));
        assert!(session.remove(&"ada".into()).is_none());
        assert_eq!(session.len(), 2);
    }
    #[test]
    fn rejections_leave_no_trace() {
        let mut session = Session::new(GameKind::Singles);
        session.add(player("ada", "00000001", TeamKey::A, t0())).unwrap();
        let before = session.clone();
        assert_eq!(session.add(player("ada", "00000009", TeamKey::B, t0())), Err(JoinError::Duplicate));
        assert_eq!(session.add(player("bob", "00000001", TeamKey::B, t0())), Err(JoinError::Duplicate));
        assert_eq!(session.add(player("bob", "00000002", TeamKey::A, t0())), Err(JoinError::TeamFull));
        assert_eq!(session, before);
    }
    #[test]
    fn singles_ready_when_both_sides_filled() {
        let mut session = Session::new(GameKind::Singles);
        session.add(player("ada", "00000001", TeamKey::A, t0())).unwrap();
        assert!(!session.is_complete());
        assert!(!session.is_ready());
        session.add(player("bob", "00000002", TeamKey::B, t0())).unwrap();
        assert!(session.is_ready());
        assert!(session.start(t0(), 0.4));
        assert!(!session.start(t0(), 0.4));
        assert!(!session.is_ready());
        assert_eq!(session.add(player("cyd", "00000003", TeamKey::B, t0())), Err(JoinError::Started));
    }
    #[test]
    fn doubles_ready_needs_both_buttons() {
        let mut session = Session::new(GameKind::Doubles);
        session.add(player("ada", "00000001", TeamKey::A, t0())).unwrap();
        assert!(!session.mark_ready(TeamKey::A));
        session.add(player("bob", "00000002", TeamKey::B, t0())).unwrap();
        assert!(session.is_complete());
        assert!(!session.is_ready());
        assert!(session.mark_ready(TeamKey::A));
        assert!(!session.mark_ready(TeamKey::A));
        assert!(!session.is_ready());
        assert!(session.mark_ready(TeamKey::B));
        assert!(session.is_ready());
    }
    #[test]
    fn leaving_clears_readiness() {
        let mut session = Session::new(GameKind::Doubles);
        session.add(player("ada", "00000001", TeamKey::A, t0())).unwrap();
        session.add(player("bob", "00000002", TeamKey::B, t0())).unwrap();
        session.mark_ready(TeamKey::A);
        session.remove(&"ada".into());
        assert!(!session.is_team_ready(TeamKey::A));
    }
    #[test]
    fn lone_player_times_out() {
        let lobby = Duration::from_secs(30);
        let mut session = Session::new(GameKind::Singles);
        assert!(!session.should_reset(t0() + Duration::from_secs(999), lobby));
        session.add(player("ada", "00000001", TeamKey::A, t0())).unwrap();
        assert!(!session.should_reset(t0() + lobby, lobby));
        assert!(session.should_reset(t0() + lobby + Duration::from_secs(1), lobby));
        session.add(player("bob", "00000002", TeamKey::B, t0())).unwrap();
        assert!(!session.should_reset(t0() + Duration::from_secs(999), lobby));
    }
    #[test]
    fn scoring_needs_active() {
        let mut session = Session::new(GameKind::Singles);
        assert!(!session.score(TeamKey::A));
        assert!(!session.unscore(TeamKey::A));
        session.add(player("ada", "00000001", TeamKey::A, t0())).unwrap();
        session.add(player("bob", "00000002", TeamKey::B, t0())).unwrap();
        session.start(t0(), 0.4);
        assert!(session.score(TeamKey::A));
        assert!(!session.unscore(TeamKey::B));
        assert!(session.unscore(TeamKey::A));
        assert_eq!(session.points(TeamKey::A), 0);
        assert_eq!(session.elapsed(t0() + Duration::from_secs(61)), Duration::from_secs(61));
        assert!(session.timed_out(t0() + Duration::from_secs(900), Duration::from_secs(900)));
        assert!(!session.timed_out(t0() + Duration::from_secs(899), Duration::from_secs(900)));
    }
    #[test]
    fn random_joins_never_duplicate() {
        let mut rng = SmallRng::seed_from_u64(7);
        for kind in [GameKind::Singles, GameKind::Doubles] {
            let mut session = Session::new(kind);
            for _ in 0..500 {
                let n = rng.random_range(0..6);
                let uid = format!("0000000{}", rng.random_range(0..6));
                let team = TeamKey::ALL[rng.random_range(0..2)];
                match rng.random_bool(0.8) {
                    true => {
                        let _ = session.add(player(&format!("p{}", n), &uid, team, t0()));
                    }
                    false => {
                        session.remove(&Identity::new(format!("p{}", n)));
                    }
                }
                let ids = session.players().map(|p| p.identity().clone()).collect::<Vec<_>>();
                let cards = session.players().map(|p| p.card().clone()).collect::<BTreeSet<_>>();
                assert_eq!(ids.len(), session.len());
                assert_eq!(ids.iter().collect::<BTreeSet<_>>().len(), ids.len());
                assert_eq!(cards.len(), ids.len());
                assert!(session.teams().all(|t| t.len() <= kind.capacity()));
                assert_eq!(session.teams().map(Team::len).sum::<usize>(), session.len());
            }
        }
    }
}
