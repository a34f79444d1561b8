use super::*;
use crate::Elo;
use crate::Points;
use crate::cards::Card;
use crate::millis;
use crate::rating::Skill;
use serde::Deserialize;
use serde::Serialize;
use std::time::SystemTime;
use uuid::Uuid;

/// Schema version written into every mirrored document.
pub const SCHEMA_VERSION: u32 = 1;

/// Read-only picture of the current session, as mirrored and as served to hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub id: Uuid,
    pub kind: GameKind,
    /// Milliseconds since the epoch; absent while filling.
    pub started: Option<u64>,
    pub serve: Option<TeamKey>,
    pub quality: Option<f64>,
    pub ready: Vec<TeamKey>,
    pub teams: Vec<TeamSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub key: TeamKey,
    pub points: Points,
    pub players: Vec<PlayerSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub identity: Identity,
    pub card: Card,
    pub joined: u64,
    pub elo: Elo,
    pub skill: Skill,
}

impl Snapshot {
    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }
    pub fn players(&self) -> impl Iterator<Item = &PlayerSnapshot> {
        self.teams.iter().flat_map(|t| t.players.iter())
    }
    pub fn points(&self, key: TeamKey) -> Points {
        self.teams
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.points)
            .unwrap_or(0)
    }
}

impl From<&SessionPlayer> for PlayerSnapshot {
    fn from(player: &SessionPlayer) -> Self {
        Self {
            identity: player.identity().clone(),
            card: player.card().clone(),
            joined: millis(player.joined()),
            elo: player.profile().elo(),
            skill: player.profile().skill(),
        }
    }
}

impl From<&Session> for Snapshot {
    fn from(session: &Session) -> Self {
        Self {
            version: SCHEMA_VERSION,
            id: session.id(),
            kind: session.kind(),
            started: session.started().map(millis),
            serve: session.serve(),
            quality: session.quality(),
            ready: TeamKey::ALL
                .into_iter()
                .filter(|&k| !session.is_active() && session.is_team_ready(k))
                .collect(),
            teams: session
                .teams()
                .map(|team| TeamSnapshot {
                    key: team.key(),
                    points: team.points(),
                    players: session
                        .players()
                        .filter(|p| p.team() == team.key())
                        .map(PlayerSnapshot::from)
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Permanent record of a finished match, appended to the match history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub version: u32,
    pub id: Uuid,
    pub kind: GameKind,
    pub started: u64,
    pub ended: u64,
    /// Team sizes, `1v1` or `2v1` and so on.
    pub versus: String,
    pub quality: f64,
    pub winner: TeamKey,
    pub points: [Points; 2],
    pub players: Vec<PlayerRecord>,
}

/// One player's line in a match record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub identity: Identity,
    pub team: TeamKey,
    pub won: bool,
    pub elo_before: Elo,
    /// Absent when the match did not move ELO.
    pub elo_after: Option<Elo>,
    pub skill_before: Skill,
    pub skill_after: Skill,
}

impl PlayerRecord {
    pub fn elo_delta(&self) -> Option<Elo> {
        self.elo_after.map(|after| after - self.elo_before)
    }
    pub fn mu_delta(&self) -> f64 {
        self.skill_after.mu() - self.skill_before.mu()
    }
    pub fn sigma_delta(&self) -> f64 {
        self.skill_after.sigma() - self.skill_before.sigma()
    }
}

impl MatchRecord {
    pub fn versus(session: &Session) -> String {
        format!(
            "{}v{}",
            session.team(TeamKey::A).len(),
            session.team(TeamKey::B).len()
        )
    }
    pub fn ended_at(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + std::time::Duration::from_millis(self.ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session() -> Session {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let mut session = Session::new(GameKind::Singles);
        session
            .add(SessionPlayer::new(Profile::new("ada".into()), Card::nfc("00000001"), t0, TeamKey::A))
            .unwrap();
        session
            .add(SessionPlayer::new(Profile::new("bob".into()), Card::nfc("00000002"), t0, TeamKey::B))
            .unwrap();
        session
    }

    #[test]
    fn filling_snapshot() {
        let snapshot = Snapshot::from(&session());
        assert_eq!(snapshot.version, SCHEMA_VERSION);
        assert!(!snapshot.is_active());
        assert_eq!(snapshot.players().count(), 2);
        assert_eq!(snapshot.teams[0].players[0].identity, Identity::new("ada"));
        assert_eq!(snapshot.teams[0].players[0].joined, 1_700_000_000_000);
    }
    #[test]
    fn active_snapshot_serde() {
        let mut session = session();
        session.start(SystemTime::UNIX_EPOCH + Duration::from_secs(5), 0.447);
        session.score(TeamKey::B);
        session.set_serve(Some(TeamKey::B));
        let snapshot = Snapshot::from(&session);
        assert_eq!(snapshot.started, Some(5_000));
        assert_eq!(snapshot.serve, Some(TeamKey::B));
        assert_eq!(snapshot.points(TeamKey::B), 1);
        assert!(snapshot.ready.is_empty());
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"kind\":\"singles\""));
        assert_eq!(serde_json::from_str::<Snapshot>(&json).unwrap(), snapshot);
    }
    #[test]
    fn record_deltas() {
        let record = PlayerRecord {
            identity: "ada".into(),
            team: TeamKey::A,
            won: true,
            elo_before: 1200,
            elo_after: Some(1216),
            skill_before: Skill::new(25.0, 8.0),
            skill_after: Skill::new(29.0, 7.0),
        };
        assert_eq!(record.elo_delta(), Some(16));
        assert_eq!(record.mu_delta(), 4.0);
        assert_eq!(record.sigma_delta(), -1.0);
        assert_eq!(MatchRecord::versus(&session()), "1v1");
    }
}
