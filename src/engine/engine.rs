use super::*;
use crate::cards::Card;
use crate::millis;
use crate::rating::Ratings;
use crate::session::*;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// The match state machine.
///
/// Owns the current session and applies card reads, button presses and
/// sweeps to it one at a time. Identities come from the directory; every
/// outcome is broadcast to the audience and every state change is pushed to
/// the mirror, neither of which can fail a transition.
pub struct Engine {
    kind: GameKind,
    timeouts: Timeouts,
    session: Session,
    swept: Option<Uuid>,
    ratings: Ratings,
    directory: Box<dyn Directory>,
    clock: Arc<dyn Clock>,
    audience: Audience,
    mirror: UnboundedSender<Mirroring>,
}

impl Engine {
    pub fn new<D>(
        kind: GameKind,
        timeouts: Timeouts,
        directory: D,
        clock: Arc<dyn Clock>,
        audience: Audience,
        mirror: UnboundedSender<Mirroring>,
    ) -> Self
    where
        D: Directory + 'static,
    {
        Self {
            kind,
            timeouts,
            session: Session::new(kind),
            swept: None,
            ratings: Ratings::default(),
            directory: Box::new(directory),
            clock,
            audience,
            mirror,
        }
    }
    pub fn with_ratings(mut self, ratings: Ratings) -> Self {
        self.ratings = ratings;
        self
    }
    pub fn session(&self) -> &Session {
        &self.session
    }
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(&self.session)
    }
    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }
}

/// Card reads.
impl Engine {
    pub async fn read_card(&mut self, slot: TeamKey, card: Card) {
        log::debug!("[engine] read {} on side {}", card, slot);
        let now = self.clock.now();
        if self.claim(&card, now).await {
            return;
        }
        let profile = match self.directory.resolve(&card).await {
            Ok(profile) => profile,
            Err(DirectoryError::Unregistered(_)) => {
                return self.notify(Notification::UnregisteredCard { slot, card });
            }
            Err(e) => {
                log::error!("[engine] cannot resolve {}: {}", card, e);
                return;
            }
        };
        let identity = profile.identity().clone();
        match self.session.is_active() {
            true if self.session.has_identity(&identity) || self.session.has_card(&card) => {
                return self.notify(Notification::AlreadyInSession { identity });
            }
            true if !self.session.timed_out(now, self.timeouts.session) => {
                let remaining = self
                    .timeouts
                    .session
                    .saturating_sub(self.session.elapsed(now));
                return self.notify(Notification::SessionBusy {
                    identity,
                    remaining,
                });
            }
            true => self.expire(),
            false if self.session.should_reset(now, self.timeouts.lobby) => self.expire(),
            false => {}
        }
        let player = SessionPlayer::new(profile, card, now, slot);
        let joined = PlayerSnapshot::from(&player);
        match self.session.add(player) {
            Err(JoinError::Duplicate) => self.notify(Notification::AlreadyInSession { identity }),
            Err(JoinError::TeamFull) => self.notify(Notification::TeamFull {
                identity,
                team: slot,
            }),
            Err(JoinError::Started) => self.notify(Notification::SessionBusy {
                identity,
                remaining: self
                    .timeouts
                    .session
                    .saturating_sub(self.session.elapsed(now)),
            }),
            Ok(()) => {
                log::info!("[engine] {} joined team {}", identity, slot);
                self.notify(Notification::PlayerRegistered {
                    player: joined,
                    team: slot,
                });
                self.save();
                if self.session.is_ready() {
                    self.start();
                }
            }
        }
    }
    /// Consumes the read when it completes a registration request. The
    /// request stays filed while the directory cannot bind the card.
    async fn claim(&mut self, card: &Card, now: std::time::SystemTime) -> bool {
        let pending = match self.directory.pending(card).await {
            Ok(Some(pending)) => pending,
            Ok(None) => return false,
            Err(e) => {
                log::warn!("[engine] cannot look up registrations for {}: {}", card, e);
                return false;
            }
        };
        let age = now
            .duration_since(pending.requested)
            .unwrap_or_default();
        if age > self.timeouts.card_registration {
            self.dismiss(card).await;
            self.notify(Notification::RegistrationExpired {
                card: pending.card,
                identity: pending.identity,
            });
            return false;
        }
        let notification = match self.directory.bind(card, &pending.identity).await {
            Ok(_) => Notification::CardRegistered {
                card: pending.card,
                identity: pending.identity,
            },
            Err(DirectoryError::Conflict { owner, .. }) => Notification::RegistrationConflict {
                card: pending.card,
                identity: pending.identity,
                owner,
            },
            Err(e) => {
                log::error!("[engine] cannot bind {}, registration kept: {}", card, e);
                return false;
            }
        };
        self.dismiss(card).await;
        self.notify(notification);
        true
    }
    async fn dismiss(&mut self, card: &Card) {
        if let Err(e) = self.directory.dismiss(card).await {
            log::warn!("[engine] cannot dismiss registration of {}: {}", card, e);
        }
    }
}

/// Buttons.
impl Engine {
    pub async fn add_point(&mut self, team: TeamKey) {
        if !self.session.is_active() {
            return self.ready(team);
        }
        self.session.score(team);
        let (a, b) = self.score();
        let serve = rules::after_point(self.session.serve(), team, a, b);
        self.session.set_serve(serve);
        log::info!("[engine] point {} ({}-{})", team, a, b);
        self.save();
        if let Some(winner) = rules::winner(a, b) {
            self.finish(winner).await;
        }
    }
    pub async fn remove_point(&mut self, team: TeamKey) {
        if !self.session.is_active() {
            return self.ready(team);
        }
        let (a, b) = self.score();
        match self.session.unscore(team) {
            false => self.notify(Notification::PointRefused {
                team,
                reason: Refusal::NoPoints,
            }),
            true => {
                let serve = rules::after_undo(self.session.serve(), a, b);
                self.session.set_serve(serve);
                log::info!("[engine] point taken back from {}", team);
                self.save();
            }
        }
    }
    /// A press before the match starts signals the team is ready.
    fn ready(&mut self, team: TeamKey) {
        match self.session.mark_ready(team) {
            true => {
                log::info!("[engine] team {} ready", team);
                self.save();
                if self.session.is_ready() {
                    self.start();
                }
            }
            false => self.notify(Notification::PointRefused {
                team,
                reason: Refusal::NotStarted,
            }),
        }
    }
    fn score(&self) -> (crate::Points, crate::Points) {
        (
            self.session.points(TeamKey::A),
            self.session.points(TeamKey::B),
        )
    }
}

/// Lifecycle.
impl Engine {
    fn start(&mut self) {
        let quality = self.ratings.quality(
            &self.session.skills(TeamKey::A),
            &self.session.skills(TeamKey::B),
        );
        self.session.start(self.clock.now(), quality);
        log::info!("[engine] session {} started, quality {:.3}", self.session.id(), quality);
        self.notify(Notification::SessionStarted(self.snapshot()));
        self.save();
    }
    async fn finish(&mut self, winner: TeamKey) {
        let now = self.clock.now();
        let seconds = self.session.elapsed(now).as_secs();
        let side = |key: TeamKey| {
            self.session
                .players()
                .filter(|p| p.team() == key)
                .cloned()
                .collect::<Vec<_>>()
        };
        let (winners, losers) = (side(winner), side(winner.other()));
        let standings = |side: &[SessionPlayer]| {
            side.iter()
                .map(|p| p.profile().standing())
                .collect::<Vec<_>>()
        };
        let (w, l) = self
            .ratings
            .settle(self.kind.scheme(), &standings(&winners), &standings(&losers));
        let mut lines = Vec::new();
        for (player, revision, won) in winners
            .iter()
            .zip(w)
            .map(|(p, r)| (p, r, true))
            .chain(losers.iter().zip(l).map(|(p, r)| (p, r, false)))
        {
            let mut profile = player.profile().clone();
            profile.record(revision, won, seconds);
            if let Err(e) = self.directory.record(&profile).await {
                log::error!("[engine] cannot record {}: {}", profile.identity(), e);
            }
            lines.push(PlayerRecord {
                identity: profile.identity().clone(),
                team: player.team(),
                won,
                elo_before: player.profile().elo(),
                elo_after: revision.elo,
                skill_before: player.profile().skill(),
                skill_after: revision.skill,
            });
        }
        let (a, b) = self.score();
        let record = MatchRecord {
            version: SCHEMA_VERSION,
            id: self.session.id(),
            kind: self.kind,
            started: self.session.started().map(millis).unwrap_or_default(),
            ended: millis(now),
            versus: MatchRecord::versus(&self.session),
            quality: self.session.quality().unwrap_or_default(),
            winner,
            points: [a, b],
            players: lines,
        };
        log::info!("[engine] session {} won by {} {}-{}", record.id, winner, a, b);
        self.mirror(Mirroring::Archive(record.clone()));
        self.mirror(Mirroring::Clear(self.session.id()));
        self.notify(Notification::SessionEnded(record));
        self.replace();
    }
    /// Abandons the current session after a timeout.
    fn expire(&mut self) {
        log::info!("[engine] session {} timed out", self.session.id());
        self.notify(Notification::SessionTimeout(self.snapshot()));
        if self.swept != Some(self.session.id()) {
            self.mirror(Mirroring::Clear(self.session.id()));
        }
        self.replace();
    }
    fn replace(&mut self) {
        self.session = Session::new(self.kind);
        self.swept = None;
    }
    /// Periodic staleness check. Clears the mirror of a session whose lone
    /// player gave up waiting, once per session and without notifying;
    /// the timeout itself is reported on the next card read.
    pub fn sweep(&mut self) {
        let now = self.clock.now();
        let id = self.session.id();
        if self.session.should_reset(now, self.timeouts.lobby) && self.swept != Some(id) {
            log::info!("[watchdog] session {} is stale", id);
            self.mirror(Mirroring::Clear(id));
            self.swept = Some(id);
        }
    }
}

/// Outlets.
impl Engine {
    fn notify(&self, notification: Notification) {
        self.audience.broadcast(notification);
    }
    fn save(&self) {
        self.mirror(Mirroring::Save(self.snapshot()));
    }
    fn mirror(&self, write: Mirroring) {
        if let Err(e) = self.mirror.send(write) {
            log::warn!("[engine] mirror unavailable: {}", e);
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("kind", &self.kind)
            .field("timeouts", &self.timeouts)
            .field("session", &self.session)
            .finish()
    }
}
