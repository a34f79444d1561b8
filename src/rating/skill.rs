use crate::SKILL_MU;
use crate::SKILL_SIGMA;
use serde::Deserialize;
use serde::Serialize;

/// Belief about a player's skill: a Gaussian with mean `mu` and spread `sigma`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    mu: f64,
    sigma: f64,
}

impl Skill {
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }
    pub fn mu(&self) -> f64 {
        self.mu
    }
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
    /// Conservative estimate used for leaderboards.
    pub fn exposure(&self) -> f64 {
        self.mu - 3.0 * self.sigma
    }
}

impl Default for Skill {
    fn default() -> Self {
        Self::new(SKILL_MU, SKILL_SIGMA)
    }
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:.3}±{:.3}", self.mu, self.sigma)
    }
}

/// Bayesian rating of two opposing teams.
///
/// Implementations are deterministic: equal inputs give equal outputs.
pub trait SkillEngine: Send + Sync {
    /// Posterior skills of the winning and the losing team, in input order.
    fn rate(&self, winners: &[Skill], losers: &[Skill]) -> (Vec<Skill>, Vec<Skill>);
    /// How evenly matched two teams are, in [0, 1]. Never changes ratings.
    fn quality(&self, a: &[Skill], b: &[Skill]) -> f64;
}
