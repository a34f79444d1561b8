use super::*;
use crate::Elo;
use serde::Deserialize;
use serde::Serialize;

/// How a finished match feeds the ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// One player a side: ELO and skill both move.
    Pairwise,
    /// Teams: only skill moves, ELO stays untouched.
    Team,
}

/// A player's ratings going into a match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standing {
    pub elo: Elo,
    pub skill: Skill,
}

/// A player's ratings coming out of a match.
/// `elo` is None when the scheme leaves ELO alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Revision {
    pub elo: Option<Elo>,
    pub skill: Skill,
}

/// Rating calculators behind one facade: ELO for pairwise matches and a
/// pluggable skill engine for everything.
pub struct Ratings {
    engine: Box<dyn SkillEngine>,
}

impl Ratings {
    pub fn new<E>(engine: E) -> Self
    where
        E: SkillEngine + 'static,
    {
        Self {
            engine: Box::new(engine),
        }
    }
    pub fn quality(&self, a: &[Skill], b: &[Skill]) -> f64 {
        self.engine.quality(a, b)
    }
    /// Revised ratings of the winning and losing side, in input order.
    pub fn settle(
        &self,
        scheme: Scheme,
        winners: &[Standing],
        losers: &[Standing],
    ) -> (Vec<Revision>, Vec<Revision>) {
        let skills = |side: &[Standing]| side.iter().map(|s| s.skill).collect::<Vec<_>>();
        let (w, l) = self.engine.rate(&skills(winners), &skills(losers));
        let revise = |side: &[Standing], skills: Vec<Skill>, opponents: &[Standing], won: bool| {
            side.iter()
                .zip(skills)
                .map(|(standing, skill)| Revision {
                    elo: match scheme {
                        Scheme::Pairwise => Some(elo_update(standing.elo, mean(opponents), won)),
                        Scheme::Team => None,
                    },
                    skill,
                })
                .collect::<Vec<_>>()
        };
        (
            revise(winners, w, losers, true),
            revise(losers, l, winners, false),
        )
    }
}

impl Default for Ratings {
    fn default() -> Self {
        Self::new(TrueSkill::default())
    }
}

/// Mean ELO of a side; a lone opponent's rating is used as is.
fn mean(side: &[Standing]) -> Elo {
    match side.len() {
        0 => crate::ELO_DEFAULT,
        n => (side.iter().map(|s| s.elo as f64).sum::<f64>() / n as f64).round() as Elo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ELO_DEFAULT;
    fn fresh() -> Standing {
        Standing {
            elo: ELO_DEFAULT,
            skill: Skill::default(),
        }
    }
    #[test]
    fn pairwise_moves_elo_and_skill() {
        let ratings = Ratings::default();
        let (w, l) = ratings.settle(Scheme::Pairwise, &[fresh()], &[fresh()]);
        assert_eq!(w[0].elo, Some(ELO_DEFAULT + 16));
        assert_eq!(l[0].elo, Some(ELO_DEFAULT - 16));
        assert!(w[0].skill.mu() > l[0].skill.mu());
    }
    #[test]
    fn team_leaves_elo_alone() {
        let ratings = Ratings::default();
        let (w, l) = ratings.settle(Scheme::Team, &[fresh(), fresh()], &[fresh(), fresh()]);
        assert_eq!(w.len(), 2);
        assert_eq!(l.len(), 2);
        assert!(w.iter().chain(l.iter()).all(|r| r.elo.is_none()));
        assert!(w.iter().all(|r| r.skill.mu() > Skill::default().mu()));
        assert!(l.iter().all(|r| r.skill.mu() < Skill::default().mu()));
    }
    #[test]
    fn quality_delegates() {
        let ratings = Ratings::default();
        let q = ratings.quality(&[Skill::default()], &[Skill::default()]);
        assert!((q - TrueSkill::default().quality(&[Skill::default()], &[Skill::default()])).abs() < 1e-12);
        assert!(q > 0.0 && q <= 1.0);
    }
}
