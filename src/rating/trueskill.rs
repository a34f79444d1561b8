use super::*;
use crate::SKILL_BETA;
use crate::SKILL_DRAW_PROBABILITY;
use crate::SKILL_TAU;

/// Two-team TrueSkill.
///
/// With only two teams the factor graph collapses to one truncated Gaussian
/// over the team performance difference, so the update is exact in closed
/// form. Dynamics `tau` widen every prior before the update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrueSkill {
    beta: f64,
    tau: f64,
    draw_probability: f64,
}

impl TrueSkill {
    pub fn new(beta: f64, tau: f64, draw_probability: f64) -> Self {
        Self {
            beta,
            tau,
            draw_probability,
        }
    }
    /// Performance difference below which a match counts as a draw.
    fn draw_margin(&self, players: usize) -> f64 {
        ppf((self.draw_probability + 1.0) / 2.0) * (players as f64).sqrt() * self.beta
    }
    /// Additive correction to the mean of a truncated win.
    fn v(t: f64) -> f64 {
        match cdf(t) {
            denom if denom > f64::EPSILON => pdf(t) / denom,
            _ => -t,
        }
    }
    /// Multiplicative correction to the variance of a truncated win.
    fn w(t: f64) -> f64 {
        let v = Self::v(t);
        (v * (v + t)).clamp(f64::EPSILON, 1.0 - f64::EPSILON)
    }
    fn spread(&self, team: &[Skill]) -> Vec<(f64, f64)> {
        team.iter()
            .map(|s| (s.mu(), s.sigma().powi(2) + self.tau.powi(2)))
            .collect()
    }
}

impl Default for TrueSkill {
    fn default() -> Self {
        Self::new(SKILL_BETA, SKILL_TAU, SKILL_DRAW_PROBABILITY)
    }
}

impl SkillEngine for TrueSkill {
    fn rate(&self, winners: &[Skill], losers: &[Skill]) -> (Vec<Skill>, Vec<Skill>) {
        let w = self.spread(winners);
        let l = self.spread(losers);
        let n = w.len() + l.len();
        let c2 = w.iter().chain(l.iter()).map(|(_, var)| var).sum::<f64>()
            + n as f64 * self.beta.powi(2);
        let c = c2.sqrt();
        let delta = w.iter().map(|(mu, _)| mu).sum::<f64>() - l.iter().map(|(mu, _)| mu).sum::<f64>();
        let t = delta / c - self.draw_margin(n) / c;
        let v = Self::v(t);
        let w_ = Self::w(t);
        let update = |&(mu, var): &(f64, f64), sign: f64| {
            Skill::new(
                mu + sign * var / c * v,
                (var * (1.0 - var / c2 * w_)).sqrt(),
            )
        };
        (
            w.iter().map(|x| update(x, 1.0)).collect(),
            l.iter().map(|x| update(x, -1.0)).collect(),
        )
    }
    fn quality(&self, a: &[Skill], b: &[Skill]) -> f64 {
        let n = (a.len() + b.len()) as f64;
        let noise = n * self.beta.powi(2);
        let spread = noise + a.iter().chain(b.iter()).map(|s| s.sigma().powi(2)).sum::<f64>();
        let delta = a.iter().map(Skill::mu).sum::<f64>() - b.iter().map(Skill::mu).sum::<f64>();
        (noise / spread).sqrt() * (-delta.powi(2) / (2.0 * spread)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }
    #[test]
    fn fresh_singles() {
        let engine = TrueSkill::default();
        let (w, l) = engine.rate(&[Skill::default()], &[Skill::default()]);
        assert!(close(w[0].mu(), 29.396));
        assert!(close(w[0].sigma(), 7.171));
        assert!(close(l[0].mu(), 20.604));
        assert!(close(l[0].sigma(), 7.171));
    }
    #[test]
    fn fresh_doubles() {
        let engine = TrueSkill::default();
        let team = [Skill::default(), Skill::default()];
        let (w, l) = engine.rate(&team, &team);
        assert_eq!(w.len(), 2);
        assert!(w.iter().all(|s| close(s.mu(), 28.108) && close(s.sigma(), 7.774)));
        assert!(l.iter().all(|s| close(s.mu(), 21.892) && close(s.sigma(), 7.774)));
    }
    #[test]
    fn upset_moves_more() {
        let engine = TrueSkill::default();
        let (w, l) = engine.rate(&[Skill::new(20.0, 25.0 / 3.0)], &[Skill::new(30.0, 25.0 / 3.0)]);
        assert!(close(w[0].mu(), 27.269));
        assert!(close(l[0].mu(), 22.731));
    }
    #[test]
    fn quality_of_even_match() {
        let engine = TrueSkill::default();
        let one = [Skill::default()];
        let two = [Skill::default(), Skill::default()];
        assert!(close(engine.quality(&one, &one), 0.447));
        assert!(close(engine.quality(&two, &two), 0.447));
        assert!(close(engine.quality(&[Skill::new(20.0, 25.0 / 3.0)], &[Skill::new(30.0, 25.0 / 3.0)]), 0.335));
    }
    #[test]
    fn deterministic() {
        let engine = TrueSkill::default();
        let a = [Skill::new(27.0, 6.0)];
        let b = [Skill::new(23.0, 7.0)];
        assert_eq!(engine.rate(&a, &b), engine.rate(&a, &b));
        assert!(close(engine.quality(&a, &b), engine.quality(&b, &a)));
    }
}
