use crate::ELO_K;
use crate::Elo;

/// Probability that a player rated `a` beats a player rated `b`.
pub fn elo_expected(a: Elo, b: Elo) -> f64 {
    1.0 / (1.0 + 10f64.powf((b - a) as f64 / 400.0))
}

/// New rating of a player rated `old` after a match against `opponent`.
/// Halves round to even.
pub fn elo_update(old: Elo, opponent: Elo, won: bool) -> Elo {
    let actual = match won {
        true => 1.0,
        false => 0.0,
    };
    let expected = elo_expected(old, opponent);
    (old as f64 + ELO_K * (actual - expected)).round_ties_even() as Elo
}
