//! Standard normal helpers in closed form.
//!
//! The complementary error function uses the Chebyshev fit from Numerical
//! Recipes (fractional error below 1.2e-7); its inverse starts from a
//! rational guess and takes two Newton steps.

const SQRT_2: f64 = std::f64::consts::SQRT_2;
const SQRT_2PI: f64 = 2.506_628_274_631_000_5;
/// 2 / sqrt(pi)
const TWO_OVER_SQRT_PI: f64 = std::f64::consts::FRAC_2_SQRT_PI;

pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + z / 2.0);
    let poly = [
        -0.82215223,
        1.48851587,
        -1.13520398,
        0.27886807,
        -0.18628806,
        0.09678418,
        0.37409196,
        1.00002368,
    ]
    .iter()
    .fold(0.17087277, |acc, c| c + t * acc);
    let r = t * (-z * z - 1.26551223 + t * poly).exp();
    match x < 0.0 {
        true => 2.0 - r,
        false => r,
    }
}

pub fn ierfc(y: f64) -> f64 {
    if y >= 2.0 {
        return -100.0;
    }
    if y <= 0.0 {
        return 100.0;
    }
    let lower = y < 1.0;
    let y = match lower {
        true => y,
        false => 2.0 - y,
    };
    let t = (-2.0 * (y / 2.0).ln()).sqrt();
    let guess = -0.70711 * ((2.30753 + t * 0.27061) / (1.0 + t * (0.99229 + t * 0.04481)) - t);
    let x = (0..2).fold(guess, |x, _| {
        let err = erfc(x) - y;
        x + err / (TWO_OVER_SQRT_PI * (-x * x).exp() - x * err)
    });
    match lower {
        true => x,
        false => -x,
    }
}

/// Cumulative distribution of the standard normal.
pub fn cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Density of the standard normal.
pub fn pdf(x: f64) -> f64 {
    (-x * x / 2.0).exp() / SQRT_2PI
}

/// Quantile function of the standard normal.
pub fn ppf(p: f64) -> f64 {
    -SQRT_2 * ierfc(2.0 * p)
}
