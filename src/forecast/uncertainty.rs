//! Monte-Carlo interval bounds.
//!
//! Each draw of a prediction at scaled time `t` is
//!
//! ```text
//! yhat(t) + trend_shift(t) + N(0, σ²)
//! ```
//!
//! where `trend_shift` is zero inside the history and, past it, the effect of
//! new trend changepoints arriving at the rate observed in the history with
//! Laplace-distributed rate changes of the fitted mean magnitude. Bounds are
//! the empirical quantiles of the draws.
//!
//! Rows are simulated independently (only marginal quantiles are reported),
//! each with its own RNG stream derived from the seed and the row index, so
//! results do not depend on rayon's scheduling.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Exp1, Normal, Poisson};
use rayon::prelude::*;

use crate::math::quantile_mut;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertaintyParams {
    /// Observation noise standard deviation.
    pub sigma: f64,
    /// Expected number of changepoints per unit of scaled time.
    pub changepoint_rate: f64,
    /// Mean absolute rate change at a changepoint.
    pub delta_scale: f64,
    pub samples: usize,
    pub interval_width: f64,
    pub seed: u64,
}

/// Lower/upper bounds for each `(yhat, t)` pair.
pub fn interval_bounds(yhat: &[f64], t: &[f64], params: &UncertaintyParams) -> Vec<(f64, f64)> {
    let q_lo = (1.0 - params.interval_width) / 2.0;
    let q_hi = (1.0 + params.interval_width) / 2.0;
    let noise = (params.sigma.is_finite() && params.sigma > 0.0)
        .then(|| Normal::new(0.0, params.sigma).ok())
        .flatten();

    yhat.par_iter()
        .zip(t.par_iter())
        .enumerate()
        .map(|(i, (&y, &ti))| {
            if params.samples == 0 {
                return (y, y);
            }
            let mut rng = StdRng::seed_from_u64(row_seed(params.seed, i));
            let mut draws: Vec<f64> = (0..params.samples)
                .map(|_| {
                    let eps = noise.map(|n| n.sample(&mut rng)).unwrap_or(0.0);
                    y + trend_shift(ti, params, &mut rng) + eps
                })
                .collect();
            let lo = quantile_mut(&mut draws, q_lo).unwrap_or(y);
            let hi = quantile_mut(&mut draws, q_hi).unwrap_or(y);
            (lo, hi)
        })
        .collect()
}

fn row_seed(seed: u64, row: usize) -> u64 {
    seed ^ (row as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Simulated trend displacement at `t` from changepoints after the history end (`t = 1`).
fn trend_shift(t: f64, params: &UncertaintyParams, rng: &mut StdRng) -> f64 {
    let horizon = t - 1.0;
    if horizon <= 0.0 || params.delta_scale <= 0.0 || params.changepoint_rate <= 0.0 {
        return 0.0;
    }
    let Ok(poisson) = Poisson::new(params.changepoint_rate * horizon) else {
        return 0.0;
    };
    let n_changes = poisson.sample(rng) as usize;

    let mut shift = 0.0;
    for _ in 0..n_changes {
        let at = 1.0 + rng.r#gen::<f64>() * horizon;
        shift += laplace(params.delta_scale, rng) * (t - at);
    }
    shift
}

fn laplace(scale: f64, rng: &mut StdRng) -> f64 {
    let magnitude: f64 = Exp1.sample(rng);
    if rng.r#gen::<bool>() {
        magnitude * scale
    } else {
        -magnitude * scale
    }
}
