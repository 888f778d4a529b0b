//! Correlated multi-asset Geometric Brownian Motion.
//!
//! Each asset follows
//! ```text
//! dS_i = r * S_i * dt + sigma_i * S_i * dW_i,    d<W_i, W_j> = C_ij dt
//! ```
//!
//! ## Log-space formulation
//!
//! Steps use the exact solution:
//! ```text
//! S_i(t+dt) = S_i(t) * exp((r - 0.5*sigma_i^2)*dt + sigma_i*sqrt(dt)*W_i)
//! ```
//! with `W = L * Z`, `Z` independent standard normals and `L` the Cholesky
//! factor of `C`.
//!
//! ## Marginal sampling
//!
//! [`sample_marginal_states`] draws from the lognormal marginal at exercise
//! index `t` directly, without simulating the path up to `t`. It provides
//! regression training inputs whose support covers the region where the
//! continuation value will be queried.

use pricer_core::math::linalg::CholeskyFactor;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use super::market::MarketModel;
use super::state::StateBatch;

/// Lower bound applied to prices before taking logarithms.
pub const LOG_PRICE_FLOOR: f64 = 1e-12;

/// Variance jitter (in time units) used at `t = 0`, where the marginal
/// collapses to a point.
pub const INITIAL_DATE_JITTER: f64 = 1.0;

/// Variance jitter used at `t > 0`.
pub const JITTER_FLOOR: f64 = 1e-6;

/// Advances every state in the batch by one step of correlated GBM.
///
/// Draws `n × d` independent standard normals, correlates each row with
/// `L`, and applies the exact lognormal update per asset.
///
/// # Arguments
///
/// * `states` - Current states (n × d)
/// * `dt` - Step size
/// * `rate` - Risk-free rate
/// * `volatility` - Per-asset volatility (length d)
/// * `cholesky` - Lower Cholesky factor of the correlation matrix (d × d)
/// * `rng` - Random stream
///
/// # Panics
///
/// Panics if `volatility` or `cholesky` disagree with `states.dim()`.
pub fn gbm_step_correlated<R: Rng + ?Sized>(
    states: &StateBatch,
    dt: f64,
    rate: f64,
    volatility: &[f64],
    cholesky: &CholeskyFactor,
    rng: &mut R,
) -> StateBatch {
    let d = states.dim();
    assert_eq!(volatility.len(), d, "Volatility length mismatch");
    assert_eq!(cholesky.dim(), d, "Cholesky dimension mismatch");

    // Precompute drift and volatility terms (outside loop)
    let sqrt_dt = dt.sqrt();
    let drift_dt: Vec<f64> = volatility
        .iter()
        .map(|&s| (rate - 0.5 * s * s) * dt)
        .collect();
    let vol_sqrt_dt: Vec<f64> = volatility.iter().map(|&s| s * sqrt_dt).collect();

    let mut z = vec![0.0; d];
    let mut w = vec![0.0; d];
    let mut next = Vec::with_capacity(states.n_rows() * d);

    for row in states.rows() {
        for zi in z.iter_mut() {
            *zi = StandardNormal.sample(rng);
        }
        cholesky.transform_into(&z, &mut w);

        for j in 0..d {
            let increment = drift_dt[j] + vol_sqrt_dt[j] * w[j];
            next.push(row[j] * increment.exp());
        }
    }

    StateBatch::from_vec(next, d)
}

/// Draws `n` states from the lognormal marginal of GBM at exercise index `t`.
///
/// ```text
/// ln S_i(t) ~ N(ln S0_i + (r - 0.5 sigma_i^2) t dt, sigma_i^2 (t dt + jitter))
/// ```
///
/// with `jitter = 1.0` at `t = 0` and `1e-6` otherwise. Assets are drawn
/// independently.
pub fn sample_marginal_states<R: Rng + ?Sized>(
    t: usize,
    spot: &[f64],
    volatility: &[f64],
    rate: f64,
    dt: f64,
    n: usize,
    rng: &mut R,
) -> StateBatch {
    let d = spot.len();
    assert_eq!(volatility.len(), d, "Volatility length mismatch");

    let jitter = if t == 0 {
        INITIAL_DATE_JITTER
    } else {
        JITTER_FLOOR
    };
    let elapsed = t as f64 * dt;

    let log_mean: Vec<f64> = spot
        .iter()
        .zip(volatility)
        .map(|(&s0, &s)| s0.max(LOG_PRICE_FLOOR).ln() + (rate - 0.5 * s * s) * elapsed)
        .collect();
    let spread: Vec<f64> = volatility
        .iter()
        .map(|&s| s * (elapsed + jitter).sqrt())
        .collect();

    let mut data = Vec::with_capacity(n * d);
    for _ in 0..n {
        for j in 0..d {
            let z: f64 = StandardNormal.sample(rng);
            data.push((log_mean[j] + spread[j] * z).exp());
        }
    }

    StateBatch::from_vec(data, d)
}

impl MarketModel {
    /// Advances `states` one exercise step under this market.
    #[inline]
    pub fn step<R: Rng + ?Sized>(&self, states: &StateBatch, rng: &mut R) -> StateBatch {
        gbm_step_correlated(
            states,
            self.dt(),
            self.rate(),
            self.volatility(),
            self.cholesky(),
            rng,
        )
    }

    /// Samples `n` marginal states at exercise index `t` from `S0`.
    #[inline]
    pub fn sample_states<R: Rng + ?Sized>(&self, t: usize, n: usize, rng: &mut R) -> StateBatch {
        sample_marginal_states(
            t,
            self.spot(),
            self.volatility(),
            self.rate(),
            self.dt(),
            n,
            rng,
        )
    }
}
