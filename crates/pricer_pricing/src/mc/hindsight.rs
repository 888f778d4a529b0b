//! Perfect-foresight exercise benchmark.
//!
//! Simulates full correlated paths over every exercise date and records,
//! per path, the largest discounted payoff together with the date at which
//! it occurs. Knowing the whole path makes this an upper bound on any
//! exercise policy; it is a diagnostic only and never feeds the recursion.

use pricer_core::math::statistics::{mean, standard_error};
use pricer_models::instruments::BasketPayoff;
use pricer_models::models::{MarketModel, StateBatch};
use rayon::prelude::*;
use tracing::info;

use crate::rng::PricerRng;

/// Best discounted exercise value of one path.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HindsightRecord {
    /// `max_t exp(-r dt t) * payoff(S_t)`
    pub discounted_payoff: f64,
    /// First date attaining the maximum
    pub stopping_time: usize,
}

/// Statistics over hindsight paths.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HindsightReport {
    /// Mean discounted payoff
    pub payoff_mean: f64,
    /// Standard error of the discounted payoff (ddof = 1)
    pub payoff_std_error: f64,
    /// Mean stopping date
    pub stopping_mean: f64,
    /// Standard error of the stopping date (ddof = 1)
    pub stopping_std_error: f64,
    /// Number of paths
    pub n_paths: usize,
}

impl HindsightReport {
    /// Aggregates per-path records.
    pub fn from_records(records: &[HindsightRecord]) -> Self {
        let payoffs: Vec<f64> = records.iter().map(|r| r.discounted_payoff).collect();
        let times: Vec<f64> = records.iter().map(|r| r.stopping_time as f64).collect();
        Self {
            payoff_mean: mean(&payoffs),
            payoff_std_error: standard_error(&payoffs),
            stopping_mean: mean(&times),
            stopping_std_error: standard_error(&times),
            n_paths: records.len(),
        }
    }
}

/// Perfect-foresight evaluator.
#[derive(Debug, Clone, Copy)]
pub struct HindsightEvaluator<'a> {
    market: &'a MarketModel,
    payoff: &'a BasketPayoff,
    n_paths: usize,
}

impl<'a> HindsightEvaluator<'a> {
    /// Creates an evaluator simulating `n_paths` paths from `S0`.
    pub fn new(market: &'a MarketModel, payoff: &'a BasketPayoff, n_paths: usize) -> Self {
        Self {
            market,
            payoff,
            n_paths,
        }
    }

    /// Per-path records; path `i` draws from substream `i` of `rng`.
    pub fn simulate(&self, rng: &PricerRng) -> Vec<HindsightRecord> {
        (0..self.n_paths)
            .into_par_iter()
            .map(|i| self.simulate_path(&mut rng.substream(i as u64)))
            .collect()
    }

    /// Aggregated statistics over all paths.
    pub fn evaluate(&self, rng: &PricerRng) -> HindsightReport {
        let report = HindsightReport::from_records(&self.simulate(rng));
        info!(
            n_paths = report.n_paths,
            payoff_mean = report.payoff_mean,
            stopping_mean = report.stopping_mean,
            "Hindsight evaluation complete"
        );
        report
    }

    fn simulate_path(&self, rng: &mut PricerRng) -> HindsightRecord {
        let mut state = StateBatch::repeat_row(self.market.spot(), 1);
        let mut best = HindsightRecord {
            discounted_payoff: self.payoff.evaluate_row(state.row(0)),
            stopping_time: 0,
        };

        for t in 1..=self.market.n_exercise() {
            state = self.market.step(&state, rng);
            let value = self.market.discount(t) * self.payoff.evaluate_row(state.row(0));
            if value > best.discounted_payoff {
                best = HindsightRecord {
                    discounted_payoff: value,
                    stopping_time: t,
                };
            }
        }
        best
    }
}
