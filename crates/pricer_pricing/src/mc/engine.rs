//! Backward-induction regression Monte Carlo engine.
//!
//! # Overview
//!
//! The [`BackwardInductionEngine`] coordinates, for each repetition:
//! 1. Marginal state sampling at each exercise date
//! 2. Nested Monte Carlo continuation values under the next-date estimator
//! 3. Targets `max(continuation, payoff)`
//! 4. Hyperparameter selection; the winning model becomes the estimator
//!
//! Repetitions run in parallel and are reported in repetition order. Each
//! repetition, date and sub-task draws from a substream keyed by its index,
//! so a fixed seed reproduces the run on any thread count.

use std::time::{Duration, Instant};

use pricer_models::instruments::BasketPayoff;
use pricer_models::models::{MarketModel, StateBatch};
use pricer_models::regression::{NystromKrr, Predictor, Regressor};
use rayon::prelude::*;
use tracing::{debug, info};

use super::config::RmcConfig;
use super::continuation::ContinuationEstimator;
use super::error::PricingError;
use super::hindsight::{HindsightEvaluator, HindsightReport};
use super::selection::ModelSelector;
use super::summary::Summary;
use super::value_fn::{ValueChain, ValueFunction};
use crate::rng::PricerRng;

/// Root substream for the hindsight benchmark; repetitions use their index.
const HINDSIGHT_STREAM: u64 = u64::MAX;

/// Per-date substreams.
const STATE_STREAM: u64 = 0;
const CONTINUATION_STREAM: u64 = 1;
const SELECTION_STREAM: u64 = 2;

/// Outcome of one backward step.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepDiagnostics {
    /// Exercise date index
    pub time: usize,
    /// Winning ridge penalty
    pub alpha: f64,
    /// Winning kernel precision
    pub gamma: f64,
    /// Lengthscale corresponding to `gamma`
    pub lengthscale: f64,
    /// Validation MSE of the winning cell
    pub validation_mse: f64,
    /// Mean regression target
    pub mean_target: f64,
    /// Share of training states where immediate exercise is at least the
    /// continuation value
    pub exercise_fraction: f64,
}

/// Regression training data for one exercise date.
#[derive(Clone, Debug)]
pub struct TrainingBatch {
    /// Sampled states
    pub states: StateBatch,
    /// Discounted continuation estimates
    pub continuation: Vec<f64>,
    /// Immediate exercise values
    pub payoff: Vec<f64>,
    /// `max(continuation, payoff)` elementwise
    pub targets: Vec<f64>,
}

impl TrainingBatch {
    /// Share of states where exercising now is at least as good as waiting.
    pub fn exercise_fraction(&self) -> f64 {
        if self.payoff.is_empty() {
            return 0.0;
        }
        let exercised = self
            .payoff
            .iter()
            .zip(&self.continuation)
            .filter(|(p, c)| p >= c)
            .count();
        exercised as f64 / self.payoff.len() as f64
    }
}

/// Result of one backward recursion.
#[derive(Debug)]
pub struct RepetitionResult<P> {
    /// Zero-based repetition index
    pub repetition: usize,
    /// Time-zero estimator evaluated at `S0`
    pub estimate: f64,
    /// Per-date diagnostics, from `T - 1` down to 0
    pub diagnostics: Vec<StepDiagnostics>,
    /// Estimator chain
    pub chain: ValueChain<P>,
}

/// Result of a full pricing run.
#[derive(Debug)]
pub struct PricingRun<P> {
    /// Aggregated time-zero estimates
    pub summary: Summary,
    /// Time-zero estimate of each repetition, in repetition order
    pub estimates: Vec<f64>,
    /// Step diagnostics of each repetition, in repetition order
    pub diagnostics: Vec<Vec<StepDiagnostics>>,
    /// Estimator chain of the final repetition
    pub chain: ValueChain<P>,
    /// Wall-clock duration of the backward induction
    pub duration: Duration,
}

/// Regression Monte Carlo pricer for American basket options.
///
/// # Examples
///
/// ```rust
/// use pricer_models::instruments::{BasketPayoff, PayoffKind};
/// use pricer_models::models::{MarketModel, MarketParams};
/// use pricer_pricing::mc::{BackwardInductionEngine, RmcConfig};
///
/// let market = MarketModel::new(MarketParams::uniform(2, 100.0, 0.2, 0.05, 0.2, 2, 1.0)).unwrap();
/// let payoff = BasketPayoff::new(PayoffKind::MaxCall, 100.0).unwrap();
/// let config = RmcConfig::builder()
///     .n_train(40)
///     .inner_samples(10)
///     .nystrom_centres(20)
///     .build()
///     .unwrap();
///
/// let engine = BackwardInductionEngine::nystrom(market, payoff, config);
/// let run = engine.price().unwrap();
/// assert_eq!(run.estimates.len(), 1);
/// assert!(run.summary.mean >= 0.0);
/// ```
#[derive(Debug)]
pub struct BackwardInductionEngine<R> {
    market: MarketModel,
    payoff: BasketPayoff,
    config: RmcConfig,
    regressor: R,
}

impl BackwardInductionEngine<NystromKrr> {
    /// Engine using Nyström kernel ridge regression with the configured
    /// centre count and device.
    pub fn nystrom(market: MarketModel, payoff: BasketPayoff, config: RmcConfig) -> Self {
        let regressor = NystromKrr::new(config.nystrom_centres(), config.device());
        Self::new(market, payoff, config, regressor)
    }
}

impl<R: Regressor> BackwardInductionEngine<R> {
    /// Creates an engine with an explicit regressor.
    pub fn new(market: MarketModel, payoff: BasketPayoff, config: RmcConfig, regressor: R) -> Self {
        Self {
            market,
            payoff,
            config,
            regressor,
        }
    }

    /// Market model.
    #[inline]
    pub fn market(&self) -> &MarketModel {
        &self.market
    }

    /// Payoff.
    #[inline]
    pub fn payoff(&self) -> &BasketPayoff {
        &self.payoff
    }

    /// Engine configuration.
    #[inline]
    pub fn config(&self) -> &RmcConfig {
        &self.config
    }

    /// Root random stream.
    #[inline]
    fn root_rng(&self) -> PricerRng {
        PricerRng::from_seed(self.config.seed())
    }

    /// Samples training states at date `t` and forms regression targets
    /// under the next-date estimator `next`.
    pub fn build_training_batch<P: Predictor>(
        &self,
        t: usize,
        next: &ValueFunction<P>,
        rng: &PricerRng,
    ) -> TrainingBatch {
        let states = self.market.sample_states(
            t,
            self.config.n_train(),
            &mut rng.substream(STATE_STREAM),
        );
        let continuation = ContinuationEstimator::new(&self.market, self.config.inner_samples())
            .estimate(&states, next, &rng.substream(CONTINUATION_STREAM));
        let payoff = self.payoff.evaluate(&states);
        let targets = continuation
            .iter()
            .zip(&payoff)
            .map(|(&c, &p)| c.max(p))
            .collect();

        TrainingBatch {
            states,
            continuation,
            payoff,
            targets,
        }
    }

    /// Runs one full backward recursion.
    ///
    /// # Errors
    ///
    /// `PricingError::Selection` naming the repetition and date at which
    /// model selection failed.
    pub fn run_repetition(
        &self,
        repetition: usize,
    ) -> Result<RepetitionResult<R::Model>, PricingError> {
        let rep_rng = self.root_rng().substream(repetition as u64);
        let n_exercise = self.market.n_exercise();
        let selector = ModelSelector::new(
            &self.regressor,
            self.config.grid(),
            self.config.validation_fraction(),
        );

        info!(repetition, n_exercise, regressor = self.regressor.name(), "Repetition started");

        let mut chain = ValueChain::new(self.payoff, n_exercise);
        let mut diagnostics = Vec::with_capacity(n_exercise);

        for t in (0..n_exercise).rev() {
            let step_rng = rep_rng.substream(t as u64);
            let batch = self.build_training_batch(t, chain.earliest(), &step_rng);

            let selection = selector
                .select(&batch.states, &batch.targets, &step_rng.substream(SELECTION_STREAM))
                .map_err(|source| PricingError::Selection {
                    repetition,
                    time: t,
                    source,
                })?;

            let hyper = selection.hyperparameters;
            let step = StepDiagnostics {
                time: t,
                alpha: hyper.alpha,
                gamma: hyper.gamma,
                lengthscale: hyper.lengthscale(),
                validation_mse: selection.validation_mse,
                mean_target: batch.targets.iter().sum::<f64>() / batch.targets.len() as f64,
                exercise_fraction: batch.exercise_fraction(),
            };
            debug!(
                repetition,
                t,
                alpha = step.alpha,
                lengthscale = step.lengthscale,
                score = step.validation_mse,
                exercise_fraction = step.exercise_fraction,
                "Selected hyperparameters"
            );
            diagnostics.push(step);
            chain.push_fitted(selection.model, hyper);
        }

        let estimate = chain.earliest().evaluate_row(self.market.spot());
        info!(repetition, estimate, "Repetition finished");

        Ok(RepetitionResult {
            repetition,
            estimate,
            diagnostics,
            chain,
        })
    }

    /// Runs every repetition and aggregates the time-zero estimates.
    ///
    /// # Errors
    ///
    /// The first `PricingError` in repetition order.
    pub fn price(&self) -> Result<PricingRun<R::Model>, PricingError> {
        let start = Instant::now();

        let results: Vec<RepetitionResult<R::Model>> = (0..self.config.repeats())
            .into_par_iter()
            .map(|repetition| self.run_repetition(repetition))
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<Result<_, _>>()?;

        let duration = start.elapsed();
        let estimates: Vec<f64> = results.iter().map(|r| r.estimate).collect();
        let summary = Summary::from_estimates(&estimates).ok_or(PricingError::EmptyRun)?;

        let mut diagnostics = Vec::with_capacity(results.len());
        let mut chain = None;
        for result in results {
            diagnostics.push(result.diagnostics);
            chain = Some(result.chain);
        }
        let chain = chain.ok_or(PricingError::EmptyRun)?;

        info!(
            repeats = estimates.len(),
            mean = summary.mean,
            std_error = summary.std_error,
            duration_secs = duration.as_secs_f64(),
            "Backward induction complete"
        );

        Ok(PricingRun {
            summary,
            estimates,
            diagnostics,
            chain,
            duration,
        })
    }

    /// Perfect-foresight benchmark on paths independent of the pricing run.
    pub fn hindsight(&self) -> HindsightReport {
        HindsightEvaluator::new(&self.market, &self.payoff, self.config.hindsight_paths())
            .evaluate(&self.root_rng().substream(HINDSIGHT_STREAM))
    }
}
