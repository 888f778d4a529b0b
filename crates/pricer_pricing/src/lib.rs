//! # Pricer Pricing (Layer 3: Engine)
//!
//! Regression Monte Carlo pricing of American options on correlated
//! baskets.
//!
//! ## Layer 3 Role
//!
//! - Layer 1 (`pricer_core`): Cholesky factorisation, sample statistics
//! - Layer 2 (`pricer_models`): correlated GBM, payoffs, regressors
//! - Layer 3 (this crate): backward induction, model selection, hindsight
//!   benchmark, aggregation
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for run summaries, step
//!   diagnostics, hindsight reports and value surfaces
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_models::instruments::{BasketPayoff, PayoffKind};
//! use pricer_models::models::{MarketModel, MarketParams};
//! use pricer_pricing::{BackwardInductionEngine, RmcConfig};
//!
//! let market = MarketModel::new(MarketParams::uniform(1, 100.0, 0.0, 0.0, 0.0, 1, 1.0)).unwrap();
//! let payoff = BasketPayoff::new(PayoffKind::MaxCall, 100.0).unwrap();
//! let config = RmcConfig::builder().n_train(20).inner_samples(5).build().unwrap();
//!
//! // All states collapse onto the strike: the option is worthless
//! let run = BackwardInductionEngine::nystrom(market, payoff, config).price().unwrap();
//! assert!(run.summary.mean.abs() < 1e-9);
//! ```

#![warn(missing_docs)]

pub mod mc;
pub mod rng;

pub use mc::{
    BackwardInductionEngine, HindsightReport, PricingError, PricingRun, RmcConfig, StepDiagnostics,
    Summary,
};
pub use rng::PricerRng;
