//! Regression Monte Carlo for American basket options.
//!
//! This module provides the backward-induction engine, its building blocks
//! and the perfect-foresight benchmark.
//!
//! # Architecture
//!
//! ```text
//! BackwardInductionEngine<R: Regressor>
//! ├── RmcConfig              (counts, grid, seed, device)
//! ├── MarketModel            (dt, Cholesky factor, discounting)
//! ├── PricerRng              (substreams per repetition / date / task)
//! └── Per repetition, t = T-1 .. 0
//!     ├── MarketModel::sample_states()    marginal training states
//!     ├── ContinuationEstimator           nested MC under V_{t+1}
//!     ├── targets = max(continuation, payoff)
//!     └── ModelSelector                   hold-out grid search -> V_t
//! ```
//!
//! [`HindsightEvaluator`] runs independently on its own substream and
//! [`Summary`] aggregates the time-zero estimates.
//!
//! # Examples
//!
//! ```rust
//! use pricer_models::instruments::{BasketPayoff, PayoffKind};
//! use pricer_models::models::{MarketModel, MarketParams};
//! use pricer_pricing::mc::{BackwardInductionEngine, RmcConfig};
//!
//! let market = MarketModel::new(MarketParams::uniform(2, 100.0, 0.2, 0.05, 0.2, 2, 1.0)).unwrap();
//! let payoff = BasketPayoff::new(PayoffKind::GeometricPut, 100.0).unwrap();
//! let config = RmcConfig::builder()
//!     .repeats(2)
//!     .n_train(40)
//!     .inner_samples(10)
//!     .nystrom_centres(20)
//!     .hindsight_paths(100)
//!     .build()
//!     .unwrap();
//!
//! let engine = BackwardInductionEngine::nystrom(market, payoff, config);
//! let run = engine.price().unwrap();
//! let hindsight = engine.hindsight();
//!
//! assert_eq!(run.estimates.len(), 2);
//! assert_eq!(hindsight.n_paths, 100);
//! ```

pub mod config;
pub mod continuation;
pub mod engine;
pub mod error;
pub mod hindsight;
pub mod selection;
pub mod summary;
pub mod surface;
pub mod value_fn;

pub use config::{RmcConfig, RmcConfigBuilder};
pub use continuation::ContinuationEstimator;
pub use engine::{
    BackwardInductionEngine, PricingRun, RepetitionResult, StepDiagnostics, TrainingBatch,
};
pub use error::{ConfigError, PricingError, SelectionError};
pub use hindsight::{HindsightEvaluator, HindsightRecord, HindsightReport};
pub use selection::{HyperparameterGrid, ModelSelector, Selection};
pub use summary::Summary;
pub use surface::{value_surfaces, SurfaceGrid, SurfacePoint, ValueSurface};
pub use value_fn::{ValueChain, ValueFunction};
