//! Multi-asset market model.
//!
//! This module provides:
//! - `StateBatch`: contiguous batches of asset-price vectors
//! - `CorrelationMatrix`: equicorrelation with eager range checks
//! - `MarketParams` / `MarketModel`: GBM parameters and their derived `dt`,
//!   Cholesky factor and discounting
//! - `gbm`: one-step correlated path stepping and marginal state sampling
//!
//! ## Example
//!
//! ```
//! use pricer_models::models::{MarketModel, MarketParams, StateBatch};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let model = MarketModel::new(MarketParams::uniform(2, 100.0, 0.2, 0.05, 0.2, 9, 1.0)).unwrap();
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! let start = StateBatch::repeat_row(model.spot(), 4);
//! let next = model.step(&start, &mut rng);
//! assert_eq!(next.n_rows(), 4);
//!
//! let training = model.sample_states(3, 10, &mut rng);
//! assert_eq!(training.dim(), 2);
//! ```

pub mod correlated;
pub mod gbm;
pub mod market;
pub mod state;

pub use correlated::{CorrelationError, CorrelationMatrix};
pub use gbm::{gbm_step_correlated, sample_marginal_states};
pub use market::{MarketError, MarketModel, MarketParams};
pub use state::StateBatch;
