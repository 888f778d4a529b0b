//! Basket option payoffs.
//!
//! Payoffs are pure functions of the current state: a batch of asset-price
//! vectors maps to a batch of non-negative exercise values. Dispatch is
//! static via [`PayoffKind`].
//!
//! # Examples
//!
//! ```
//! use pricer_models::instruments::{BasketPayoff, PayoffKind};
//! use pricer_models::models::StateBatch;
//!
//! let payoff = BasketPayoff::new("max-call".parse::<PayoffKind>().unwrap(), 100.0).unwrap();
//! let states = StateBatch::from_rows(&[[95.0, 104.0], [101.0, 99.0]]);
//! assert_eq!(payoff.evaluate(&states), vec![4.0, 1.0]);
//! ```

mod error;
mod payoff;

pub use error::PayoffError;
pub use payoff::{BasketPayoff, PayoffKind, LOG_FLOOR};
