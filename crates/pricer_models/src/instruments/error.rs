//! Payoff error types.

use thiserror::Error;

/// Payoff construction errors.
///
/// # Examples
/// ```
/// use pricer_models::instruments::PayoffError;
///
/// let err = PayoffError::InvalidStrike { strike: -100.0 };
/// assert!(format!("{}", err).contains("-100"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayoffError {
    /// Payoff name not recognised.
    #[error(
        "Unknown payoff kind '{name}': expected max-call (max-of-basket-call) or geo-put (geometric-basket-put)"
    )]
    UnknownKind {
        /// The name that failed to parse
        name: String,
    },

    /// Strike is negative or not finite.
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// The invalid strike value
        strike: f64,
    },
}
