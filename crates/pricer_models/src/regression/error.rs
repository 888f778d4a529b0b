//! Regression error types.

use pricer_core::types::LinalgError;
use thiserror::Error;

/// Errors raised while fitting a regressor.
///
/// # Examples
/// ```
/// use pricer_models::regression::RegressionError;
///
/// let err = RegressionError::LengthMismatch { rows: 10, targets: 9 };
/// assert!(format!("{}", err).contains("10 rows"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegressionError {
    /// No training rows were supplied.
    #[error("Cannot fit a regressor on an empty training set")]
    EmptyTrainingSet,

    /// Inputs and targets disagree in length.
    #[error("Training set has {rows} rows but {targets} targets")]
    LengthMismatch {
        /// Number of input rows
        rows: usize,
        /// Number of targets
        targets: usize,
    },

    /// Hyperparameters are outside their admissible range.
    #[error("Invalid hyperparameters: alpha = {alpha}, gamma = {gamma}")]
    InvalidHyperparameters {
        /// Ridge penalty
        alpha: f64,
        /// Kernel precision
        gamma: f64,
    },

    /// A training target is NaN or infinite.
    #[error("Training target at row {index} is not finite")]
    NonFiniteTarget {
        /// Row index of the first offending target
        index: usize,
    },

    /// The regularised normal equations could not be factorised.
    #[error("Normal equations are singular: {0}")]
    Singular(#[from] LinalgError),
}
