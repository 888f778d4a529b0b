//! Error types for the regression Monte Carlo engine.
//!
//! - [`ConfigError`]: invalid engine configuration
//! - [`SelectionError`]: hyperparameter selection could not produce a model
//! - [`PricingError`]: a run failed, with the repetition and exercise date

use thiserror::Error;

/// Configuration error for the pricing engine.
///
/// These errors occur during construction when invalid parameters are provided.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Count outside its valid range.
    #[error("Invalid {name} {value}: must be in range [{min}, {max}]")]
    InvalidCount {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: usize,
        /// Inclusive lower bound
        min: usize,
        /// Inclusive upper bound
        max: usize,
    },

    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Description of the invalid value
        value: String,
    },
}

/// Hyperparameter selection failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    /// The train/validation split leaves a partition empty.
    #[error(
        "Cannot split {n} samples into training ({n_train}) and validation ({n_val}) sets"
    )]
    InsufficientData {
        /// Total sample count
        n: usize,
        /// Training partition size
        n_train: usize,
        /// Validation partition size
        n_val: usize,
    },

    /// Every grid cell failed to fit or scored a non-finite error.
    #[error("Model selection failed: none of the {cells} grid cells produced a finite validation score")]
    NoFiniteScore {
        /// Number of grid cells tried
        cells: usize,
    },
}

/// Runtime failure of a pricing run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Model selection failed at a backward step.
    #[error("Repetition {repetition}, t = {time}: {source}")]
    Selection {
        /// Zero-based repetition index
        repetition: usize,
        /// Exercise date index
        time: usize,
        /// Underlying failure
        #[source]
        source: SelectionError,
    },

    /// No repetition produced an estimate.
    #[error("Pricing run produced no estimates")]
    EmptyRun,
}
