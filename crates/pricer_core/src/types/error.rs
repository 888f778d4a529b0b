//! Error types for structured error handling.
//!
//! This module provides:
//! - `LinalgError`: Errors from dense matrix factorisation and solves

use thiserror::Error;

/// Linear algebra errors.
///
/// # Examples
/// ```
/// use pricer_core::types::LinalgError;
///
/// let err = LinalgError::NotPositiveDefinite { pivot: 1, value: -0.5 };
/// assert!(format!("{}", err).contains("pivot 1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// A non-positive pivot was met during Cholesky factorisation.
    #[error("Matrix is not positive definite (pivot {pivot} = {value:.6e})")]
    NotPositiveDefinite {
        /// Row index of the failing pivot
        pivot: usize,
        /// Value of the pivot before the square root
        value: f64,
    },

    /// The flat buffer does not hold `dim * dim` elements.
    #[error("Invalid matrix dimensions: expected {expected} elements, got {got}")]
    DimensionMismatch {
        /// Expected element count
        expected: usize,
        /// Provided element count
        got: usize,
    },
}
