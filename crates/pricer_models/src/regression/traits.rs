//! Regressor capability.
//!
//! A [`Regressor`] turns a training set `(X, Y)` and one grid cell of
//! [`Hyperparameters`] into a fitted [`Predictor`]. Fitting may draw from the
//! supplied random stream (e.g. to choose Nyström centres); prediction is
//! deterministic.

use rand::Rng;

use crate::models::StateBatch;

use super::error::RegressionError;

/// One cell of the hyperparameter grid.
///
/// `gamma` is the Gaussian kernel precision `1 / (2 l^2)` for lengthscale `l`.
///
/// # Examples
/// ```
/// use pricer_models::regression::Hyperparameters;
///
/// let h = Hyperparameters::from_lengthscale(1e-6, 100.0);
/// assert!((h.gamma - 5e-5).abs() < 1e-18);
/// assert!((h.lengthscale() - 100.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperparameters {
    /// Ridge penalty
    pub alpha: f64,
    /// Kernel precision
    pub gamma: f64,
}

impl Hyperparameters {
    /// Creates a grid cell from a penalty and a precision.
    #[inline]
    pub fn new(alpha: f64, gamma: f64) -> Self {
        Self { alpha, gamma }
    }

    /// Creates a grid cell from a penalty and a kernel lengthscale.
    #[inline]
    pub fn from_lengthscale(alpha: f64, lengthscale: f64) -> Self {
        Self::new(alpha, gamma_from_lengthscale(lengthscale))
    }

    /// Lengthscale corresponding to `gamma`.
    #[inline]
    pub fn lengthscale(&self) -> f64 {
        (0.5 / self.gamma).sqrt()
    }

    /// `alpha >= 0` and `gamma > 0`, both finite.
    pub fn is_valid(&self) -> bool {
        self.alpha >= 0.0 && self.alpha.is_finite() && self.gamma > 0.0 && self.gamma.is_finite()
    }
}

/// Converts a kernel lengthscale `l` into the precision `1 / (2 l^2)`.
#[inline]
pub fn gamma_from_lengthscale(lengthscale: f64) -> f64 {
    1.0 / (2.0 * lengthscale * lengthscale)
}

/// A fitted model mapping states to values.
pub trait Predictor: Send + Sync {
    /// Predicts one value per state.
    fn predict(&self, x: &StateBatch) -> Vec<f64>;
}

/// Fitting capability for continuation-value regressors.
pub trait Regressor: Send + Sync {
    /// Fitted model type.
    type Model: Predictor + 'static;

    /// Fits a model on `(x, y)` with the given hyperparameters.
    ///
    /// # Errors
    ///
    /// Any `RegressionError`: empty or mismatched training data, invalid
    /// hyperparameters, non-finite targets or a singular system.
    fn fit<R: Rng + ?Sized>(
        &self,
        x: &StateBatch,
        y: &[f64],
        hyper: Hyperparameters,
        rng: &mut R,
    ) -> Result<Self::Model, RegressionError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Shared input checks for [`Regressor::fit`] implementations.
pub(crate) fn check_training_set(x: &StateBatch, y: &[f64]) -> Result<(), RegressionError> {
    if x.is_empty() {
        return Err(RegressionError::EmptyTrainingSet);
    }
    if x.n_rows() != y.len() {
        return Err(RegressionError::LengthMismatch {
            rows: x.n_rows(),
            targets: y.len(),
        });
    }
    if let Some(index) = y.iter().position(|v| !v.is_finite()) {
        return Err(RegressionError::NonFiniteTarget { index });
    }
    Ok(())
}
