//! Multi-asset market parameters and their derived quantities.
//!
//! [`MarketParams`] is the immutable input; [`MarketModel`] is computed once
//! per run and carries the exercise schedule step `dt` and the Cholesky
//! factor of the equicorrelation matrix.

use pricer_core::math::linalg::CholeskyFactor;
use thiserror::Error;

use super::correlated::{CorrelationError, CorrelationMatrix};

/// Market parameter errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    /// Asset vectors disagree in length.
    #[error("Dimension mismatch: {spot} spot prices but {volatility} volatilities")]
    DimensionMismatch {
        /// Length of the spot vector
        spot: usize,
        /// Length of the volatility vector
        volatility: usize,
    },

    /// Zero assets requested.
    #[error("Market must contain at least one asset")]
    NoAssets,

    /// A spot price is not strictly positive and finite.
    #[error("Spot price for asset {asset} is {value}, must be positive and finite")]
    InvalidSpot {
        /// Asset index
        asset: usize,
        /// Offending value
        value: f64,
    },

    /// A volatility is negative or not finite.
    #[error("Volatility for asset {asset} is {value}, must be non-negative and finite")]
    InvalidVolatility {
        /// Asset index
        asset: usize,
        /// Offending value
        value: f64,
    },

    /// Schedule parameters are invalid.
    #[error("Invalid exercise schedule: {0}")]
    InvalidSchedule(String),

    /// Rate is not finite.
    #[error("Risk-free rate {0} is not finite")]
    InvalidRate(f64),

    /// Correlation structure is invalid.
    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}

/// Multi-asset GBM market description.
///
/// # Examples
///
/// ```
/// use pricer_models::models::MarketParams;
///
/// let params = MarketParams::uniform(2, 100.0, 0.2, 0.05, 0.2, 9, 1.0);
/// assert_eq!(params.dim(), 2);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MarketParams {
    /// Initial prices `S0` (length d)
    pub spot: Vec<f64>,
    /// Per-asset volatilities (length d)
    pub volatility: Vec<f64>,
    /// Risk-free rate
    pub rate: f64,
    /// Pairwise equicorrelation
    pub rho: f64,
    /// Number of exercise dates after the valuation date (`T`)
    pub n_exercise: usize,
    /// Horizon spanned by the exercise dates
    pub horizon: f64,
}

impl MarketParams {
    /// Parameters with identical spot and volatility across `dim` assets.
    pub fn uniform(
        dim: usize,
        spot: f64,
        volatility: f64,
        rate: f64,
        rho: f64,
        n_exercise: usize,
        horizon: f64,
    ) -> Self {
        Self {
            spot: vec![spot; dim],
            volatility: vec![volatility; dim],
            rate,
            rho,
            n_exercise,
            horizon,
        }
    }

    /// Number of assets.
    #[inline]
    pub fn dim(&self) -> usize {
        self.spot.len()
    }

    /// Validates shapes, ranges and the correlation structure.
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.spot.is_empty() {
            return Err(MarketError::NoAssets);
        }
        if self.spot.len() != self.volatility.len() {
            return Err(MarketError::DimensionMismatch {
                spot: self.spot.len(),
                volatility: self.volatility.len(),
            });
        }
        for (asset, &value) in self.spot.iter().enumerate() {
            if !(value > 0.0 && value.is_finite()) {
                return Err(MarketError::InvalidSpot { asset, value });
            }
        }
        for (asset, &value) in self.volatility.iter().enumerate() {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(MarketError::InvalidVolatility { asset, value });
            }
        }
        if !self.rate.is_finite() {
            return Err(MarketError::InvalidRate(self.rate));
        }
        if self.n_exercise == 0 {
            return Err(MarketError::InvalidSchedule(
                "at least one exercise date is required".to_string(),
            ));
        }
        if !(self.horizon > 0.0 && self.horizon.is_finite()) {
            return Err(MarketError::InvalidSchedule(format!(
                "horizon {} must be positive and finite",
                self.horizon
            )));
        }
        CorrelationMatrix::equicorrelation(self.dim(), self.rho)?;
        Ok(())
    }
}

/// Derived market quantities, computed once per run.
#[derive(Clone, Debug)]
pub struct MarketModel {
    params: MarketParams,
    dt: f64,
    cholesky: CholeskyFactor,
}

impl MarketModel {
    /// Validates the parameters and derives `dt` and the Cholesky factor of
    /// the correlation matrix.
    ///
    /// # Errors
    ///
    /// Any `MarketError`; an invalid `rho` surfaces as
    /// `MarketError::Correlation`.
    pub fn new(params: MarketParams) -> Result<Self, MarketError> {
        params.validate()?;
        let cholesky = CorrelationMatrix::equicorrelation(params.dim(), params.rho)?.cholesky()?;
        let dt = params.horizon / params.n_exercise as f64;

        Ok(Self {
            params,
            dt,
            cholesky,
        })
    }

    /// Input parameters.
    #[inline]
    pub fn params(&self) -> &MarketParams {
        &self.params
    }

    /// Number of assets.
    #[inline]
    pub fn dim(&self) -> usize {
        self.params.dim()
    }

    /// Number of exercise dates after the valuation date (`T`).
    #[inline]
    pub fn n_exercise(&self) -> usize {
        self.params.n_exercise
    }

    /// Exercise step `horizon / T`.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Risk-free rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.params.rate
    }

    /// Initial prices.
    #[inline]
    pub fn spot(&self) -> &[f64] {
        &self.params.spot
    }

    /// Per-asset volatilities.
    #[inline]
    pub fn volatility(&self) -> &[f64] {
        &self.params.volatility
    }

    /// Lower Cholesky factor of the correlation matrix.
    #[inline]
    pub fn cholesky(&self) -> &CholeskyFactor {
        &self.cholesky
    }

    /// Discount factor over `steps` exercise intervals: `exp(-r * dt * steps)`.
    #[inline]
    pub fn discount(&self, steps: usize) -> f64 {
        (-self.params.rate * self.dt * steps as f64).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_market_model_derivation() {
        let params = MarketParams::uniform(2, 100.0, 0.2, 0.05, 0.2, 9, 1.0);
        let model = MarketModel::new(params).unwrap();

        assert_relative_eq!(model.dt(), 1.0 / 9.0);
        assert_eq!(model.dim(), 2);
        assert_relative_eq!(model.cholesky().get(1, 0), 0.2, epsilon = 1e-14);
        assert_relative_eq!(model.discount(9), (-0.05_f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_invalid_rho_is_configuration_error() {
        let params = MarketParams::uniform(4, 100.0, 0.2, 0.05, -0.5, 9, 1.0);
        let err = MarketModel::new(params).unwrap_err();
        assert!(matches!(
            err,
            MarketError::Correlation(CorrelationError::EquicorrelationOutOfRange { dim: 4, .. })
        ));
        assert!(err.to_string().contains("rho = -0.5"));
    }

    #[test]
    fn test_zero_volatility_is_valid() {
        let params = MarketParams::uniform(1, 100.0, 0.0, 0.0, 0.0, 1, 1.0);
        assert!(MarketModel::new(params).is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let mut params = MarketParams::uniform(2, 100.0, 0.2, 0.05, 0.2, 9, 1.0);
        params.volatility.pop();
        assert!(matches!(
            params.validate(),
            Err(MarketError::DimensionMismatch { .. })
        ));

        let params = MarketParams::uniform(2, -1.0, 0.2, 0.05, 0.2, 9, 1.0);
        assert!(matches!(
            params.validate(),
            Err(MarketError::InvalidSpot { asset: 0, .. })
        ));

        let params = MarketParams::uniform(2, 100.0, 0.2, 0.05, 0.2, 0, 1.0);
        assert!(matches!(
            params.validate(),
            Err(MarketError::InvalidSchedule(_))
        ));

        let params = MarketParams::uniform(0, 100.0, 0.2, 0.05, 0.2, 9, 1.0);
        assert_eq!(params.validate(), Err(MarketError::NoAssets));
    }
}
