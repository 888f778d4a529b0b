//! Correlation matrices with Cholesky decomposition.
//!
//! ## Mathematical Background
//!
//! Given `d` independent standard normal random variables `Z = [Z1, ..., Zd]`,
//! correlated normals are obtained as `W = L * Z`, where `L` is the lower
//! triangular Cholesky factor of the correlation matrix `C = L * L^T`.
//!
//! ## Equicorrelation
//!
//! The basket model uses a single pairwise correlation `rho`:
//!
//! ```text
//! C = (1 - rho) * I + rho * 1 1^T
//! ```
//!
//! Its eigenvalues are `1 - rho` (multiplicity `d - 1`) and `1 + (d - 1) rho`,
//! so `C` is positive definite iff `-1/(d-1) < rho < 1`. Values outside that
//! range are rejected eagerly by [`CorrelationMatrix::equicorrelation`].
//!
//! ## Usage
//!
//! ```
//! use pricer_models::models::correlated::CorrelationMatrix;
//!
//! let corr = CorrelationMatrix::equicorrelation(3, 0.2).unwrap();
//! let l = corr.cholesky().unwrap();
//! let w = l.transform(&[0.5, 0.8, -0.1]);
//! assert_eq!(w.len(), 3);
//!
//! // rho = -0.6 is not a valid correlation for three assets
//! assert!(CorrelationMatrix::equicorrelation(3, -0.6).is_err());
//! ```

use pricer_core::math::linalg::CholeskyFactor;
use pricer_core::types::LinalgError;
use thiserror::Error;

/// Error types for correlation operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrelationError {
    /// Matrix is not positive definite
    #[error("Correlation matrix is not positive definite: {0}")]
    NotPositiveDefinite(#[from] LinalgError),

    /// Equicorrelation outside the positive definite range.
    #[error(
        "Equicorrelation rho = {rho} is not positive definite for d = {dim}: must lie in ({lower:.6}, 1)"
    )]
    EquicorrelationOutOfRange {
        /// Requested pairwise correlation
        rho: f64,
        /// Number of assets
        dim: usize,
        /// Exclusive lower bound `-1/(d-1)`
        lower: f64,
    },
}

/// Equicorrelation matrix with Cholesky decomposition.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix {
    /// Matrix elements in row-major order
    data: Vec<f64>,
    /// Matrix dimension (n x n)
    dim: usize,
}

impl CorrelationMatrix {
    /// Create an equicorrelation matrix `(1 - rho) I + rho 1 1^T`.
    ///
    /// For `dim == 1` the matrix is `[1]` and `rho` is ignored.
    ///
    /// # Errors
    ///
    /// `CorrelationError::EquicorrelationOutOfRange` when `rho` is not in
    /// `(-1/(dim-1), 1)` or is not finite.
    pub fn equicorrelation(dim: usize, rho: f64) -> Result<Self, CorrelationError> {
        let off_diagonal = if dim <= 1 {
            0.0
        } else {
            let lower = -1.0 / (dim as f64 - 1.0);
            if !(rho > lower && rho < 1.0) {
                return Err(CorrelationError::EquicorrelationOutOfRange { rho, dim, lower });
            }
            rho
        };

        let mut data = vec![off_diagonal; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Ok(Self { data, dim })
    }

    /// Compute Cholesky decomposition (lower triangular L where C = L * L^T).
    ///
    /// # Returns
    ///
    /// `Ok(CholeskyFactor)` if decomposition succeeds (matrix is positive definite),
    /// `Err(CorrelationError::NotPositiveDefinite)` otherwise.
    pub fn cholesky(&self) -> Result<CholeskyFactor, CorrelationError> {
        Ok(CholeskyFactor::factorise(&self.data, self.dim)?)
    }
}
