//! Dense Cholesky factorisation.
//!
//! Matrices are stored as flat row-major `&[f64]` buffers of `dim * dim`
//! elements. Only the lower triangle of the input is read.
//!
//! ## Usage
//!
//! ```
//! use pricer_core::math::linalg::CholeskyFactor;
//!
//! // Correlation matrix with rho = 0.5
//! let corr = [1.0, 0.5, 0.5, 1.0];
//! let l = CholeskyFactor::factorise(&corr, 2).unwrap();
//!
//! // Correlate independent normals: w = L * z
//! let w = l.transform(&[0.5, 0.8]);
//! assert_eq!(w.len(), 2);
//! assert_eq!(w[0], 0.5);
//! ```

use crate::types::LinalgError;

/// Lower triangular Cholesky factor `L` of a symmetric positive definite
/// matrix `A = L * L^T`.
#[derive(Clone, Debug, PartialEq)]
pub struct CholeskyFactor {
    /// Lower triangular matrix elements (row-major, upper part zero)
    data: Vec<f64>,
    /// Matrix dimension
    dim: usize,
}

impl CholeskyFactor {
    /// Factorises a symmetric positive definite matrix.
    ///
    /// # Arguments
    ///
    /// * `a` - Matrix elements in row-major order (`dim * dim` elements)
    /// * `dim` - Matrix dimension
    ///
    /// # Errors
    ///
    /// - `LinalgError::DimensionMismatch` if `a.len() != dim * dim`
    /// - `LinalgError::NotPositiveDefinite` if a pivot is not strictly positive
    pub fn factorise(a: &[f64], dim: usize) -> Result<Self, LinalgError> {
        let expected = dim * dim;
        if a.len() != expected {
            return Err(LinalgError::DimensionMismatch {
                expected,
                got: a.len(),
            });
        }

        let n = dim;
        let mut lower = vec![0.0; n * n];

        for i in 0..n {
            for j in 0..=i {
                let mut sum = 0.0;
                for k in 0..j {
                    sum += lower[i * n + k] * lower[j * n + k];
                }

                if i == j {
                    let diag = a[i * n + i] - sum;
                    if !(diag > 0.0) {
                        return Err(LinalgError::NotPositiveDefinite {
                            pivot: i,
                            value: diag,
                        });
                    }
                    lower[i * n + i] = diag.sqrt();
                } else {
                    lower[i * n + j] = (a[i * n + j] - sum) / lower[j * n + j];
                }
            }
        }

        Ok(Self {
            data: lower,
            dim: n,
        })
    }

    /// Get matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get element at (i, j).
    ///
    /// Returns zero for upper triangular elements (j > i).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if j > i {
            0.0
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Computes `L * z`.
    ///
    /// # Panics
    ///
    /// Panics if `z.len() < self.dim()`.
    pub fn transform(&self, z: &[f64]) -> Vec<f64> {
        let mut w = vec![0.0; self.dim];
        self.transform_into(z, &mut w);
        w
    }

    /// Computes `L * z` into a caller-provided buffer.
    ///
    /// # Panics
    ///
    /// Panics if either slice is shorter than `self.dim()`.
    #[inline]
    pub fn transform_into(&self, z: &[f64], out: &mut [f64]) {
        assert!(
            z.len() >= self.dim && out.len() >= self.dim,
            "Input vector length {} is less than matrix dimension {}",
            z.len().min(out.len()),
            self.dim
        );

        let n = self.dim;
        for i in 0..n {
            let row = &self.data[i * n..i * n + i + 1];
            out[i] = row.iter().zip(z).map(|(l, zj)| l * zj).sum();
        }
    }

    /// Solves `A * x = b` by forward and backward substitution.
    ///
    /// # Panics
    ///
    /// Panics if `b.len() != self.dim()`.
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        assert_eq!(
            b.len(),
            self.dim,
            "Right-hand side length {} does not match matrix dimension {}",
            b.len(),
            self.dim
        );

        let n = self.dim;

        // L * y = b
        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut sum = b[i];
            for k in 0..i {
                sum -= self.data[i * n + k] * y[k];
            }
            y[i] = sum / self.data[i * n + i];
        }

        // L^T * x = y
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = y[i];
            for k in (i + 1)..n {
                sum -= self.data[k * n + i] * x[k];
            }
            x[i] = sum / self.data[i * n + i];
        }

        x
    }
}
