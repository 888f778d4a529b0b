//! Nyström-approximated Gaussian kernel ridge regression.
//!
//! With `m` centres `C` drawn uniformly without replacement from the `n`
//! training inputs, the coefficients solve
//!
//! ```text
//! (Knm^T Knm + alpha * n * Kmm + eps * I) beta = Knm^T y
//! ```
//!
//! where `Knm = k(X, C)`, `Kmm = k(C, C)` and `eps` is a small relative
//! jitter. Predictions are `k(x, C) beta`. A zero target vector yields
//! exactly zero coefficients and therefore exactly zero predictions.

use pricer_core::math::linalg::CholeskyFactor;
use rand::seq::index;
use rand::Rng;
use rayon::prelude::*;
use tracing::trace;

use crate::models::StateBatch;

use super::error::RegressionError;
use super::kernel::{ComputeDevice, GaussianKernel};
use super::traits::{check_training_set, Hyperparameters, Predictor, Regressor};

/// Relative diagonal jitter added to the normal equations.
const RELATIVE_JITTER: f64 = 1e-8;

/// Absolute floor on the diagonal jitter.
const MIN_JITTER: f64 = 1e-12;

/// Nyström kernel ridge regressor.
///
/// # Examples
/// ```
/// use pricer_models::models::StateBatch;
/// use pricer_models::regression::{ComputeDevice, Hyperparameters, NystromKrr, Predictor, Regressor};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let x = StateBatch::from_rows(&[[90.0], [100.0], [110.0], [120.0]]);
/// let y = vec![0.0, 0.0, 10.0, 20.0];
///
/// let krr = NystromKrr::new(4, ComputeDevice::Cpu);
/// let model = krr
///     .fit(&x, &y, Hyperparameters::from_lengthscale(1e-6, 10.0), &mut StdRng::seed_from_u64(1))
///     .unwrap();
/// let fitted = model.predict(&x);
/// assert!((fitted[3] - 20.0).abs() < 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NystromKrr {
    centres: usize,
    device: ComputeDevice,
}

impl NystromKrr {
    /// Creates a regressor using at most `centres` Nyström centres.
    pub fn new(centres: usize, device: ComputeDevice) -> Self {
        Self {
            centres: centres.max(1),
            device,
        }
    }

    /// Maximum number of centres.
    #[inline]
    pub fn centres(&self) -> usize {
        self.centres
    }

    /// Kernel assembly device.
    #[inline]
    pub fn device(&self) -> ComputeDevice {
        self.device
    }
}

/// Fitted Nyström kernel ridge model.
#[derive(Debug, Clone)]
pub struct NystromModel {
    kernel: GaussianKernel,
    centres: StateBatch,
    coefficients: Vec<f64>,
    device: ComputeDevice,
}

impl NystromModel {
    /// Centres retained by the fit.
    pub fn centres(&self) -> &StateBatch {
        &self.centres
    }

    /// Coefficients `beta`, one per centre.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    #[inline]
    fn predict_row(&self, x: &[f64]) -> f64 {
        self.centres
            .rows()
            .zip(&self.coefficients)
            .map(|(c, &b)| b * self.kernel.eval(x, c))
            .sum()
    }
}

impl Predictor for NystromModel {
    fn predict(&self, x: &StateBatch) -> Vec<f64> {
        match self.device {
            ComputeDevice::Parallel => x
                .as_slice()
                .par_chunks_exact(x.dim())
                .map(|row| self.predict_row(row))
                .collect(),
            ComputeDevice::Cpu => x.rows().map(|row| self.predict_row(row)).collect(),
        }
    }
}

impl Regressor for NystromKrr {
    type Model = NystromModel;

    fn fit<R: Rng + ?Sized>(
        &self,
        x: &StateBatch,
        y: &[f64],
        hyper: Hyperparameters,
        rng: &mut R,
    ) -> Result<NystromModel, RegressionError> {
        check_training_set(x, y)?;
        if !hyper.is_valid() {
            return Err(RegressionError::InvalidHyperparameters {
                alpha: hyper.alpha,
                gamma: hyper.gamma,
            });
        }

        let n = x.n_rows();
        let m = self.centres.min(n);
        let picked = index::sample(rng, n, m).into_vec();
        let centres = x.select_rows(&picked);

        let kernel = GaussianKernel::new(hyper.gamma);
        let knm = kernel.matrix(x, &centres, self.device);
        let kmm = kernel.matrix(&centres, &centres, self.device);

        let mut system = gram(&knm, n, m, self.device);
        let penalty = hyper.alpha * n as f64;
        for (s, k) in system.iter_mut().zip(&kmm) {
            *s += penalty * k;
        }

        let mean_diag = (0..m).map(|i| system[i * m + i]).sum::<f64>() / m as f64;
        let jitter = (RELATIVE_JITTER * mean_diag).max(MIN_JITTER);
        for i in 0..m {
            system[i * m + i] += jitter;
        }

        let mut rhs = vec![0.0; m];
        for (row, &target) in knm.chunks_exact(m).zip(y) {
            for (r, &k) in rhs.iter_mut().zip(row) {
                *r += k * target;
            }
        }

        let factor = CholeskyFactor::factorise(&system, m)?;
        let coefficients = factor.solve(&rhs);

        trace!(n, m, alpha = hyper.alpha, gamma = hyper.gamma, jitter, "Nyström fit");

        Ok(NystromModel {
            kernel,
            centres,
            coefficients,
            device: self.device,
        })
    }

    fn name(&self) -> &'static str {
        "nystrom-krr"
    }
}

/// `A^T A` for row-major `a` of shape `rows x cols`.
fn gram(a: &[f64], rows: usize, cols: usize, device: ComputeDevice) -> Vec<f64> {
    let mut transposed = vec![0.0; cols * rows];
    for i in 0..rows {
        for j in 0..cols {
            transposed[j * rows + i] = a[i * cols + j];
        }
    }

    let mut out = vec![0.0; cols * cols];
    let fill_row = |(i, out_row): (usize, &mut [f64])| {
        let ai = &transposed[i * rows..(i + 1) * rows];
        for (j, slot) in out_row.iter_mut().enumerate() {
            let aj = &transposed[j * rows..(j + 1) * rows];
            *slot = ai.iter().zip(aj).map(|(p, q)| p * q).sum();
        }
    };
    match device {
        ComputeDevice::Parallel => out.par_chunks_mut(cols).enumerate().for_each(fill_row),
        ComputeDevice::Cpu => out.chunks_mut(cols).enumerate().for_each(fill_row),
    }
    out
}
