//! Gaussian kernel and kernel-matrix assembly.
//!
//! ```text
//! k(x, y) = exp(-gamma * |x - y|^2)
//! ```

use rayon::prelude::*;

use crate::models::StateBatch;

/// Where kernel matrices are assembled.
///
/// `Parallel` spreads rows over the Rayon pool; `Cpu` assembles on the
/// calling thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComputeDevice {
    /// Single-threaded assembly
    Cpu,
    /// Multi-threaded assembly on the Rayon pool
    #[default]
    Parallel,
}

impl ComputeDevice {
    /// `Parallel` when the Rayon pool has more than one thread, else `Cpu`.
    pub fn detect() -> Self {
        if rayon::current_num_threads() > 1 {
            ComputeDevice::Parallel
        } else {
            ComputeDevice::Cpu
        }
    }

    /// Honours an explicit opt-out of acceleration.
    pub fn from_accelerate(accelerate: bool) -> Self {
        if accelerate {
            Self::detect()
        } else {
            ComputeDevice::Cpu
        }
    }
}

/// Isotropic Gaussian (RBF) kernel with precision `gamma`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKernel {
    gamma: f64,
}

impl GaussianKernel {
    /// Creates a kernel with precision `gamma`.
    #[inline]
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    /// Kernel precision.
    #[inline]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Evaluates `k(x, y)`.
    #[inline]
    pub fn eval(&self, x: &[f64], y: &[f64]) -> f64 {
        let sq: f64 = x.iter().zip(y).map(|(a, b)| (a - b) * (a - b)).sum();
        (-self.gamma * sq).exp()
    }

    /// Cross-kernel matrix `K[i, j] = k(a_i, b_j)` in row-major order
    /// (`a.n_rows() x b.n_rows()`).
    pub fn matrix(&self, a: &StateBatch, b: &StateBatch, device: ComputeDevice) -> Vec<f64> {
        let cols = b.n_rows();
        let mut out = vec![0.0; a.n_rows() * cols];
        if cols == 0 {
            return out;
        }

        let fill_row = |(i, row): (usize, &mut [f64])| {
            let xi = a.row(i);
            for (j, slot) in row.iter_mut().enumerate() {
                *slot = self.eval(xi, b.row(j));
            }
        };

        match device {
            ComputeDevice::Parallel => out.par_chunks_mut(cols).enumerate().for_each(fill_row),
            ComputeDevice::Cpu => out.chunks_mut(cols).enumerate().for_each(fill_row),
        }
        out
    }
}
