//! k-nearest-neighbour averaging.
//!
//! A model-free stand-in for [`NystromKrr`](super::NystromKrr): the
//! prediction at `x` is the mean target of the `k` closest training inputs
//! (Euclidean distance, ties broken by training index). Hyperparameters
//! are accepted and ignored.

use rand::Rng;

use crate::models::StateBatch;

use super::error::RegressionError;
use super::traits::{check_training_set, Hyperparameters, Predictor, Regressor};

/// k-nearest-neighbour regressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearestNeighbour {
    k: usize,
}

impl NearestNeighbour {
    /// Creates a regressor averaging over `k` neighbours (at least one).
    pub fn new(k: usize) -> Self {
        Self { k: k.max(1) }
    }

    /// Neighbour count.
    pub fn k(&self) -> usize {
        self.k
    }
}

/// Fitted k-nearest-neighbour model: the stored training set.
#[derive(Debug, Clone)]
pub struct NearestModel {
    k: usize,
    inputs: StateBatch,
    targets: Vec<f64>,
}

impl NearestModel {
    fn predict_row(&self, x: &[f64], scratch: &mut Vec<(f64, usize)>) -> f64 {
        scratch.clear();
        scratch.extend(self.inputs.rows().enumerate().map(|(i, row)| {
            let sq: f64 = row.iter().zip(x).map(|(a, b)| (a - b) * (a - b)).sum();
            (sq, i)
        }));
        let k = self.k.min(scratch.len());
        scratch.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scratch[..k].iter().map(|&(_, i)| self.targets[i]).sum::<f64>() / k as f64
    }
}

impl Predictor for NearestModel {
    fn predict(&self, x: &StateBatch) -> Vec<f64> {
        let mut scratch = Vec::with_capacity(self.inputs.n_rows());
        x.rows().map(|row| self.predict_row(row, &mut scratch)).collect()
    }
}

impl Regressor for NearestNeighbour {
    type Model = NearestModel;

    fn fit<R: Rng + ?Sized>(
        &self,
        x: &StateBatch,
        y: &[f64],
        _hyper: Hyperparameters,
        _rng: &mut R,
    ) -> Result<NearestModel, RegressionError> {
        check_training_set(x, y)?;
        Ok(NearestModel {
            k: self.k,
            inputs: x.clone(),
            targets: y.to_vec(),
        })
    }

    fn name(&self) -> &'static str {
        "nearest-neighbour"
    }
}
