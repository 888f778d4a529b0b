//! Hyperparameter selection by hold-out validation.
//!
//! The training set is shuffled once, `floor(fraction * n)` rows are held
//! out, and one candidate is fitted per grid cell on the remainder. The cell
//! with the strictly lowest finite validation MSE wins; the first such cell
//! in grid order wins ties.

use pricer_models::models::StateBatch;
use pricer_models::regression::{Hyperparameters, Predictor, Regressor};
use rand::seq::SliceRandom;
use rayon::prelude::*;
use tracing::debug;

use super::error::{ConfigError, SelectionError};
use crate::rng::PricerRng;

/// Substream index used for the train/validation shuffle. Grid cells use
/// `1 + cell index`.
const SHUFFLE_STREAM: u64 = 0;

/// Cartesian grid of ridge penalties and kernel precisions.
///
/// Iteration order is alphas outer, gammas inner.
#[derive(Clone, Debug, PartialEq)]
pub struct HyperparameterGrid {
    cells: Vec<Hyperparameters>,
}

impl HyperparameterGrid {
    /// Builds the grid from penalties and kernel precisions.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidParameter` if either list is empty or a value is
    /// out of range (`alpha >= 0`, `gamma > 0`, both finite).
    pub fn new(alphas: &[f64], gammas: &[f64]) -> Result<Self, ConfigError> {
        if alphas.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "alphas",
                value: "must not be empty".to_string(),
            });
        }
        if gammas.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "lengthscales",
                value: "must not be empty".to_string(),
            });
        }

        let mut cells = Vec::with_capacity(alphas.len() * gammas.len());
        for &alpha in alphas {
            for &gamma in gammas {
                let cell = Hyperparameters::new(alpha, gamma);
                if !cell.is_valid() {
                    return Err(ConfigError::InvalidParameter {
                        name: "grid",
                        value: format!(
                            "alpha = {alpha} must be non-negative and gamma = {gamma} positive, both finite"
                        ),
                    });
                }
                cells.push(cell);
            }
        }
        Ok(Self { cells })
    }

    /// Builds the grid from penalties and kernel lengthscales
    /// (`gamma = 1 / (2 l^2)`).
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new); a non-positive lengthscale is rejected.
    pub fn from_lengthscales(alphas: &[f64], lengthscales: &[f64]) -> Result<Self, ConfigError> {
        if let Some(&bad) = lengthscales.iter().find(|l| !(**l > 0.0 && l.is_finite())) {
            return Err(ConfigError::InvalidParameter {
                name: "lengthscales",
                value: format!("{bad} must be positive and finite"),
            });
        }
        let gammas: Vec<f64> = lengthscales
            .iter()
            .map(|&l| pricer_models::regression::gamma_from_lengthscale(l))
            .collect();
        Self::new(alphas, &gammas)
    }

    /// Single-cell grid.
    pub fn single(hyper: Hyperparameters) -> Self {
        Self { cells: vec![hyper] }
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` for an empty grid.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in iteration order.
    #[inline]
    pub fn cells(&self) -> &[Hyperparameters] {
        &self.cells
    }

    /// Iterates over cells in order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Hyperparameters> {
        self.cells.iter()
    }
}

/// Winning model of a selection.
#[derive(Debug)]
pub struct Selection<M> {
    /// Fitted model of the winning cell
    pub model: M,
    /// Winning cell
    pub hyperparameters: Hyperparameters,
    /// Validation MSE of the winning cell
    pub validation_mse: f64,
    /// Validation MSE of every cell in grid order (NaN where fitting failed)
    pub scores: Vec<f64>,
}

/// Fits one candidate per grid cell and keeps the best on a hold-out split.
#[derive(Debug)]
pub struct ModelSelector<'a, R> {
    regressor: &'a R,
    grid: &'a HyperparameterGrid,
    validation_fraction: f64,
}

impl<'a, R: Regressor> ModelSelector<'a, R> {
    /// Creates a selector.
    pub fn new(regressor: &'a R, grid: &'a HyperparameterGrid, validation_fraction: f64) -> Self {
        Self {
            regressor,
            grid,
            validation_fraction,
        }
    }

    /// Selects the best model for `(x, y)`.
    ///
    /// The shuffle and every cell fit draw from substreams of `rng`, so the
    /// outcome does not depend on how cells are scheduled across threads.
    ///
    /// # Errors
    ///
    /// - `SelectionError::InsufficientData` if either partition is empty
    /// - `SelectionError::NoFiniteScore` if no cell yields a finite score
    pub fn select(
        &self,
        x: &StateBatch,
        y: &[f64],
        rng: &PricerRng,
    ) -> Result<Selection<R::Model>, SelectionError> {
        let n = x.n_rows().min(y.len());
        let n_val = (self.validation_fraction * n as f64).floor() as usize;
        let n_train = n - n_val.min(n);
        if n_val == 0 || n_train == 0 {
            return Err(SelectionError::InsufficientData { n, n_train, n_val });
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut rng.substream(SHUFFLE_STREAM));
        let (val_idx, train_idx) = order.split_at(n_val);

        let x_train = x.select_rows(train_idx);
        let y_train: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
        let x_val = x.select_rows(val_idx);
        let y_val: Vec<f64> = val_idx.iter().map(|&i| y[i]).collect();

        let outcomes: Vec<(Option<R::Model>, f64)> = self
            .grid
            .cells()
            .par_iter()
            .enumerate()
            .map(|(cell, &hyper)| {
                let mut cell_rng = rng.substream(cell as u64 + 1);
                match self.regressor.fit(&x_train, &y_train, hyper, &mut cell_rng) {
                    Ok(model) => {
                        let score = mean_squared_error(&model.predict(&x_val), &y_val);
                        (Some(model), score)
                    }
                    Err(err) => {
                        debug!(
                            cell,
                            alpha = hyper.alpha,
                            gamma = hyper.gamma,
                            error = %err,
                            "Grid cell failed to fit"
                        );
                        (None, f64::NAN)
                    }
                }
            })
            .collect();

        let scores: Vec<f64> = outcomes.iter().map(|(_, s)| *s).collect();
        let mut best: Option<usize> = None;
        for (i, &score) in scores.iter().enumerate() {
            if !score.is_finite() || outcomes[i].0.is_none() {
                continue;
            }
            if best.map_or(true, |b| score < scores[b]) {
                best = Some(i);
            }
        }

        let winner = best.ok_or(SelectionError::NoFiniteScore {
            cells: self.grid.len(),
        })?;
        let validation_mse = scores[winner];
        let model = outcomes
            .into_iter()
            .nth(winner)
            .and_then(|(model, _)| model)
            .ok_or(SelectionError::NoFiniteScore {
                cells: self.grid.len(),
            })?;

        Ok(Selection {
            model,
            hyperparameters: self.grid.cells()[winner],
            validation_mse,
            scores,
        })
    }
}

/// Mean squared error; NaN for empty input.
pub fn mean_squared_error(predicted: &[f64], actual: &[f64]) -> f64 {
    if predicted.is_empty() || predicted.len() != actual.len() {
        return f64::NAN;
    }
    predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a) * (p - a))
        .sum::<f64>()
        / predicted.len() as f64
}
