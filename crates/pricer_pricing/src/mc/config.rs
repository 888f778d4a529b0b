//! Regression Monte Carlo configuration.
//!
//! This module provides the immutable engine configuration and its builder.
//! Market parameters and the payoff are supplied separately to the engine.

use pricer_models::regression::ComputeDevice;

use super::error::ConfigError;
use super::selection::HyperparameterGrid;

/// Maximum number of repetitions allowed.
pub const MAX_REPEATS: usize = 10_000;

/// Maximum number of samples (training states, inner samples, paths) allowed.
pub const MAX_SAMPLES: usize = 10_000_000;

/// Default number of repetitions.
pub const DEFAULT_REPEATS: usize = 1;

/// Default number of training states per exercise date.
pub const DEFAULT_TRAINING_SAMPLES: usize = 500;

/// Default number of inner one-step samples per training state.
pub const DEFAULT_INNER_SAMPLES: usize = 150;

/// Default number of Nyström centres.
pub const DEFAULT_NYSTROM_CENTRES: usize = 250;

/// Default kernel lengthscales.
pub const DEFAULT_LENGTHSCALES: [f64; 4] = [100.0, 110.0, 120.0, 130.0];

/// Default ridge penalties.
pub const DEFAULT_ALPHAS: [f64; 1] = [1e-6];

/// Default share of training states held out for validation.
pub const DEFAULT_VALIDATION_FRACTION: f64 = 0.3;

/// Default number of hindsight paths.
pub const DEFAULT_HINDSIGHT_PATHS: usize = 1000;

/// Default top-level seed.
pub const DEFAULT_SEED: u64 = 7;

/// Regression Monte Carlo configuration.
///
/// Immutable configuration specifying simulation and model-selection
/// parameters. Use [`RmcConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::RmcConfig;
///
/// let config = RmcConfig::builder()
///     .repeats(5)
///     .n_train(200)
///     .inner_samples(50)
///     .lengthscales(vec![100.0, 120.0])
///     .seed(42)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.repeats(), 5);
/// assert_eq!(config.grid().len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct RmcConfig {
    repeats: usize,
    n_train: usize,
    inner_samples: usize,
    nystrom_centres: usize,
    grid: HyperparameterGrid,
    validation_fraction: f64,
    hindsight_paths: usize,
    seed: u64,
    device: ComputeDevice,
}

impl RmcConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> RmcConfigBuilder {
        RmcConfigBuilder::default()
    }

    /// Number of independent repetitions of the backward recursion.
    #[inline]
    pub fn repeats(&self) -> usize {
        self.repeats
    }

    /// Training states per exercise date (`n`).
    #[inline]
    pub fn n_train(&self) -> usize {
        self.n_train
    }

    /// Inner one-step samples per training state (`M`).
    #[inline]
    pub fn inner_samples(&self) -> usize {
        self.inner_samples
    }

    /// Nyström centre count.
    #[inline]
    pub fn nystrom_centres(&self) -> usize {
        self.nystrom_centres
    }

    /// Hyperparameter grid.
    #[inline]
    pub fn grid(&self) -> &HyperparameterGrid {
        &self.grid
    }

    /// Share of training states held out for validation.
    #[inline]
    pub fn validation_fraction(&self) -> f64 {
        self.validation_fraction
    }

    /// Hindsight path count.
    #[inline]
    pub fn hindsight_paths(&self) -> usize {
        self.hindsight_paths
    }

    /// Top-level seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Kernel assembly device.
    #[inline]
    pub fn device(&self) -> ComputeDevice {
        self.device
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a count is out of range, the validation
    /// fraction is not in `(0, 1)`, or the train/validation split of
    /// `n_train` leaves a partition empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_count("repeats", self.repeats, 1, MAX_REPEATS)?;
        check_count("n_train", self.n_train, 2, MAX_SAMPLES)?;
        check_count("inner_samples", self.inner_samples, 1, MAX_SAMPLES)?;
        check_count("nystrom_centres", self.nystrom_centres, 1, MAX_SAMPLES)?;
        check_count("hindsight_paths", self.hindsight_paths, 1, MAX_SAMPLES)?;

        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "validation_fraction",
                value: format!("{} must lie in (0, 1)", self.validation_fraction),
            });
        }

        let n_val = (self.validation_fraction * self.n_train as f64).floor() as usize;
        if n_val == 0 || n_val >= self.n_train {
            return Err(ConfigError::InvalidParameter {
                name: "n_train",
                value: format!(
                    "{} samples leave an empty partition at validation fraction {}",
                    self.n_train, self.validation_fraction
                ),
            });
        }
        Ok(())
    }
}

fn check_count(name: &'static str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::InvalidCount {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Builder for [`RmcConfig`].
///
/// Unset fields take the documented defaults; the kernel assembly device
/// defaults to [`ComputeDevice::detect`].
#[derive(Clone, Debug, Default)]
pub struct RmcConfigBuilder {
    repeats: Option<usize>,
    n_train: Option<usize>,
    inner_samples: Option<usize>,
    nystrom_centres: Option<usize>,
    alphas: Option<Vec<f64>>,
    lengthscales: Option<Vec<f64>>,
    validation_fraction: Option<f64>,
    hindsight_paths: Option<usize>,
    seed: Option<u64>,
    device: Option<ComputeDevice>,
}

impl RmcConfigBuilder {
    /// Sets the number of repetitions, in [1, 10_000].
    #[inline]
    pub fn repeats(mut self, repeats: usize) -> Self {
        self.repeats = Some(repeats);
        self
    }

    /// Sets the number of training states per exercise date.
    #[inline]
    pub fn n_train(mut self, n_train: usize) -> Self {
        self.n_train = Some(n_train);
        self
    }

    /// Sets the number of inner one-step samples per training state.
    #[inline]
    pub fn inner_samples(mut self, inner_samples: usize) -> Self {
        self.inner_samples = Some(inner_samples);
        self
    }

    /// Sets the Nyström centre count.
    #[inline]
    pub fn nystrom_centres(mut self, nystrom_centres: usize) -> Self {
        self.nystrom_centres = Some(nystrom_centres);
        self
    }

    /// Sets the ridge penalties searched.
    #[inline]
    pub fn alphas(mut self, alphas: Vec<f64>) -> Self {
        self.alphas = Some(alphas);
        self
    }

    /// Sets the kernel lengthscales searched.
    #[inline]
    pub fn lengthscales(mut self, lengthscales: Vec<f64>) -> Self {
        self.lengthscales = Some(lengthscales);
        self
    }

    /// Sets the share of training states held out for validation.
    #[inline]
    pub fn validation_fraction(mut self, fraction: f64) -> Self {
        self.validation_fraction = Some(fraction);
        self
    }

    /// Sets the hindsight path count.
    #[inline]
    pub fn hindsight_paths(mut self, hindsight_paths: usize) -> Self {
        self.hindsight_paths = Some(hindsight_paths);
        self
    }

    /// Sets the seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the kernel assembly device.
    #[inline]
    pub fn device(mut self, device: ComputeDevice) -> Self {
        self.device = Some(device);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any count is out of range, the grid is
    /// empty, or a penalty or lengthscale is invalid.
    pub fn build(self) -> Result<RmcConfig, ConfigError> {
        let alphas = self.alphas.unwrap_or_else(|| DEFAULT_ALPHAS.to_vec());
        let lengthscales = self
            .lengthscales
            .unwrap_or_else(|| DEFAULT_LENGTHSCALES.to_vec());
        let grid = HyperparameterGrid::from_lengthscales(&alphas, &lengthscales)?;

        let config = RmcConfig {
            repeats: self.repeats.unwrap_or(DEFAULT_REPEATS),
            n_train: self.n_train.unwrap_or(DEFAULT_TRAINING_SAMPLES),
            inner_samples: self.inner_samples.unwrap_or(DEFAULT_INNER_SAMPLES),
            nystrom_centres: self.nystrom_centres.unwrap_or(DEFAULT_NYSTROM_CENTRES),
            grid,
            validation_fraction: self
                .validation_fraction
                .unwrap_or(DEFAULT_VALIDATION_FRACTION),
            hindsight_paths: self.hindsight_paths.unwrap_or(DEFAULT_HINDSIGHT_PATHS),
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            device: self.device.unwrap_or_else(ComputeDevice::detect),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RmcConfig::builder().build().unwrap();

        assert_eq!(config.repeats(), 1);
        assert_eq!(config.n_train(), 500);
        assert_eq!(config.inner_samples(), 150);
        assert_eq!(config.nystrom_centres(), 250);
        assert_eq!(config.grid().len(), 4);
        assert_eq!(config.validation_fraction(), 0.3);
        assert_eq!(config.hindsight_paths(), 1000);
        assert_eq!(config.seed(), 7);
    }

    #[test]
    fn test_grid_order_alphas_outer() {
        let config = RmcConfig::builder()
            .alphas(vec![1e-6, 1e-3])
            .lengthscales(vec![10.0, 20.0])
            .build()
            .unwrap();

        let cells: Vec<(f64, f64)> = config
            .grid()
            .iter()
            .map(|h| (h.alpha, h.lengthscale()))
            .collect();
        assert_eq!(cells[0].0, 1e-6);
        assert_eq!(cells[1].0, 1e-6);
        assert_eq!(cells[2].0, 1e-3);
        assert!((cells[1].1 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_zero_repeats() {
        let result = RmcConfig::builder().repeats(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidCount {
                name: "repeats",
                value: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_single_training_sample() {
        let result = RmcConfig::builder().n_train(1).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidCount {
                name: "n_train",
                ..
            })
        ));
    }

    #[test]
    fn test_training_set_too_small_to_split() {
        // floor(0.3 * 3) = 0 validation rows
        let result = RmcConfig::builder().n_train(3).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "n_train", .. })
        ));

        // floor(0.3 * 4) = 1 validation row, 3 training rows
        assert!(RmcConfig::builder().n_train(4).build().is_ok());
    }

    #[test]
    fn test_split_minimum_follows_validation_fraction() {
        let result = RmcConfig::builder().n_train(9).validation_fraction(0.1).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "n_train", .. })
        ));
        assert!(RmcConfig::builder()
            .n_train(10)
            .validation_fraction(0.1)
            .build()
            .is_ok());
    }

    #[test]
    fn test_invalid_validation_fraction() {
        let result = RmcConfig::builder().validation_fraction(1.0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "validation_fraction",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_grid_rejected() {
        let result = RmcConfig::builder().alphas(Vec::new()).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "alphas", .. })
        ));
    }

    #[test]
    fn test_explicit_device() {
        let config = RmcConfig::builder()
            .device(ComputeDevice::Cpu)
            .build()
            .unwrap();
        assert_eq!(config.device(), ComputeDevice::Cpu);
    }
}
