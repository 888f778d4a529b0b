//! Pricing configuration management.
//!
//! Settings are layered: defaults, then an optional TOML file, then
//! `KERNEL_DP_*` environment variables, then command-line flags. The merged
//! configuration is validated once, collecting every problem found.

use std::path::{Path, PathBuf};

use pricer_models::instruments::{BasketPayoff, PayoffKind};
use pricer_models::models::{MarketModel, MarketParams};
use pricer_models::regression::ComputeDevice;
use pricer_pricing::mc::config::{DEFAULT_ALPHAS, DEFAULT_LENGTHSCALES, DEFAULT_VALIDATION_FRACTION};
use pricer_pricing::mc::RmcConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{CliError, Result};

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "KERNEL_DP_";

/// Market and contract constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Exercise dates after the valuation date (`T`)
    pub n_exercise: usize,
    /// Risk-free rate
    pub rate: f64,
    /// Strike
    pub strike: f64,
    /// Volatility shared by every asset
    pub volatility: f64,
    /// Initial price shared by every asset
    pub spot: f64,
    /// Horizon spanned by the exercise dates
    pub horizon: f64,
    /// Pairwise equicorrelation
    pub rho: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            n_exercise: 9,
            rate: 0.05,
            strike: 100.0,
            volatility: 0.2,
            spot: 100.0,
            horizon: 1.0,
            rho: 0.2,
        }
    }
}

/// Full pricing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Number of assets
    pub d: usize,
    /// Payoff name (`max-call` or `geo-put`)
    pub payoff: String,
    /// Independent repetitions
    pub repeats: usize,
    /// Training states per exercise date
    pub n_train: usize,
    /// Inner samples per continuation estimate
    pub inner_samples: usize,
    /// Nyström centres
    pub nystrom_centres: usize,
    /// Kernel lengthscales searched
    pub lengthscales: Vec<f64>,
    /// Ridge penalties searched
    pub alphas: Vec<f64>,
    /// Root seed
    pub seed: u64,
    /// Multi-threaded kernel assembly
    pub accelerate: bool,
    /// Paths of the hindsight benchmark
    pub hindsight_paths: usize,
    /// Write value surfaces after pricing
    pub plot_panels: bool,
    /// Directory receiving exported files
    pub output_dir: PathBuf,
    /// Market and contract constants
    pub market: MarketConfig,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            d: 2,
            payoff: PayoffKind::MaxCall.as_str().to_string(),
            repeats: 1,
            n_train: 500,
            inner_samples: 150,
            nystrom_centres: 250,
            lengthscales: DEFAULT_LENGTHSCALES.to_vec(),
            alphas: DEFAULT_ALPHAS.to_vec(),
            seed: 7,
            accelerate: true,
            hindsight_paths: 1000,
            plot_panels: false,
            output_dir: PathBuf::from("."),
            market: MarketConfig::default(),
        }
    }
}

impl PricingConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text; missing keys keep their defaults.
    pub fn from_toml(content: &str) -> std::result::Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `KERNEL_DP_*` environment overrides.
    pub fn with_env_override(self) -> std::result::Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Apply overrides looked up by key (without the prefix).
    ///
    /// Unparsable values are collected into a single validation error.
    pub fn with_overrides<F>(mut self, lookup: F) -> std::result::Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        override_value(&lookup, "D", &mut self.d, &mut errors);
        if let Some(payoff) = lookup("PAYOFF") {
            self.payoff = payoff;
        }
        override_value(&lookup, "REPEATS", &mut self.repeats, &mut errors);
        override_value(&lookup, "N", &mut self.n_train, &mut errors);
        override_value(&lookup, "M", &mut self.inner_samples, &mut errors);
        override_value(&lookup, "M_NYSTROM", &mut self.nystrom_centres, &mut errors);
        override_list(&lookup, "LENGTHSCALES", &mut self.lengthscales, &mut errors);
        override_list(&lookup, "ALPHAS", &mut self.alphas, &mut errors);
        override_value(&lookup, "SEED", &mut self.seed, &mut errors);
        override_value(&lookup, "ACCELERATE", &mut self.accelerate, &mut errors);
        override_value(&lookup, "HINDSIGHT_PATHS", &mut self.hindsight_paths, &mut errors);
        if let Some(dir) = lookup("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }

        let market = &mut self.market;
        override_value(&lookup, "T", &mut market.n_exercise, &mut errors);
        override_value(&lookup, "RATE", &mut market.rate, &mut errors);
        override_value(&lookup, "STRIKE", &mut market.strike, &mut errors);
        override_value(&lookup, "VOLATILITY", &mut market.volatility, &mut errors);
        override_value(&lookup, "SPOT", &mut market.spot, &mut errors);
        override_value(&lookup, "HORIZON", &mut market.horizon, &mut errors);
        override_value(&lookup, "RHO", &mut market.rho, &mut errors);

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.d == 0 {
            errors.push("d must be at least 1".to_string());
        }
        if let Err(e) = self.payoff.parse::<PayoffKind>() {
            errors.push(e.to_string());
        }
        if self.repeats == 0 {
            errors.push("repeats must be greater than 0".to_string());
        }
        let n_val = (DEFAULT_VALIDATION_FRACTION * self.n_train as f64).floor() as usize;
        if n_val == 0 || n_val >= self.n_train {
            errors.push(format!(
                "n = {} leaves an empty training or validation split at fraction {}",
                self.n_train, DEFAULT_VALIDATION_FRACTION
            ));
        }
        if self.inner_samples == 0 {
            errors.push("M must be greater than 0".to_string());
        }
        if self.nystrom_centres == 0 {
            errors.push("m-nystrom must be greater than 0".to_string());
        }
        if self.hindsight_paths == 0 {
            errors.push("hindsight_paths must be greater than 0".to_string());
        }
        if self.lengthscales.is_empty() {
            errors.push("lengthscales must not be empty".to_string());
        }
        if let Some(l) = self.lengthscales.iter().find(|l| !(l.is_finite() && **l > 0.0)) {
            errors.push(format!("lengthscale {l} must be positive and finite"));
        }
        if self.alphas.is_empty() {
            errors.push("alphas must not be empty".to_string());
        }
        if let Some(a) = self.alphas.iter().find(|a| !(a.is_finite() && **a >= 0.0)) {
            errors.push(format!("alpha {a} must be non-negative and finite"));
        }

        let market = &self.market;
        if market.n_exercise == 0 {
            errors.push("T must be at least 1".to_string());
        }
        if !(market.spot.is_finite() && market.spot > 0.0) {
            errors.push(format!("spot {} must be positive", market.spot));
        }
        if let Err(e) = BasketPayoff::check_strike(market.strike) {
            errors.push(e.to_string());
        }
        if !(market.volatility.is_finite() && market.volatility >= 0.0) {
            errors.push(format!("volatility {} must be non-negative", market.volatility));
        }
        if !(market.horizon.is_finite() && market.horizon > 0.0) {
            errors.push(format!("horizon {} must be positive", market.horizon));
        }
        if !market.rate.is_finite() {
            errors.push("rate must be finite".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Payoff kind named by the configuration.
    pub fn payoff_kind(&self) -> Result<PayoffKind> {
        Ok(self.payoff.parse()?)
    }

    /// Market model; rejects `rho` outside the valid equicorrelation range.
    pub fn market_model(&self) -> Result<MarketModel> {
        let m = &self.market;
        let params = MarketParams::uniform(
            self.d,
            m.spot,
            m.volatility,
            m.rate,
            m.rho,
            m.n_exercise,
            m.horizon,
        );
        Ok(MarketModel::new(params)?)
    }

    /// Basket payoff at the configured strike.
    pub fn basket_payoff(&self) -> Result<BasketPayoff> {
        Ok(BasketPayoff::new(self.payoff_kind()?, self.market.strike)?)
    }

    /// Engine configuration.
    pub fn engine_config(&self) -> Result<RmcConfig> {
        RmcConfig::builder()
            .repeats(self.repeats)
            .n_train(self.n_train)
            .inner_samples(self.inner_samples)
            .nystrom_centres(self.nystrom_centres)
            .lengthscales(self.lengthscales.clone())
            .alphas(self.alphas.clone())
            .hindsight_paths(self.hindsight_paths)
            .seed(self.seed)
            .device(ComputeDevice::from_accelerate(self.accelerate))
            .build()
            .map_err(CliError::from)
    }
}

fn override_value<F, T>(lookup: &F, key: &str, target: &mut T, errors: &mut Vec<String>)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => errors.push(format!("{ENV_PREFIX}{key}: cannot parse '{raw}'")),
        }
    }
}

fn override_list<F>(lookup: &F, key: &str, target: &mut Vec<f64>, errors: &mut Vec<String>)
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    let parsed: std::result::Result<Vec<f64>, _> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect();
    match parsed {
        Ok(values) => *target = values,
        Err(_) => errors.push(format!("{ENV_PREFIX}{key}: cannot parse '{raw}'")),
    }
}

/// Configuration error type
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("Cannot read {}: {message}", path.display())]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying error
        message: String,
    },

    /// Parse error in config file
    #[error("Parse error: {0}")]
    Parse(String),

    /// Validation error
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = PricingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.market.n_exercise, 9);
        assert_eq!(config.lengthscales, vec![100.0, 110.0, 120.0, 130.0]);
        assert_eq!(config.alphas, vec![1e-6]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PricingConfig::from_toml(
            r#"
            d = 3
            payoff = "geo-put"

            [market]
            rho = 0.1
            "#,
        )
        .unwrap();

        assert_eq!(config.d, 3);
        assert_eq!(config.payoff, "geo-put");
        assert_eq!(config.market.rho, 0.1);
        assert_eq!(config.market.strike, 100.0);
        assert_eq!(config.n_train, 500);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "repeats = 4\nseed = 11").unwrap();

        let config = PricingConfig::load(file.path()).unwrap();
        assert_eq!(config.repeats, 4);
        assert_eq!(config.seed, 11);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PricingConfig::load(Path::new("/nonexistent/kernel-dp.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = PricingConfig::from_toml("d = \"two\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_overrides_apply() {
        let config = PricingConfig::default()
            .with_overrides(lookup(&[
                ("D", "5"),
                ("PAYOFF", "geometric-basket-put"),
                ("LENGTHSCALES", "90, 100"),
                ("RHO", "0.3"),
                ("ACCELERATE", "false"),
            ]))
            .unwrap();

        assert_eq!(config.d, 5);
        assert_eq!(config.payoff_kind().unwrap(), PayoffKind::GeometricPut);
        assert_eq!(config.lengthscales, vec![90.0, 100.0]);
        assert_eq!(config.market.rho, 0.3);
        assert!(!config.accelerate);
    }

    #[test]
    fn test_unparsable_overrides_are_collected() {
        let err = PricingConfig::default()
            .with_overrides(lookup(&[("N", "many"), ("ALPHAS", "1e-6,x")]))
            .unwrap_err();

        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("KERNEL_DP_N"));
                assert!(errors[1].contains("KERNEL_DP_ALPHAS"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_collects_every_problem() {
        let config = PricingConfig {
            d: 0,
            payoff: "digital".to_string(),
            repeats: 0,
            lengthscales: Vec::new(),
            ..PricingConfig::default()
        };

        match config.validate().unwrap_err() {
            ConfigError::Validation(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors.iter().any(|e| e.contains("digital")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_training_size_must_allow_validation_split() {
        for n in [2, 3] {
            let config = PricingConfig {
                n_train: n,
                ..PricingConfig::default()
            };
            match config.validate().unwrap_err() {
                ConfigError::Validation(errors) => {
                    assert_eq!(errors.len(), 1);
                    assert!(errors[0].contains(&format!("n = {n}")));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        let config = PricingConfig {
            n_train: 4,
            ..PricingConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.engine_config().unwrap().n_train(), 4);
    }

    #[test]
    fn test_strike_validation_matches_payoff() {
        let mut config = PricingConfig::default();
        config.market.strike = 0.0;
        assert!(config.validate().is_ok());
        assert_eq!(config.basket_payoff().unwrap().strike(), 0.0);

        config.market.strike = -1.0;
        match config.validate().unwrap_err() {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec!["Invalid strike: K = -1".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(config.basket_payoff().is_err());
    }

    #[test]
    fn test_builds_engine_inputs() {
        let config = PricingConfig {
            d: 3,
            payoff: "max-of-basket-call".to_string(),
            ..PricingConfig::default()
        };

        let market = config.market_model().unwrap();
        assert_eq!(market.dim(), 3);
        assert_eq!(market.n_exercise(), 9);

        let payoff = config.basket_payoff().unwrap();
        assert_eq!(payoff.kind(), PayoffKind::MaxCall);
        assert_eq!(payoff.strike(), 100.0);

        let engine = config.engine_config().unwrap();
        assert_eq!(engine.n_train(), 500);
        assert_eq!(engine.grid().len(), 4);
    }

    #[test]
    fn test_invalid_correlation_is_rejected() {
        let mut config = PricingConfig::default();
        config.d = 3;
        config.market.rho = -0.6;
        assert!(config.market_model().is_err());
    }
}
