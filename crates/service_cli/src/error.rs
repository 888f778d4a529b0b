//! Error types for the kernel-dp CLI.

use pricer_models::instruments::PayoffError;
use pricer_models::models::MarketError;
use pricer_pricing::mc::{ConfigError as EngineConfigError, PricingError};
use thiserror::Error;

use crate::config::ConfigError;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file, environment or validation error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Engine configuration rejected
    #[error("Engine configuration error: {0}")]
    Engine(#[from] EngineConfigError),

    /// Market parameters rejected
    #[error("Market error: {0}")]
    Market(#[from] MarketError),

    /// Payoff rejected
    #[error("Payoff error: {0}")]
    Payoff(#[from] PayoffError),

    /// Pricing run failed
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON rendering error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_layer_errors() {
        let err: CliError = PayoffError::UnknownKind {
            name: "digital".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("Payoff error"));

        let err: CliError = ConfigError::Validation(vec!["a".into(), "b".into()]).into();
        assert_eq!(err.to_string(), "Configuration error: Validation errors: a; b");
    }
}
