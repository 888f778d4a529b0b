//! Price command implementation
//!
//! Runs the backward-induction engine, the hindsight benchmark and, when
//! requested, the value surface export.

use std::path::PathBuf;

use pricer_models::regression::Predictor;
use pricer_pricing::mc::{value_surfaces, BackwardInductionEngine, SurfaceGrid, ValueChain};
use tracing::{info, warn};

use crate::config::PricingConfig;
use crate::export::write_panels;
use crate::report::{OutputFormat, PriceReport};
use crate::Result;

/// Run the price command and print the report.
pub fn run(config: &PricingConfig, format: OutputFormat) -> Result<()> {
    let report = price(config)?;
    println!("{}", report.render(format)?);
    Ok(())
}

/// Price the configured option; exports value surfaces when requested.
pub fn price(config: &PricingConfig) -> Result<PriceReport> {
    config.validate()?;

    let market = config.market_model()?;
    let payoff = config.basket_payoff()?;
    let engine_config = config.engine_config()?;

    info!(
        d = config.d,
        payoff = %payoff.kind(),
        repeats = engine_config.repeats(),
        n = engine_config.n_train(),
        inner = engine_config.inner_samples(),
        centres = engine_config.nystrom_centres(),
        grid = engine_config.grid().len(),
        device = ?engine_config.device(),
        "Starting pricing"
    );

    let kind = payoff.kind();
    let engine = BackwardInductionEngine::nystrom(market, payoff, engine_config);
    let run = engine.price()?;
    let hindsight = engine.hindsight();

    if config.plot_panels {
        export_panels(config, &run.chain)?;
    }

    info!("Pricing complete");
    Ok(PriceReport::new(config, kind, &run, hindsight))
}

/// Writes the value surfaces of a two-asset chain.
///
/// Returns `None` without writing when the basket does not have two assets.
pub fn export_panels<P: Predictor>(
    config: &PricingConfig,
    chain: &ValueChain<P>,
) -> Result<Option<PathBuf>> {
    if config.d != 2 {
        warn!(d = config.d, "Value surfaces need d = 2; skipping export");
        return Ok(None);
    }
    let surfaces = value_surfaces(chain, &SurfaceGrid::default());
    write_panels(&config.output_dir, &surfaces).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;
    use crate::export::PANEL_FILE;

    fn small_config(d: usize, dir: PathBuf) -> PricingConfig {
        PricingConfig {
            d,
            repeats: 2,
            n_train: 40,
            inner_samples: 10,
            nystrom_centres: 20,
            hindsight_paths: 50,
            accelerate: false,
            plot_panels: true,
            output_dir: dir,
            market: MarketConfig {
                n_exercise: 3,
                ..MarketConfig::default()
            },
            ..PricingConfig::default()
        }
    }

    #[test]
    fn test_price_reports_every_repetition_and_exports_panels() {
        let dir = tempfile::tempdir().unwrap();
        let report = price(&small_config(2, dir.path().to_path_buf())).unwrap();

        assert_eq!(report.estimates.len(), 2);
        assert_eq!(report.diagnostics.len(), 2);
        assert_eq!(report.diagnostics[0].len(), 3);
        assert_eq!(report.hindsight.n_paths, 50);
        assert!(report.summary.mean.is_finite());

        // Panels at dates 0 and 2 plus maturity, 30 x 30 nodes each
        let mut reader = csv::Reader::from_path(dir.path().join(PANEL_FILE)).unwrap();
        assert_eq!(reader.records().count(), 3 * 900);
    }

    #[test]
    fn test_panels_skipped_unless_two_assets() {
        let dir = tempfile::tempdir().unwrap();
        let report = price(&small_config(3, dir.path().to_path_buf())).unwrap();

        assert_eq!(report.d, 3);
        assert!(!dir.path().join(PANEL_FILE).exists());
    }

    #[test]
    fn test_invalid_config_fails_before_pricing() {
        let dir = tempfile::tempdir().unwrap();
        let config = PricingConfig {
            payoff: "digital".to_string(),
            ..small_config(2, dir.path().to_path_buf())
        };
        assert!(price(&config).is_err());
    }
}
