//! Rendering of pricing results.

use std::fmt::Write as _;

use clap::ValueEnum;
use pricer_core::math::statistics::normal_quantile;
use pricer_models::instruments::PayoffKind;
use pricer_pricing::mc::{HindsightReport, PricingRun, StepDiagnostics, Summary};
use serde::Serialize;

use crate::config::PricingConfig;
use crate::error::Result;

/// Output format of the price report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines and a per-date table
    #[default]
    Table,
    /// One JSON document
    Json,
}

/// Everything reported after a pricing run.
#[derive(Debug, Clone, Serialize)]
pub struct PriceReport {
    /// Number of assets
    pub d: usize,
    /// Canonical payoff name
    pub payoff: String,
    /// Exercise dates after the valuation date
    pub n_exercise: usize,
    /// Aggregated time-zero estimates
    pub summary: Summary,
    /// Time-zero estimate of each repetition
    pub estimates: Vec<f64>,
    /// Step diagnostics of each repetition
    pub diagnostics: Vec<Vec<StepDiagnostics>>,
    /// Wall-clock seconds of the backward induction
    pub duration_secs: f64,
    /// Perfect-foresight benchmark
    pub hindsight: HindsightReport,
}

impl PriceReport {
    /// Collects a run and its hindsight benchmark.
    pub fn new<P>(
        config: &PricingConfig,
        kind: PayoffKind,
        run: &PricingRun<P>,
        hindsight: HindsightReport,
    ) -> Self {
        Self {
            d: config.d,
            payoff: kind.as_str().to_string(),
            n_exercise: config.market.n_exercise,
            summary: run.summary,
            estimates: run.estimates.clone(),
            diagnostics: run.diagnostics.clone(),
            duration_secs: run.duration.as_secs_f64(),
            hindsight,
        }
    }

    /// Renders in the requested format.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(self.render_table()),
            OutputFormat::Json => self.render_json(),
        }
    }

    /// Human-readable report.
    pub fn render_table(&self) -> String {
        let z = normal_quantile(0.975);
        let s = &self.summary;
        let h = &self.hindsight;
        let mut out = String::new();

        let _ = writeln!(
            out,
            "American {} on {} assets, T = {}, {} repetition(s)",
            self.payoff, self.d, self.n_exercise, s.n
        );
        let _ = writeln!(out, "Mean estimated price: {:.4}", s.mean);
        let _ = writeln!(out, "Standard error: {:.4}", s.std_error);
        let _ = writeln!(out, "95% CI: [{:.4}, {:.4}]", s.ci_low, s.ci_high);
        let _ = writeln!(out, "Total time: {:.2} s", self.duration_secs);
        let _ = writeln!(
            out,
            "Mean payoff (hindsight upper bound): {:.4} ± {:.4}",
            h.payoff_mean,
            z * h.payoff_std_error
        );
        let _ = writeln!(
            out,
            "Mean exercise time: {:.2} ± {:.2}",
            h.stopping_mean,
            z * h.stopping_std_error
        );

        if let Some(steps) = self.diagnostics.last() {
            out.push('\n');
            out.push_str("┌──────┬─────────────┬─────────────┬──────────────┬─────────────┬──────────┐\n");
            out.push_str("│ t    │ alpha       │ lengthscale │ val. MSE     │ mean target │ exercise │\n");
            out.push_str("├──────┼─────────────┼─────────────┼──────────────┼─────────────┼──────────┤\n");
            for step in steps.iter().rev() {
                let exercise = format!("{:.1}%", 100.0 * step.exercise_fraction);
                let _ = writeln!(
                    out,
                    "│ {:<4} │ {:<11.3e} │ {:<11.2} │ {:<12.4e} │ {:<11.4} │ {:<8} │",
                    step.time,
                    step.alpha,
                    step.lengthscale,
                    step.validation_mse,
                    step.mean_target,
                    exercise
                );
            }
            out.push_str("└──────┴─────────────┴─────────────┴──────────────┴─────────────┴──────────┘\n");
        }
        out
    }

    /// JSON document.
    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> PriceReport {
        PriceReport {
            d: 2,
            payoff: "max-call".to_string(),
            n_exercise: 9,
            summary: Summary::from_estimates(&[13.0, 14.0]).unwrap(),
            estimates: vec![13.0, 14.0],
            diagnostics: vec![vec![StepDiagnostics {
                time: 0,
                alpha: 1e-6,
                gamma: 1.0 / (2.0 * 100.0 * 100.0),
                lengthscale: 100.0,
                validation_mse: 0.5,
                mean_target: 13.5,
                exercise_fraction: 0.25,
            }]],
            duration_secs: 1.5,
            hindsight: HindsightReport {
                payoff_mean: 20.0,
                payoff_std_error: 1.0,
                stopping_mean: 6.0,
                stopping_std_error: 0.1,
                n_paths: 1000,
            },
        }
    }

    #[test]
    fn test_table_lists_summary_and_hindsight() {
        let table = report().render_table();
        assert!(table.contains("Mean estimated price: 13.5000"));
        assert!(table.contains("Standard error: 0.5000"));
        assert!(table.contains("95% CI: ["));
        assert!(table.contains("Total time: 1.50 s"));
        assert!(table.contains("Mean payoff (hindsight upper bound): 20.0000 ± 1.9600"));
        assert!(table.contains("Mean exercise time: 6.00 ± 0.20"));
        assert!(table.contains("│ 25.0%    │"));
    }

    #[test]
    fn test_table_rows_align_with_header() {
        let table = report().render_table();
        let width = |line: &str| line.chars().count();
        let header = table.lines().find(|l| l.starts_with("│ t")).unwrap();
        let row = table.lines().find(|l| l.starts_with("│ 0")).unwrap();
        assert_eq!(width(row), width(header));
    }

    #[test]
    fn test_json_document_fields() {
        let json = report().render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["d"], 2);
        assert_eq!(value["payoff"], "max-call");
        assert_eq!(value["summary"]["mean"], 13.5);
        assert_eq!(value["estimates"].as_array().unwrap().len(), 2);
        assert_eq!(value["diagnostics"][0][0]["lengthscale"], 100.0);
        assert_eq!(value["hindsight"]["n_paths"], 1000);
    }
}
