//! kernel-dp - American basket option pricing by kernel regression Monte Carlo
//!
//! Prices a Bermudan-style max-call or geometric-basket put on `d`
//! correlated assets by backward induction: nested Monte Carlo continuation
//! values at each exercise date are regressed with Nyström kernel ridge
//! regression, and a perfect-foresight benchmark is reported alongside.
//!
//! # Configuration
//!
//! Defaults are overridden, in order, by the TOML file given with
//! `--config`, by `KERNEL_DP_*` environment variables and by command-line
//! flags.
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate wires the pricer crates
//! together behind a single command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod export;
mod report;

pub use error::{CliError, Result};

use config::PricingConfig;
use report::OutputFormat;

/// Kernel regression Monte Carlo pricer for American basket options
#[derive(Parser, Debug)]
#[command(name = "kernel-dp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of assets [default: 2]
    #[arg(long)]
    d: Option<usize>,

    /// Payoff: max-call | geo-put (aliases max-of-basket-call, geometric-basket-put) [default: max-call]
    #[arg(long)]
    payoff: Option<String>,

    /// Independent repetitions [default: 1]
    #[arg(long)]
    repeats: Option<usize>,

    /// Training states per exercise date [default: 500]
    #[arg(long)]
    n: Option<usize>,

    /// Inner samples per continuation estimate [default: 150]
    #[arg(long = "M")]
    inner_samples: Option<usize>,

    /// Nyström centres [default: 250]
    #[arg(long)]
    m_nystrom: Option<usize>,

    /// Kernel lengthscales searched [default: 100 110 120 130]
    #[arg(long, num_args = 1..)]
    lengthscales: Option<Vec<f64>>,

    /// Ridge penalties searched [default: 1e-6]
    #[arg(long, num_args = 1..)]
    alphas: Option<Vec<f64>>,

    /// Write value surfaces to value_function_panel.csv (d = 2 only)
    #[arg(long)]
    plot_panels: bool,

    /// Assemble kernel matrices on a single thread
    #[arg(long)]
    no_cuda: bool,

    /// Root random seed [default: 7]
    #[arg(long)]
    seed: Option<u64>,

    /// Directory receiving exported files [default: .]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Merges file, environment and flags into one configuration.
    fn settings(&self) -> Result<PricingConfig> {
        let base = match &self.config {
            Some(path) => PricingConfig::load(path)?,
            None => PricingConfig::default(),
        };
        let mut config = base.with_env_override()?;

        if let Some(d) = self.d {
            config.d = d;
        }
        if let Some(payoff) = &self.payoff {
            config.payoff = payoff.clone();
        }
        if let Some(repeats) = self.repeats {
            config.repeats = repeats;
        }
        if let Some(n) = self.n {
            config.n_train = n;
        }
        if let Some(m) = self.inner_samples {
            config.inner_samples = m;
        }
        if let Some(m) = self.m_nystrom {
            config.nystrom_centres = m;
        }
        if let Some(lengthscales) = &self.lengthscales {
            config.lengthscales = lengthscales.clone();
        }
        if let Some(alphas) = &self.alphas {
            config.alphas = alphas.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        config.plot_panels |= self.plot_panels;
        if self.no_cuda {
            config.accelerate = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialise tracing; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config = cli.settings().context("invalid configuration")?;
    commands::price::run(&config, cli.format).context("pricing failed")?;
    Ok(())
}
