use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lottovalidator::draws::{load_draws, BitEncoding};
use lottovalidator::{analyze, render_report, AnalysisConfig, AnalysisError};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Audit a 6-of-45 lottery draw history for departures from uniform randomness.
#[derive(Parser, Debug)]
#[command(name = "lotto-audit", version, about)]
struct Cli {
    /// JSON file with the draw history
    draws: PathBuf,

    /// Print the full report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Largest lag for the per-number autocorrelation
    #[arg(long)]
    max_lag: Option<usize>,

    /// Block length of the block frequency test
    #[arg(long)]
    block_size: Option<usize>,

    /// Pattern length of the serial test (2-4)
    #[arg(long)]
    serial_block: Option<usize>,

    /// Bit encoding for the randomness suite: presence, parity or binary
    #[arg(long)]
    encoding: Option<BitEncoding>,

    /// Number of simulated draws in the reference distribution
    #[arg(long)]
    sample_size: Option<usize>,

    /// Seed for the reference simulation
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    /// `LOTTO_*` environment settings with command-line flags on top.
    fn config(&self) -> Result<AnalysisConfig, AnalysisError> {
        let base = AnalysisConfig::from_env()?;
        let config = AnalysisConfig {
            max_lag: self.max_lag.unwrap_or(base.max_lag),
            block_size: self.block_size.unwrap_or(base.block_size),
            serial_block: self.serial_block.unwrap_or(base.serial_block),
            encoding: self.encoding.unwrap_or(base.encoding),
            sample_size: self.sample_size.unwrap_or(base.sample_size),
            seed: self.seed.or(base.seed),
        };
        config.validate()?;
        Ok(config)
    }
}

fn run(cli: &Cli) -> Result<String, AnalysisError> {
    let config = cli.config()?;

    let draws = load_draws(&cli.draws)?;
    info!("Loaded {} draws from {}", draws.len(), cli.draws.display());

    let report = analyze(&draws, &config)?;
    if cli.json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(render_report(&report))
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lottovalidator=info,lotto_audit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_environment() {
        std::env::set_var("LOTTO_SEED", "9");
        std::env::set_var("LOTTO_MAX_LAG", "3");
        let cli = Cli::parse_from(["lotto-audit", "draws.json", "--max-lag", "7"]);
        let config = cli.config().unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.max_lag, 7);

        let cli = Cli::parse_from(["lotto-audit", "draws.json", "--serial-block", "6"]);
        assert!(cli.config().is_err());

        std::env::remove_var("LOTTO_SEED");
        std::env::remove_var("LOTTO_MAX_LAG");
    }
}
