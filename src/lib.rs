//! Statistical audit of lottery draw histories.
//!
//! Given an ordered history of 6-of-45 draws, the modules here test whether
//! the record is consistent with an unbiased, independent, uniform process:
//! frequency and gap statistics, runs tests, serial dependency, categorical
//! pattern tests, Monte Carlo distribution comparison and a NIST-style bit
//! stream battery. Every operation is a pure function of the supplied history.

pub mod config;
pub mod dependency;
pub mod distribution;
pub mod draws;
pub mod error;
pub mod frequency;
pub mod patterns;
pub mod report;
pub mod runs;
pub mod stats;

pub use config::AnalysisConfig;
pub use draws::{BitEncoding, Draw};
pub use error::{AnalysisError, Result};
pub use report::{analyze, render_report, summarize_draws, AnalysisReport, DrawSummary};

pub const TOTAL_BALLS: usize = 45;
pub const BALLS_PER_DRAW: usize = 6;
pub const ODD_BALLS: u64 = 23;
pub const EVEN_BALLS: u64 = 22;
/// Numbers 1..=22 count as low, 23..=45 as high.
pub const LOW_BALLS: u64 = 22;
pub const HIGH_BALLS: u64 = 23;
pub const TOTAL_COMBINATIONS: u64 = stats::binomial(TOTAL_BALLS as u64, BALLS_PER_DRAW as u64);

/// Significance level behind the `passed` flag of the bit stream battery.
pub const RANDOMNESS_ALPHA: f64 = 0.01;
pub const MIN_RANDOMNESS_BITS: usize = 100;

pub const DEFAULT_MAX_LAG: usize = 5;
pub const DEFAULT_BLOCK_SIZE: usize = 128;
pub const DEFAULT_SERIAL_BLOCK: usize = 2;
pub const DEFAULT_SAMPLE_SIZE: usize = 100_000;
