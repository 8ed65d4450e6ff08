//! Summary composition over a draw history.
//!
//! Each `*_summary` function bundles the results of one analysis area.
//! [`analyze`] runs all of them with a single [`AnalysisConfig`] and
//! [`render_report`] turns the outcome into a plain-text report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::dependency::{carry_over_analysis, number_autocorrelation, CarryOverResult, NumberAutocorrelation};
use crate::distribution::{
    gap_distribution_analysis, sum_distribution_analysis, DistributionComparisonResult,
    ReferenceSample,
};
use crate::draws::{bit_sequence, BitEncoding, Draw};
use crate::error::{AnalysisError, Result};
use crate::frequency::{chi_square_uniformity_test, gap_histogram, number_frequencies, ChiSquareResult};
use crate::nist_tests::{randomness_suite, RandomnessSuiteReport};
use crate::patterns::{
    last_digit_analysis, low_high_pattern_analysis, parity_pattern_analysis,
    PatternChiSquareResult,
};
use crate::runs::{runs_test_even_odd, runs_test_on_sums, RunsTestResult, SumRunsTestResult};
use crate::MIN_RANDOMNESS_BITS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawSummary {
    pub total_draws: usize,
    pub chi_square: ChiSquareResult,
    pub runs_test: RunsTestResult,
    pub gap_histogram: BTreeMap<u32, u64>,
    pub frequency: BTreeMap<u8, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencySummary {
    pub autocorrelation: Vec<NumberAutocorrelation>,
    pub carry_over: CarryOverResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSummary {
    pub parity: PatternChiSquareResult,
    pub low_high: PatternChiSquareResult,
    pub last_digit: PatternChiSquareResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub sample_size: usize,
    pub sum: DistributionComparisonResult,
    pub gap: DistributionComparisonResult,
}

/// Every analysis area for one history and configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub config: AnalysisConfig,
    pub summary: DrawSummary,
    pub sum_runs: SumRunsTestResult,
    pub dependency: DependencySummary,
    pub patterns: PatternSummary,
    pub distribution: DistributionSummary,
    /// `None` when the encoded history is too short for the battery.
    pub randomness: Option<RandomnessSuiteReport>,
}

/// Frequencies, uniformity, parity runs and gaps in one record.
pub fn summarize_draws(draws: &[Draw]) -> Result<DrawSummary> {
    if draws.is_empty() {
        return Err(AnalysisError::NoData("draw summary"));
    }

    let summary = DrawSummary {
        total_draws: draws.len(),
        chi_square: chi_square_uniformity_test(draws)?,
        runs_test: runs_test_even_odd(draws)?,
        gap_histogram: gap_histogram(draws),
        frequency: number_frequencies(draws),
    };
    debug!("Draw summary built for {} draws", summary.total_draws);
    Ok(summary)
}

pub fn dependency_summary(draws: &[Draw], max_lag: usize) -> Result<DependencySummary> {
    Ok(DependencySummary {
        autocorrelation: number_autocorrelation(draws, max_lag)?,
        carry_over: carry_over_analysis(draws)?,
    })
}

pub fn pattern_analysis_summary(draws: &[Draw]) -> Result<PatternSummary> {
    Ok(PatternSummary {
        parity: parity_pattern_analysis(draws)?,
        low_high: low_high_pattern_analysis(draws)?,
        last_digit: last_digit_analysis(draws)?,
    })
}

/// Sum and gap comparisons against one shared simulated reference.
pub fn distribution_summary(
    draws: &[Draw],
    sample_size: usize,
    seed: Option<u64>,
) -> Result<DistributionSummary> {
    if draws.is_empty() {
        return Err(AnalysisError::NoData("distribution summary"));
    }
    let reference = ReferenceSample::simulate(sample_size, seed);
    Ok(DistributionSummary {
        sample_size,
        sum: sum_distribution_analysis(draws, &reference.sums)?,
        gap: gap_distribution_analysis(draws, &reference.gaps)?,
    })
}

pub fn randomness_suite_summary(
    draws: &[Draw],
    encoding: BitEncoding,
    block_size: usize,
    serial_block: usize,
) -> Result<RandomnessSuiteReport> {
    if draws.is_empty() {
        return Err(AnalysisError::NoData("randomness suite"));
    }
    randomness_suite(draws, encoding, block_size, serial_block)
}

/// Run every analysis area with `config`.
///
/// When the encoded history has fewer than 100 bits the randomness battery
/// is left out (`randomness` is `None`). Any other failure is returned,
/// including a stream shorter than the configured block size.
pub fn analyze(draws: &[Draw], config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;
    info!(
        "Analyzing {} draws (encoding={}, max_lag={}, sample_size={})",
        draws.len(),
        config.encoding,
        config.max_lag,
        config.sample_size
    );

    let summary = summarize_draws(draws)?;
    let sum_runs = runs_test_on_sums(draws)?;
    let dependency = dependency_summary(draws, config.max_lag)?;
    let patterns = pattern_analysis_summary(draws)?;
    let distribution = distribution_summary(draws, config.sample_size, config.seed)?;
    let available_bits = bit_sequence(draws, config.encoding).len();
    let randomness = if available_bits < MIN_RANDOMNESS_BITS {
        warn!(
            "Randomness suite skipped: {} encoding gives {} bits, needs {}",
            config.encoding, available_bits, MIN_RANDOMNESS_BITS
        );
        None
    } else {
        Some(randomness_suite_summary(
            draws,
            config.encoding,
            config.block_size,
            config.serial_block,
        )?)
    };

    info!("Analysis complete for {} draws", draws.len());
    Ok(AnalysisReport {
        config: config.clone(),
        summary,
        sum_runs,
        dependency,
        patterns,
        distribution,
        randomness,
    })
}

/// Deterministic snapshot key: `base|k1=v1,k2=v2` with keys sorted by name.
pub fn analysis_key(base: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return base.to_string();
    }
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let suffix: Vec<String> = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    format!("{}|{}", base, suffix.join(","))
}

fn push_line(report: &mut String, label: &str, statistic: f64, p_value: f64) {
    report.push_str(&format!(
        "{:30} stat={:.4} p={:.6}\n",
        label, statistic, p_value
    ));
}

/// Human-readable rendering of an [`AnalysisReport`].
pub fn render_report(report: &AnalysisReport) -> String {
    let summary = &report.summary;
    let mut text = format!(
        "Lotto Draw Analysis\n\
         ===================\n\
         Draws analyzed: {}\n\
         Reference sample: {} simulated draws\n\n\
         Frequency and Runs:\n\
         -------------------\n",
        summary.total_draws, report.distribution.sample_size
    );

    push_line(
        &mut text,
        "Number uniformity",
        summary.chi_square.statistic,
        summary.chi_square.p_value,
    );
    push_line(
        &mut text,
        "Parity runs",
        summary.runs_test.z_score,
        summary.runs_test.p_value,
    );
    push_line(
        &mut text,
        "Sum runs (median split)",
        report.sum_runs.runs.z_score,
        report.sum_runs.runs.p_value,
    );

    let (hottest, coldest) = (
        summary.frequency.iter().max_by_key(|&(_, count)| *count),
        summary.frequency.iter().min_by_key(|&(_, count)| *count),
    );
    if let (Some((hot, hot_count)), Some((cold, cold_count))) = (hottest, coldest) {
        text.push_str(&format!(
            "  Most drawn: {} ({}x), least drawn: {} ({}x)\n",
            hot, hot_count, cold, cold_count
        ));
    }

    text.push_str("\nDependency:\n-----------\n");
    let carry = &report.dependency.carry_over;
    push_line(&mut text, "Carry-over", carry.chi_square_statistic, carry.p_value);
    text.push_str(&format!(
        "  P(hit | drawn before)={:.4}, P(hit | not drawn)={:.4}\n",
        carry.previous_hit_probability, carry.previous_miss_probability
    ));
    text.push_str("  Ljung-Box by number:\n");
    for entry in &report.dependency.autocorrelation {
        let label = format!("    {:2}", entry.number);
        match (entry.ljung_box_q, entry.p_value) {
            (Some(q), Some(p)) => push_line(&mut text, &label, q, p),
            _ => text.push_str(&format!("{:30} no usable lag\n", label)),
        }
    }

    text.push_str("\nPatterns:\n---------\n");
    let patterns = &report.patterns;
    push_line(&mut text, "Odd:even split", patterns.parity.statistic, patterns.parity.p_value);
    push_line(&mut text, "Low:high split", patterns.low_high.statistic, patterns.low_high.p_value);
    push_line(&mut text, "Last digit", patterns.last_digit.statistic, patterns.last_digit.p_value);

    text.push_str("\nDistributions:\n--------------\n");
    for (label, result) in [("Sum", &report.distribution.sum), ("Gap", &report.distribution.gap)] {
        push_line(
            &mut text,
            &format!("{} chi-square", label),
            result.chi_square_statistic,
            result.chi_square_p_value,
        );
        push_line(
            &mut text,
            &format!("{} Kolmogorov-Smirnov", label),
            result.ks_statistic,
            result.ks_p_value,
        );
    }

    match &report.randomness {
        Some(suite) => {
            let passed = suite.tests.iter().filter(|t| t.passed).count();
            text.push_str(&format!(
                "\nRandomness Suite ({} encoding, {} bits):\n\
                 Tests Passed: {}/{}\n\
                 ---------------------------------------\n",
                suite.encoding,
                suite.total_bits,
                passed,
                suite.tests.len()
            ));
            for test in &suite.tests {
                let status = if test.passed { "PASS ✓" } else { "FAIL ✗" };
                let p_val_str = test
                    .p_value
                    .map(|p| format!("p={:.4}", p))
                    .unwrap_or_else(|| "pre-test failed".to_string());
                text.push_str(&format!("{:30} {} ({})\n", test.name, status, p_val_str));
            }
        }
        None => {
            text.push_str("\nRandomness Suite:\n-----------------\n");
            text.push_str("  Skipped: not enough bits for the selected encoding\n");
        }
    }
    text
}
