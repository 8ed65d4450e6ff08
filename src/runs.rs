//! Wald–Wolfowitz runs tests on binary sequences derived from the history.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, info, warn};

use crate::draws::{parity_sequence, Draw};
use crate::error::{AnalysisError, Result};
use crate::stats::{median, normal_cdf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunsTestResult {
    pub runs: usize,
    pub expected_runs: f64,
    pub z_score: f64,
    pub p_value: f64,
    pub total_observations: usize,
}

/// Runs test on per-draw sums split at their median.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SumRunsTestResult {
    #[serde(flatten)]
    pub runs: RunsTestResult,
    pub median_threshold: f64,
}

/// Two-sided runs test on a 0/1 sequence under the normal approximation.
pub fn runs_test(sequence: &[u8], test: &'static str) -> Result<RunsTestResult> {
    if sequence.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            test,
            needed: 2,
            got: sequence.len(),
        });
    }

    let runs = 1 + sequence.windows(2).filter(|pair| pair[0] != pair[1]).count();
    let n1 = sequence.iter().filter(|&&bit| bit == 1).count() as f64;
    let n0 = sequence.len() as f64 - n1;
    if n0 == 0.0 || n1 == 0.0 {
        return Err(AnalysisError::DegenerateSequence(test));
    }

    let total = n0 + n1;
    let expected_runs = 2.0 * n0 * n1 / total + 1.0;
    let variance =
        2.0 * n0 * n1 * (2.0 * n0 * n1 - n0 - n1) / (total * total * (total - 1.0));
    let z_score = (runs as f64 - expected_runs) / variance.sqrt();
    let p_value = 2.0 * (1.0 - normal_cdf(z_score.abs()));

    debug!(
        "{}: runs={}, expected={:.3}, z={:.4}, p={:.6}",
        test, runs, expected_runs, z_score, p_value
    );

    Ok(RunsTestResult {
        runs,
        expected_runs,
        z_score,
        p_value,
        total_observations: sequence.len(),
    })
}

/// Runs test on the odd/even sequence of every drawn number.
pub fn runs_test_even_odd(draws: &[Draw]) -> Result<RunsTestResult> {
    runs_test(&parity_sequence(draws), "parity runs test")
}

/// Runs test on draw sums, coded 1 when a sum is at or above the median.
pub fn runs_test_on_sums(draws: &[Draw]) -> Result<SumRunsTestResult> {
    let sums: Vec<u32> = draws.iter().map(Draw::sum).collect();
    if sums.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            test: "sum runs test",
            needed: 2,
            got: sums.len(),
        });
    }

    let median_threshold = median(&sums);
    let sequence: Vec<u8> = sums
        .iter()
        .map(|&sum| (sum as f64 >= median_threshold) as u8)
        .collect();

    let runs = runs_test(&sequence, "sum runs test")?;
    Ok(SumRunsTestResult {
        runs,
        median_threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_sequence() {
        let result = runs_test(&[1, 0, 1, 0, 1, 0, 1, 0], "test").unwrap();
        assert_eq!(result.runs, 8);
        assert!((result.expected_runs - 5.0).abs() < 1e-12);
        // variance = 2*16*(32-8) / (64*7) = 768/448
        let z = 3.0 / (768.0f64 / 448.0).sqrt();
        assert!((result.z_score - z).abs() < 1e-12);
        assert!(result.p_value > 0.0 && result.p_value < 0.05);
    }

    #[test]
    fn test_constant_sequence_is_degenerate() {
        assert!(matches!(
            runs_test(&[1, 1, 1, 1], "test"),
            Err(AnalysisError::DegenerateSequence(_))
        ));
    }

    #[test]
    fn test_single_observation() {
        assert!(matches!(
            runs_test(&[1], "test"),
            Err(AnalysisError::InsufficientData { needed: 2, got: 1, .. })
        ));
    }
}
