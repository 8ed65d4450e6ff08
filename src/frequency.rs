use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, info, warn};

use crate::draws::{flatten_numbers, Draw};
use crate::error::{AnalysisError, Result};
use crate::stats::chi_square_goodness_of_fit;
use crate::{BALLS_PER_DRAW, TOTAL_BALLS};

/// Chi-square goodness-of-fit of per-number counts against a flat expectation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    /// Observed count for numbers 1..=45, in order.
    pub observed: Vec<u64>,
    pub expected: Vec<f64>,
}

/// Count how many times each number 1..=45 appears.
///
/// Numbers that never appeared are still present with a count of zero.
pub fn number_frequencies(draws: &[Draw]) -> BTreeMap<u8, u64> {
    let mut counts: BTreeMap<u8, u64> = (1..=TOTAL_BALLS as u8).map(|n| (n, 0)).collect();
    for number in flatten_numbers(draws) {
        *counts.entry(number).or_insert(0) += 1;
    }
    counts
}

/// Test the per-number counts against the uniform expectation draws*6/45.
pub fn chi_square_uniformity_test(draws: &[Draw]) -> Result<ChiSquareResult> {
    if draws.is_empty() {
        warn!("Uniformity test requested without draws");
        return Err(AnalysisError::NoData("chi-square uniformity test"));
    }

    let observed: Vec<u64> = number_frequencies(draws).into_values().collect();
    let expected_count = (draws.len() * BALLS_PER_DRAW) as f64 / TOTAL_BALLS as f64;
    let expected = vec![expected_count; TOTAL_BALLS];

    let observed_f: Vec<f64> = observed.iter().map(|&c| c as f64).collect();
    let (statistic, p_value) = chi_square_goodness_of_fit(&observed_f, &expected);
    debug!(
        "Uniformity chi-square: statistic={:.4}, p_value={:.6}, draws={}",
        statistic,
        p_value,
        draws.len()
    );

    Ok(ChiSquareResult {
        statistic,
        p_value,
        observed,
        expected,
    })
}

/// Histogram of gaps between consecutive sorted numbers within each draw.
pub fn gap_histogram(draws: &[Draw]) -> BTreeMap<u32, u64> {
    let mut histogram = BTreeMap::new();
    for gap in draws.iter().flat_map(|draw| draw.gaps()) {
        *histogram.entry(gap).or_insert(0) += 1;
    }
    histogram
}
