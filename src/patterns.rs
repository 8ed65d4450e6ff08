//! Categorical pattern tests with exact combinatorial expectations.
//!
//! Each test sorts draws (or drawn numbers) into a handful of categories and
//! compares the tallies with the counts a uniform 6-of-45 draw would produce.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, info, warn};

use crate::draws::Draw;
use crate::error::{AnalysisError, Result};
use crate::stats::{binomial, chi_square_goodness_of_fit};
use crate::{
    BALLS_PER_DRAW, EVEN_BALLS, HIGH_BALLS, LOW_BALLS, ODD_BALLS, TOTAL_BALLS,
    TOTAL_COMBINATIONS,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    pub observed: BTreeMap<String, u64>,
    pub expected: BTreeMap<String, f64>,
}

fn split_key(k: usize) -> String {
    format!("{}:{}", k, BALLS_PER_DRAW - k)
}

/// Probability that a uniform draw takes exactly `k` of its six numbers from
/// a group of `group` balls (the rest coming from `other` balls).
pub fn split_probability(group: u64, other: u64, k: usize) -> f64 {
    let k = k as u64;
    let ways = binomial(group, k) * binomial(other, BALLS_PER_DRAW as u64 - k);
    ways as f64 / TOTAL_COMBINATIONS as f64
}

fn chi_square_from_maps(
    observed: BTreeMap<String, u64>,
    expected: BTreeMap<String, f64>,
) -> PatternChiSquareResult {
    let observed_values: Vec<f64> = expected
        .keys()
        .map(|key| observed.get(key).copied().unwrap_or(0) as f64)
        .collect();
    let expected_values: Vec<f64> = expected.values().copied().collect();
    let (statistic, p_value) = chi_square_goodness_of_fit(&observed_values, &expected_values);

    PatternChiSquareResult {
        statistic,
        p_value,
        observed,
        expected,
    }
}

/// Tally draws by `classify` (which returns k in 0..=6) and test against the
/// split probabilities for a group of `group` vs `other` balls.
fn split_pattern_test(
    draws: &[Draw],
    group: u64,
    other: u64,
    classify: impl Fn(&Draw) -> usize,
) -> PatternChiSquareResult {
    let mut observed: BTreeMap<String, u64> =
        (0..=BALLS_PER_DRAW).map(|k| (split_key(k), 0)).collect();
    for draw in draws {
        *observed.entry(split_key(classify(draw))).or_insert(0) += 1;
    }

    let total = draws.len() as f64;
    let expected: BTreeMap<String, f64> = (0..=BALLS_PER_DRAW)
        .map(|k| (split_key(k), split_probability(group, other, k) * total))
        .collect();

    chi_square_from_maps(observed, expected)
}

/// Odd:even split of each draw, keyed `"odd:even"`.
pub fn parity_pattern_analysis(draws: &[Draw]) -> Result<PatternChiSquareResult> {
    if draws.is_empty() {
        return Err(AnalysisError::NoData("parity analysis"));
    }
    let result = split_pattern_test(draws, ODD_BALLS, EVEN_BALLS, |draw| {
        draw.numbers().iter().filter(|&&n| n % 2 == 1).count()
    });
    debug!(
        "Parity pattern: statistic={:.4}, p_value={:.6}",
        result.statistic, result.p_value
    );
    Ok(result)
}

/// Low (1..=22) : high (23..=45) split of each draw, keyed `"low:high"`.
pub fn low_high_pattern_analysis(draws: &[Draw]) -> Result<PatternChiSquareResult> {
    if draws.is_empty() {
        return Err(AnalysisError::NoData("low/high analysis"));
    }
    let result = split_pattern_test(draws, LOW_BALLS, HIGH_BALLS, |draw| {
        draw.numbers()
            .iter()
            .filter(|&&n| n as u64 <= LOW_BALLS)
            .count()
    });
    debug!(
        "Low/high pattern: statistic={:.4}, p_value={:.6}",
        result.statistic, result.p_value
    );
    Ok(result)
}

/// How many of 1..=45 end in each digit 0..=9.
pub fn digit_counts() -> [u64; 10] {
    let mut counts = [0u64; 10];
    for number in 1..=TOTAL_BALLS {
        counts[number % 10] += 1;
    }
    counts
}

/// Distribution of last digits over every drawn number.
pub fn last_digit_analysis(draws: &[Draw]) -> Result<PatternChiSquareResult> {
    if draws.is_empty() {
        return Err(AnalysisError::NoData("last digit analysis"));
    }

    let mut observed: BTreeMap<String, u64> = (0..10).map(|d| (d.to_string(), 0)).collect();
    for draw in draws {
        for &number in draw.numbers() {
            *observed.entry((number % 10).to_string()).or_insert(0) += 1;
        }
    }

    let total_numbers = (draws.len() * BALLS_PER_DRAW) as f64;
    let expected: BTreeMap<String, f64> = digit_counts()
        .iter()
        .enumerate()
        .map(|(digit, &count)| {
            (
                digit.to_string(),
                count as f64 / TOTAL_BALLS as f64 * total_numbers,
            )
        })
        .collect();

    let result = chi_square_from_maps(observed, expected);
    debug!(
        "Last digit pattern: statistic={:.4}, p_value={:.6}",
        result.statistic, result.p_value
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_probabilities_sum_to_one() {
        let parity: f64 = (0..=6).map(|k| split_probability(ODD_BALLS, EVEN_BALLS, k)).sum();
        let low_high: f64 = (0..=6).map(|k| split_probability(LOW_BALLS, HIGH_BALLS, k)).sum();
        assert!((parity - 1.0).abs() < 1e-12);
        assert!((low_high - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_digit_counts() {
        // 1..=45: digits 1-5 appear five times, 0 and 6-9 four times
        assert_eq!(digit_counts(), [4, 5, 5, 5, 5, 5, 4, 4, 4, 4]);
        assert_eq!(digit_counts().iter().sum::<u64>(), 45);
    }

    #[test]
    fn test_empty_history() {
        assert!(matches!(parity_pattern_analysis(&[]), Err(AnalysisError::NoData(_))));
        assert!(matches!(low_high_pattern_analysis(&[]), Err(AnalysisError::NoData(_))));
        assert!(matches!(last_digit_analysis(&[]), Err(AnalysisError::NoData(_))));
    }
}
