//! Serial dependency between draws.
//!
//! Two views: per-number autocorrelation of the appearance indicator with a
//! Ljung–Box portmanteau test, and an aggregate carry-over table that asks
//! whether numbers from one draw show up in the next more often than chance.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, info, warn};

use crate::draws::Draw;
use crate::error::{AnalysisError, Result};
use crate::stats::{chi_square_independence_2x2, chi_square_sf};
use crate::TOTAL_BALLS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocorrelationLag {
    pub lag: usize,
    pub coefficient: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberAutocorrelation {
    pub number: u8,
    pub lags: Vec<AutocorrelationLag>,
    pub ljung_box_q: Option<f64>,
    pub p_value: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryOverResult {
    /// Share of previously drawn numbers that were drawn again.
    pub previous_hit_probability: f64,
    /// Share of previously absent numbers that were drawn.
    pub previous_miss_probability: f64,
    pub chi_square_statistic: f64,
    pub p_value: f64,
    /// Rows: previously present, previously absent. Columns: now present, now absent.
    pub contingency_table: [[u64; 2]; 2],
}

fn indicator_series(draws: &[Draw], number: u8) -> Vec<u8> {
    draws.iter().map(|draw| draw.contains(number) as u8).collect()
}

/// Sample autocorrelation at `lag`.
///
/// `None` unless `0 < lag < len`. A series with no variance yields 0.
pub fn autocorrelation(series: &[u8], lag: usize) -> Option<f64> {
    let n = series.len();
    if lag == 0 || lag >= n {
        return None;
    }

    let mean = series.iter().map(|&x| x as f64).sum::<f64>() / n as f64;
    let numerator: f64 = series
        .iter()
        .zip(&series[lag..])
        .map(|(&a, &b)| (a as f64 - mean) * (b as f64 - mean))
        .sum();
    let denominator: f64 = series
        .iter()
        .map(|&x| (x as f64 - mean) * (x as f64 - mean))
        .sum();

    if denominator == 0.0 {
        return Some(0.0);
    }
    Some(numerator / denominator)
}

/// Ljung–Box Q over the supplied lags; `(None, None)` when no lag is usable.
pub fn ljung_box(series_length: usize, lags: &[AutocorrelationLag]) -> (Option<f64>, Option<f64>) {
    let valid: Vec<&AutocorrelationLag> = lags
        .iter()
        .filter(|entry| series_length > entry.lag)
        .collect();
    if valid.is_empty() {
        return (None, None);
    }

    let n = series_length as f64;
    let weighted: f64 = valid
        .iter()
        .map(|entry| entry.coefficient * entry.coefficient / (n - entry.lag as f64))
        .sum();
    let q = n * (n + 2.0) * weighted;
    (Some(q), Some(chi_square_sf(q, valid.len() as f64)))
}

/// Autocorrelation at lags 1..=max_lag for each number's appearance series.
pub fn number_autocorrelation(draws: &[Draw], max_lag: usize) -> Result<Vec<NumberAutocorrelation>> {
    if draws.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            test: "autocorrelation",
            needed: 2,
            got: draws.len(),
        });
    }

    let results: Vec<NumberAutocorrelation> = (1..=TOTAL_BALLS as u8)
        .map(|number| {
            let series = indicator_series(draws, number);
            let lags: Vec<AutocorrelationLag> = (1..=max_lag)
                .filter_map(|lag| {
                    autocorrelation(&series, lag).map(|coefficient| AutocorrelationLag {
                        lag,
                        coefficient,
                        sample_size: series.len() - lag,
                    })
                })
                .collect();
            let (ljung_box_q, p_value) = ljung_box(series.len(), &lags);
            NumberAutocorrelation {
                number,
                lags,
                ljung_box_q,
                p_value,
            }
        })
        .collect();

    debug!(
        "Autocorrelation computed for {} numbers over {} draws, max_lag={}",
        results.len(),
        draws.len(),
        max_lag
    );
    Ok(results)
}

/// Aggregate previous-draw dependency over every number and consecutive pair.
pub fn carry_over_analysis(draws: &[Draw]) -> Result<CarryOverResult> {
    if draws.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            test: "carry-over analysis",
            needed: 2,
            got: draws.len(),
        });
    }

    let mut table = [[0u64; 2]; 2];
    for pair in draws.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        for number in 1..=TOTAL_BALLS as u8 {
            let row = if prev.contains(number) { 0 } else { 1 };
            let col = if curr.contains(number) { 0 } else { 1 };
            table[row][col] += 1;
        }
    }

    let rate = |hits: u64, total: u64| {
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    };
    let previous_hit_probability = rate(table[0][0], table[0][0] + table[0][1]);
    let previous_miss_probability = rate(table[1][0], table[1][0] + table[1][1]);
    let (chi_square_statistic, p_value) = chi_square_independence_2x2(&table);

    debug!(
        "Carry-over: hit={:.4}, miss={:.4}, chi2={:.4}, p={:.6}",
        previous_hit_probability, previous_miss_probability, chi_square_statistic, p_value
    );

    Ok(CarryOverResult {
        previous_hit_probability,
        previous_miss_probability,
        chi_square_statistic,
        p_value,
        contingency_table: table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autocorrelation_bounds() {
        let series = [1, 0, 1, 0];
        assert!(autocorrelation(&series, 0).is_none());
        assert!(autocorrelation(&series, 4).is_none());
        // mean 0.5, numerator at lag 1 = -0.75, denominator 1.0
        assert!((autocorrelation(&series, 1).unwrap() + 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series_has_zero_coefficient() {
        assert_eq!(autocorrelation(&[1, 1, 1, 1], 2), Some(0.0));
    }

    #[test]
    fn test_ljung_box_without_lags() {
        assert_eq!(ljung_box(3, &[]), (None, None));
    }

    #[test]
    fn test_ljung_box_single_lag() {
        let lags = [AutocorrelationLag {
            lag: 1,
            coefficient: 0.5,
            sample_size: 9,
        }];
        let (q, p) = ljung_box(10, &lags);
        // 10 * 12 * 0.25 / 9
        assert!((q.unwrap() - 120.0 * 0.25 / 9.0).abs() < 1e-12);
        let p = p.unwrap();
        assert!(p > 0.0 && p < 1.0);
    }
}
