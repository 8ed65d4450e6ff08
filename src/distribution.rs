//! Comparison of observed sum and gap distributions with a simulated reference.
//!
//! The reference is a Monte Carlo sample of uniform 6-of-45 draws. It is built
//! once by [`ReferenceSample::simulate`] and handed to the comparisons
//! explicitly, so callers decide whether to reuse or reseed it.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, info, warn};

use crate::draws::Draw;
use crate::error::{AnalysisError, Result};
use crate::stats::{chi_square_goodness_of_fit, ks_two_sample};
use crate::{BALLS_PER_DRAW, TOTAL_BALLS};

/// Floor applied to scaled expected bins before the chi-square test.
pub const EXPECTED_EPSILON: f64 = 1e-9;

/// Raw simulated values of one statistic and their histogram.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceDistribution {
    pub samples: Vec<u32>,
    pub histogram: BTreeMap<u32, u64>,
}

impl ReferenceDistribution {
    fn record(&mut self, value: u32) {
        self.samples.push(value);
        *self.histogram.entry(value).or_insert(0) += 1;
    }
}

/// Simulated draw sums and intra-draw gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceSample {
    pub sums: ReferenceDistribution,
    pub gaps: ReferenceDistribution,
}

impl ReferenceSample {
    /// Simulate `sample_size` uniform draws.
    ///
    /// With a seed the sample is reproducible; without one the generator is
    /// seeded from the operating system.
    pub fn simulate(sample_size: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut reference = ReferenceSample::default();
        reference.sums.samples.reserve(sample_size);
        reference.gaps.samples.reserve(sample_size * (BALLS_PER_DRAW - 1));

        for _ in 0..sample_size {
            let mut numbers = [0u32; BALLS_PER_DRAW];
            let picks = rand::seq::index::sample(&mut rng, TOTAL_BALLS, BALLS_PER_DRAW);
            for (slot, index) in numbers.iter_mut().zip(picks.into_iter()) {
                *slot = index as u32 + 1;
            }
            numbers.sort_unstable();

            reference.sums.record(numbers.iter().sum());
            for pair in numbers.windows(2) {
                reference.gaps.record(pair[1] - pair[0]);
            }
        }

        debug!(
            "Simulated {} reference draws (seed={:?})",
            sample_size, seed
        );
        reference
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionComparisonResult {
    pub chi_square_statistic: f64,
    pub chi_square_p_value: f64,
    pub ks_statistic: f64,
    pub ks_p_value: f64,
    pub observed_histogram: BTreeMap<u32, u64>,
    pub expected_histogram: BTreeMap<u32, f64>,
}

/// Rescale a simulated histogram so its total matches `observed_total`.
pub fn scale_histogram(
    reference: &ReferenceDistribution,
    observed_total: usize,
) -> Result<BTreeMap<u32, f64>> {
    let simulated_total = reference.samples.len();
    if simulated_total == 0 {
        return Err(AnalysisError::EmptyReference);
    }
    Ok(reference
        .histogram
        .iter()
        .map(|(&key, &count)| {
            let share = count as f64 / simulated_total as f64;
            (key, share * observed_total as f64)
        })
        .collect())
}

fn compare_with_reference(
    observed: &[u32],
    reference: &ReferenceDistribution,
) -> Result<DistributionComparisonResult> {
    let expected_scaled = scale_histogram(reference, observed.len())?;

    let mut observed_counts: BTreeMap<u32, u64> = BTreeMap::new();
    for &value in observed {
        *observed_counts.entry(value).or_insert(0) += 1;
    }

    let mut observed_histogram = BTreeMap::new();
    let mut expected_histogram = BTreeMap::new();
    for &key in observed_counts.keys().chain(expected_scaled.keys()) {
        observed_histogram.insert(key, observed_counts.get(&key).copied().unwrap_or(0));
        let expected = expected_scaled.get(&key).copied().unwrap_or(0.0);
        expected_histogram.insert(key, expected.max(EXPECTED_EPSILON));
    }

    let observed_values: Vec<f64> = observed_histogram.values().map(|&c| c as f64).collect();
    let expected_values: Vec<f64> = expected_histogram.values().copied().collect();
    let (chi_square_statistic, chi_square_p_value) =
        chi_square_goodness_of_fit(&observed_values, &expected_values);
    let (ks_statistic, ks_p_value) = ks_two_sample(observed, &reference.samples);

    Ok(DistributionComparisonResult {
        chi_square_statistic,
        chi_square_p_value,
        ks_statistic,
        ks_p_value,
        observed_histogram,
        expected_histogram,
    })
}

/// Compare observed draw sums with the simulated sum distribution.
pub fn sum_distribution_analysis(
    draws: &[Draw],
    reference: &ReferenceDistribution,
) -> Result<DistributionComparisonResult> {
    if draws.is_empty() {
        return Err(AnalysisError::NoData("sum distribution analysis"));
    }
    let sums: Vec<u32> = draws.iter().map(Draw::sum).collect();
    let result = compare_with_reference(&sums, reference)?;
    debug!(
        "Sum distribution: chi2={:.4} (p={:.6}), ks={:.4} (p={:.6})",
        result.chi_square_statistic,
        result.chi_square_p_value,
        result.ks_statistic,
        result.ks_p_value
    );
    Ok(result)
}

/// Compare observed intra-draw gaps with the simulated gap distribution.
pub fn gap_distribution_analysis(
    draws: &[Draw],
    reference: &ReferenceDistribution,
) -> Result<DistributionComparisonResult> {
    if draws.is_empty() {
        return Err(AnalysisError::NoData("gap distribution analysis"));
    }
    let gaps: Vec<u32> = draws.iter().flat_map(|draw| draw.gaps()).collect();
    let result = compare_with_reference(&gaps, reference)?;
    debug!(
        "Gap distribution: chi2={:.4} (p={:.6}), ks={:.4} (p={:.6})",
        result.chi_square_statistic,
        result.chi_square_p_value,
        result.ks_statistic,
        result.ks_p_value
    );
    Ok(result)
}
