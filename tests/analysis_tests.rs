// Integration tests for the analysis areas and the full report
use chrono::{Duration, NaiveDate};
use lottovalidator::dependency::carry_over_analysis;
use lottovalidator::distribution::{gap_distribution_analysis, sum_distribution_analysis, ReferenceSample};
use lottovalidator::frequency::{chi_square_uniformity_test, number_frequencies};
use lottovalidator::patterns::{last_digit_analysis, low_high_pattern_analysis, parity_pattern_analysis};
use lottovalidator::report::{distribution_summary, pattern_analysis_summary};
use lottovalidator::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn first_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2002, 12, 7).unwrap()
}

fn random_history(count: usize, seed: u64) -> Vec<Draw> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let picks = rand::seq::index::sample(&mut rng, 45, 7).into_vec();
            let mut numbers = [0u8; 6];
            for (slot, index) in numbers.iter_mut().zip(&picks) {
                *slot = *index as u8 + 1;
            }
            let bonus = picks[6] as u8 + 1;
            Draw::new(
                i as u32 + 1,
                first_date() + Duration::weeks(i as i64),
                numbers,
                bonus,
            )
            .unwrap()
        })
        .collect()
}

fn repeated_history(numbers: [u8; 6], count: usize) -> Vec<Draw> {
    (0..count)
        .map(|i| {
            Draw::new(
                i as u32 + 1,
                first_date() + Duration::weeks(i as i64),
                numbers,
                45,
            )
            .unwrap()
        })
        .collect()
}

#[test]
fn test_frequencies_count_every_drawn_number() {
    let draws = random_history(120, 11);
    let frequencies = number_frequencies(&draws);
    assert_eq!(frequencies.len(), 45);
    assert_eq!(frequencies.values().sum::<u64>(), 6 * 120);
}

#[test]
fn test_repeated_draw_fails_uniformity() {
    let draws = repeated_history([1, 2, 3, 4, 5, 6], 10);
    let result = chi_square_uniformity_test(&draws).unwrap();

    let expected = 60.0 / 45.0;
    let statistic = 6.0 * (10.0 - expected) * (10.0 - expected) / expected + 39.0 * expected;
    assert!((result.statistic - statistic).abs() < 1e-9);
    assert!(result.p_value < 1e-10);

    let summary = summarize_draws(&draws).unwrap();
    assert_eq!(summary.total_draws, 10);
    assert_eq!(summary.gap_histogram.get(&1), Some(&50));
    assert_eq!(summary.gap_histogram.len(), 1);
}

#[test]
fn test_carry_over_table_covers_every_pair() {
    let draws = random_history(80, 5);
    let result = carry_over_analysis(&draws).unwrap();
    let total: u64 = result.contingency_table.iter().flatten().sum();
    assert_eq!(total, 45 * 79);
    assert!((0.0..=1.0).contains(&result.p_value));
}

#[test]
fn test_carry_over_of_repeated_draw() {
    let draws = repeated_history([3, 9, 15, 27, 33, 41], 6);
    let result = carry_over_analysis(&draws).unwrap();
    assert_eq!(result.previous_hit_probability, 1.0);
    assert_eq!(result.previous_miss_probability, 0.0);
    assert_eq!(result.contingency_table, [[30, 0], [0, 195]]);
}

#[test]
fn test_pattern_expectations_match_history_size() {
    let draws = random_history(150, 21);

    let parity = parity_pattern_analysis(&draws).unwrap();
    let low_high = low_high_pattern_analysis(&draws).unwrap();
    let last_digit = last_digit_analysis(&draws).unwrap();

    assert!((parity.expected.values().sum::<f64>() - 150.0).abs() < 1e-9);
    assert!((low_high.expected.values().sum::<f64>() - 150.0).abs() < 1e-9);
    assert!((last_digit.expected.values().sum::<f64>() - 900.0).abs() < 1e-9);
    assert_eq!(parity.observed.values().sum::<u64>(), 150);
    assert_eq!(last_digit.observed.values().sum::<u64>(), 900);
    assert!(parity.observed.contains_key("3:3"));

    let summary = pattern_analysis_summary(&draws).unwrap();
    assert_eq!(summary.parity.statistic, parity.statistic);
}

#[test]
fn test_distribution_comparison_bounds() {
    let draws = random_history(100, 8);
    let reference = ReferenceSample::simulate(5_000, Some(99));

    let sums = sum_distribution_analysis(&draws, &reference.sums).unwrap();
    assert!((0.0..=1.0).contains(&sums.ks_statistic));
    assert!((0.0..=1.0).contains(&sums.ks_p_value));
    assert_eq!(sums.observed_histogram.values().sum::<u64>(), 100);
    assert!(sums.expected_histogram.values().all(|&e| e > 0.0));

    let gaps = gap_distribution_analysis(&draws, &reference.gaps).unwrap();
    assert_eq!(gaps.observed_histogram.values().sum::<u64>(), 500);
    assert!((gaps.expected_histogram.values().sum::<f64>() - 500.0).abs() < 1e-3);
}

#[test]
fn test_seeded_distribution_summary_is_reproducible() {
    let draws = random_history(60, 3);
    let a = distribution_summary(&draws, 3_000, Some(17)).unwrap();
    let b = distribution_summary(&draws, 3_000, Some(17)).unwrap();
    assert_eq!(a.sum.chi_square_statistic, b.sum.chi_square_statistic);
    assert_eq!(a.gap.ks_statistic, b.gap.ks_statistic);
    assert_eq!(a.sample_size, 3_000);
}

#[test]
fn test_full_analysis() {
    let draws = random_history(200, 42);
    let config = AnalysisConfig {
        sample_size: 2_000,
        seed: Some(42),
        ..AnalysisConfig::default()
    };

    let report = analyze(&draws, &config).unwrap();
    assert_eq!(report.summary.total_draws, 200);
    assert_eq!(report.dependency.autocorrelation.len(), 45);
    assert!(report
        .dependency
        .autocorrelation
        .iter()
        .all(|entry| entry.lags.len() == 5));

    let suite = report.randomness.as_ref().unwrap();
    assert_eq!(suite.encoding, BitEncoding::Presence);
    assert_eq!(suite.total_bits, 200 * 45);
    assert_eq!(suite.tests.len(), 5);

    let text = render_report(&report);
    assert!(text.contains("Lotto Draw Analysis"));
    assert!(text.contains("Draws analyzed: 200"));
    assert!(text.contains("Randomness Suite (presence encoding, 9000 bits)"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["config"]["encoding"], "presence");
    assert_eq!(json["summary"]["total_draws"], 200);
}

#[test]
fn test_short_history_skips_randomness_suite() {
    let first = Draw::new(1, first_date(), [1, 2, 3, 4, 5, 6], 7).unwrap();
    let second = Draw::new(2, first_date() + Duration::weeks(1), [10, 20, 30, 40, 41, 45], 8).unwrap();
    let config = AnalysisConfig {
        encoding: BitEncoding::Parity,
        sample_size: 500,
        seed: Some(1),
        ..AnalysisConfig::default()
    };

    let report = analyze(&[first, second], &config).unwrap();
    assert!(report.randomness.is_none());
    assert!(render_report(&report).contains("Skipped"));
}

#[test]
fn test_block_size_longer_than_stream_is_an_error() {
    // 20 draws under parity encoding give 120 bits: enough for the battery,
    // too few for a 128-bit block
    let draws = random_history(20, 6);
    let config = AnalysisConfig {
        encoding: BitEncoding::Parity,
        block_size: 128,
        sample_size: 500,
        seed: Some(1),
        ..AnalysisConfig::default()
    };
    assert!(matches!(
        analyze(&draws, &config),
        Err(AnalysisError::InsufficientBits {
            test: "block frequency test",
            needed: 128,
            got: 120
        })
    ));

    let fits = AnalysisConfig {
        block_size: 16,
        ..config
    };
    let report = analyze(&draws, &fits).unwrap();
    let suite = report.randomness.unwrap();
    assert_eq!(suite.total_bits, 120);
    assert_eq!(suite.tests.len(), 5);
}

#[test]
fn test_report_leaves_verdicts_to_the_battery() {
    let draws: Vec<Draw> = (0..30)
        .map(|i| {
            let numbers = if i % 2 == 0 {
                [1, 2, 3, 4, 5, 6]
            } else {
                [40, 41, 42, 43, 44, 45]
            };
            Draw::new(i + 1, first_date() + Duration::weeks(i as i64), numbers, 20).unwrap()
        })
        .collect();
    let config = AnalysisConfig {
        encoding: BitEncoding::Parity,
        sample_size: 500,
        seed: Some(1),
        ..AnalysisConfig::default()
    };

    let text = render_report(&analyze(&draws, &config).unwrap());
    assert!(!text.contains("Overall"));
    assert!(text.contains("Ljung-Box by number:"));
    // only the battery's five tests carry a verdict
    let verdicts = text.matches("PASS ✓").count() + text.matches("FAIL ✗").count();
    assert_eq!(verdicts, 5);
}

#[test]
fn test_analysis_rejects_invalid_config() {
    let draws = random_history(20, 2);
    let config = AnalysisConfig {
        serial_block: 7,
        ..AnalysisConfig::default()
    };
    assert!(matches!(
        analyze(&draws, &config),
        Err(AnalysisError::InvalidParameter { name: "serial_block", .. })
    ));
}
