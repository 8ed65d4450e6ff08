//! Numeric building blocks shared by the test modules.
//!
//! Distribution tails come from `statrs`; the test statistics themselves are
//! computed here so every module agrees on degrees of freedom and edge cases.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};
use statrs::function::gamma::gamma_ur;

/// Exact binomial coefficient C(n, k).
pub const fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = if k > n - k { n - k } else { k };
    let mut result = 1u64;
    let mut i = 0;
    while i < k {
        // exact at every step: the running product is C(n, i + 1)
        result = result * (n - i) / (i + 1);
        i += 1;
    }
    result
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Upper tail of the chi-square distribution. NaN when `df` is not positive.
pub fn chi_square_sf(statistic: f64, df: f64) -> f64 {
    match ChiSquared::new(df) {
        Ok(_) if statistic <= 0.0 => 1.0,
        Ok(dist) => dist.sf(statistic),
        Err(_) => f64::NAN,
    }
}

/// Upper regularized incomplete gamma function Q(a, x).
pub fn upper_incomplete_gamma(a: f64, x: f64) -> f64 {
    if x.is_nan() || a.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 1.0;
    }
    if x.is_infinite() {
        return 0.0;
    }
    gamma_ur(a, x)
}

/// Pearson chi-square goodness-of-fit with `k - 1` degrees of freedom.
///
/// Returns `(statistic, p_value)`. Expected counts must be positive.
pub fn chi_square_goodness_of_fit(observed: &[f64], expected: &[f64]) -> (f64, f64) {
    let statistic: f64 = observed
        .iter()
        .zip(expected)
        .map(|(&o, &e)| {
            let diff = o - e;
            diff * diff / e
        })
        .sum();
    let df = observed.len() as f64 - 1.0;
    (statistic, chi_square_sf(statistic, df))
}

/// Chi-square test of independence on a 2x2 table, no continuity correction.
pub fn chi_square_independence_2x2(table: &[[u64; 2]; 2]) -> (f64, f64) {
    let row_totals = [
        (table[0][0] + table[0][1]) as f64,
        (table[1][0] + table[1][1]) as f64,
    ];
    let col_totals = [
        (table[0][0] + table[1][0]) as f64,
        (table[0][1] + table[1][1]) as f64,
    ];
    let total = row_totals[0] + row_totals[1];

    let mut statistic = 0.0;
    for (r, row) in table.iter().enumerate() {
        for (c, &count) in row.iter().enumerate() {
            let expected = row_totals[r] * col_totals[c] / total;
            let diff = count as f64 - expected;
            statistic += diff * diff / expected;
        }
    }
    (statistic, chi_square_sf(statistic, 1.0))
}

/// Median of a non-empty sample; even lengths average the middle pair.
pub fn median(values: &[u32]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Asymptotic Kolmogorov survival function Q_KS(lambda).
fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda < 1e-3 {
        return 1.0;
    }
    let a2 = -2.0 * lambda * lambda;
    let mut sum = 0.0;
    let mut sign = 1.0;
    let mut prev_term = 0.0f64;
    for k in 1..=100 {
        let kf = k as f64;
        let term = sign * 2.0 * (a2 * kf * kf).exp();
        sum += term;
        if term.abs() <= 1e-3 * prev_term || term.abs() <= 1e-8 * sum.abs() {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        prev_term = term.abs();
    }
    // series did not converge, which only happens for tiny lambda
    1.0
}

/// Two-sample Kolmogorov–Smirnov test.
///
/// Returns `(D, p_value)` where `D` is the largest gap between the two
/// empirical CDFs. The p-value uses the asymptotic distribution with effective
/// size `n*m/(n+m)`. Both samples must be non-empty, otherwise NaN is returned.
pub fn ks_two_sample(first: &[u32], second: &[u32]) -> (f64, f64) {
    if first.is_empty() || second.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let mut a = first.to_vec();
    let mut b = second.to_vec();
    a.sort_unstable();
    b.sort_unstable();

    let n = a.len() as f64;
    let m = b.len() as f64;
    let (mut i, mut j) = (0usize, 0usize);
    let mut d = 0.0f64;
    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / n - j as f64 / m).abs());
    }

    let en = (n * m / (n + m)).sqrt();
    let lambda = (en + 0.12 + 0.11 / en) * d;
    (d, kolmogorov_sf(lambda))
}
