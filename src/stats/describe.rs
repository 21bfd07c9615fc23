//! Missing-aware descriptive statistics.
//!
//! All functions treat NaN entries as missing and exclude them before
//! computing. Counts reflect only the entries actually used, so degrees of
//! freedom downstream stay consistent with the data present.

use super::StatsError;

/// Number of non-missing entries.
pub fn nan_count(values: &[f64]) -> usize {
    values.iter().filter(|v| !v.is_nan()).count()
}

/// Mean over non-missing entries. NaN when none are present.
pub fn nan_mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for &v in values {
        if !v.is_nan() {
            sum += v;
            n += 1;
        }
    }
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Sample standard deviation (ddof = 1) over non-missing entries.
/// NaN when fewer than two are present.
pub fn nan_std(values: &[f64]) -> f64 {
    let n = nan_count(values);
    if n < 2 {
        return f64::NAN;
    }
    let mean = nan_mean(values);
    let ss: f64 = values
        .iter()
        .filter(|v| !v.is_nan())
        .map(|&v| (v - mean) * (v - mean))
        .sum();
    (ss / (n as f64 - 1.0)).sqrt()
}

/// Median over non-missing entries, averaging the two central values for an
/// even count. NaN when none are present.
pub fn nan_median(values: &[f64]) -> f64 {
    let mut present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return f64::NAN;
    }
    present.sort_by(|a, b| a.total_cmp(b));
    let n = present.len();
    if n % 2 == 1 {
        present[n / 2]
    } else {
        (present[n / 2 - 1] + present[n / 2]) / 2.0
    }
}

/// Value range widened by a margin.
///
/// Returns `(min − d, max + d)` with `d = (max − min) · margin`, computed
/// over non-missing entries.
///
/// # Errors
///
/// [`StatsError::EmptyInput`] when no non-missing entry exists.
pub fn data_range(values: &[f64], margin: f64) -> Result<(f64, f64), StatsError> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut any = false;
    for &v in values {
        if v.is_nan() {
            continue;
        }
        any = true;
        min = min.min(v);
        max = max.max(v);
    }
    if !any {
        return Err(StatsError::EmptyInput);
    }
    let d = (max - min) * margin;
    Ok((min - d, max + d))
}
