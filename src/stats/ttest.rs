//! Student-t hypothesis tests.
//!
//! Independent two-sample (pooled or Welch), paired and one-sample variants,
//! each with a two-sided or one-sided alternative. Degenerate groups (too
//! few values, zero spread) produce NaN statistics instead of errors, so a
//! single empty cell does not bring down a whole result column.

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::describe::{nan_count, nan_mean, nan_std};

/// Alternative hypothesis of a t-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    /// Means differ (two-sided).
    TwoSided,
    /// Mean of the first sample is greater.
    Greater,
    /// Mean of the first sample is smaller.
    Less,
}

/// Outcome of a t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    /// The t statistic.
    pub statistic: f64,
    /// Degrees of freedom.
    pub df: f64,
    /// The p-value under the chosen alternative.
    pub p_value: f64,
}

impl TTest {
    fn degenerate() -> Self {
        Self {
            statistic: f64::NAN,
            df: f64::NAN,
            p_value: f64::NAN,
        }
    }

    fn from_statistic(t: f64, df: f64, tail: Tail) -> Self {
        if !t.is_finite() || df <= 0.0 {
            return Self::degenerate();
        }
        let dist = match StudentsT::new(0.0, 1.0, df) {
            Ok(d) => d,
            Err(_) => return Self::degenerate(),
        };
        let p_value = match tail {
            Tail::TwoSided => 2.0 * (1.0 - dist.cdf(t.abs())),
            Tail::Greater => 1.0 - dist.cdf(t),
            Tail::Less => dist.cdf(t),
        };
        Self {
            statistic: t,
            df,
            p_value,
        }
    }
}

/// Two-sample t-test for independent samples.
///
/// With `equal_variance`, the classic pooled test with `nA + nB − 2` degrees
/// of freedom; otherwise Welch's test.
pub fn t_test_independent(a: &[f64], b: &[f64], equal_variance: bool, tail: Tail) -> TTest {
    let na = nan_count(a);
    let nb = nan_count(b);
    if na < 2 || nb < 2 {
        return TTest::degenerate();
    }
    let (na_f, nb_f) = (na as f64, nb as f64);
    let diff = nan_mean(a) - nan_mean(b);
    let (sa, sb) = (nan_std(a), nan_std(b));
    let (va, vb) = (sa * sa, sb * sb);

    let (se, df) = if equal_variance {
        let pooled = ((na_f - 1.0) * va + (nb_f - 1.0) * vb) / (na_f + nb_f - 2.0);
        ((pooled * (1.0 / na_f + 1.0 / nb_f)).sqrt(), na_f + nb_f - 2.0)
    } else {
        let term_a = va / na_f;
        let term_b = vb / nb_f;
        let se = (term_a + term_b).sqrt();
        let df = (term_a + term_b) * (term_a + term_b)
            / (term_a * term_a / (na_f - 1.0) + term_b * term_b / (nb_f - 1.0));
        (se, df)
    };
    TTest::from_statistic(diff / se, df, tail)
}

/// Paired t-test over rows where both samples are present.
pub fn t_test_paired(a: &[f64], b: &[f64], tail: Tail) -> TTest {
    assert_eq!(a.len(), b.len(), "paired samples must have equal length");
    let diffs: Vec<f64> = a
        .iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(x, y)| x - y)
        .collect();
    t_test_one_sample(&diffs, 0.0, tail)
}

/// One-sample t-test of the mean against `mu`.
pub fn t_test_one_sample(values: &[f64], mu: f64, tail: Tail) -> TTest {
    let n = nan_count(values);
    if n < 2 {
        return TTest::degenerate();
    }
    let se = nan_std(values) / (n as f64).sqrt();
    TTest::from_statistic((nan_mean(values) - mu) / se, n as f64 - 1.0, tail)
}
