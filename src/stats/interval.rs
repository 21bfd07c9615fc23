//! Student-t confidence intervals.
//!
//! Two estimators: a one-sample interval for a mean and a two-sample
//! interval for the difference of independent means. Both come in a
//! symmetric half-width form and an explicit bounds form.
//!
//! ```text
//! one-sample:       h = t_{1−α/2, n−1} · s / √n
//! mean difference:  h = t_{1−α/2, nA+nB−2} · s_p · √(1/nA + 1/nB)
//!                   s_p² = ((nA−1)·sA² + (nB−1)·sB²) / (nA+nB−2)
//! ```

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::describe::{nan_count, nan_mean, nan_std};

/// A confidence-interval estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CiEstimate {
    /// Symmetric half-width around the (unreported) point estimate.
    HalfWidth(f64),
    /// Explicit interval bounds.
    Bounds {
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },
}

impl CiEstimate {
    /// The half-width, regardless of representation.
    pub fn half_width(&self) -> f64 {
        match self {
            CiEstimate::HalfWidth(h) => *h,
            CiEstimate::Bounds { lower, upper } => (upper - lower) / 2.0,
        }
    }
}

fn t_quantile(p: f64, df: f64) -> f64 {
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => dist.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// Student-t confidence interval for a sample mean.
///
/// Degrees of freedom are `n − 1` over non-missing entries. A degenerate
/// sample (fewer than two entries) yields NaN rather than an error.
///
/// # Panics
///
/// Panics if `alpha` is outside (0, 1).
pub fn one_sample_ci(values: &[f64], alpha: f64, full_interval: bool) -> CiEstimate {
    assert!(alpha > 0.0 && alpha < 1.0, "alpha must be in (0, 1)");
    let n = nan_count(values);
    if n < 2 {
        return degenerate(full_interval);
    }
    let mean = nan_mean(values);
    let s = nan_std(values);
    let h = t_quantile(1.0 - alpha / 2.0, n as f64 - 1.0) * s / (n as f64).sqrt();
    if full_interval {
        CiEstimate::Bounds {
            lower: mean - h,
            upper: mean + h,
        }
    } else {
        CiEstimate::HalfWidth(h)
    }
}

/// Confidence interval for the difference of two independent sample means.
///
/// With `equal_variance`, uses the pooled variance weighted by `(n − 1)` of
/// each sample and `nA + nB − 2` degrees of freedom; otherwise the Welch
/// standard error and Welch–Satterthwaite degrees of freedom.
///
/// # Panics
///
/// Panics if `alpha` is outside (0, 1).
pub fn mean_difference_ci(
    a: &[f64],
    b: &[f64],
    alpha: f64,
    equal_variance: bool,
    full_interval: bool,
) -> CiEstimate {
    assert!(alpha > 0.0 && alpha < 1.0, "alpha must be in (0, 1)");
    let na = nan_count(a);
    let nb = nan_count(b);
    if na < 2 || nb < 2 {
        return degenerate(full_interval);
    }
    let (na_f, nb_f) = (na as f64, nb as f64);
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

    let h = t_quantile(1.0 - alpha / 2.0, df) * se;
    if full_interval {
        let diff = nan_mean(a) - nan_mean(b);
        CiEstimate::Bounds {
            lower: diff - h,
            upper: diff + h,
        }
    } else {
        CiEstimate::HalfWidth(h)
    }
}

fn degenerate(full_interval: bool) -> CiEstimate {
    if full_interval {
        CiEstimate::Bounds {
            lower: f64::NAN,
            upper: f64::NAN,
        }
    } else {
        CiEstimate::HalfWidth(f64::NAN)
    }
}
