//! Bias-corrected equivalence margin for TOST testing.
//!
//! The margin (delta) bounds the region in which control and experiment are
//! considered equivalent. It widens with the control spread and with the
//! chosen error rates:
//!
//! ```text
//! δ = d_ref + s_corr · (t_{1−α, 2n−2} + t_{1−β/2, 2n−2}) · √(2/n)
//! s_corr = s · √((n−1) / χ²_{1−γ, n−1})
//! ```
//!
//! where `s` is the sample standard deviation of the control values and
//! `χ²_{1−γ, n−1}` the (1−γ) quantile of the chi-square distribution. The
//! correction inflates `s` toward its upper confidence bound, so δ is
//! monotone non-decreasing in γ.

use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};

use super::describe::{nan_count, nan_std};

/// Parameters of the equivalence margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquivalenceParams {
    /// One-sided test level α.
    pub alpha: f64,
    /// Type-II error rate β.
    pub beta: f64,
    /// Confidence level γ of the variance correction.
    pub gamma: f64,
    /// Reference difference added to the margin.
    pub reference_diff: f64,
    /// Upper clip for the margin, when bounded.
    pub delta_max: Option<f64>,
}

impl EquivalenceParams {
    /// Margin parameters with a zero reference difference and no clipping.
    ///
    /// # Panics
    ///
    /// Panics if any rate is outside (0, 1).
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        assert!(alpha > 0.0 && alpha < 1.0, "alpha must be in (0, 1)");
        assert!(beta > 0.0 && beta < 1.0, "beta must be in (0, 1)");
        assert!(gamma > 0.0 && gamma < 1.0, "gamma must be in (0, 1)");
        Self {
            alpha,
            beta,
            gamma,
            reference_diff: 0.0,
            delta_max: None,
        }
    }

    /// Set the reference difference.
    pub fn reference_diff(mut self, d: f64) -> Self {
        self.reference_diff = d;
        self
    }

    /// Clip the margin at `max`.
    pub fn delta_max(mut self, max: f64) -> Self {
        self.delta_max = Some(max);
        self
    }
}

/// Bias-corrected equivalence margin from control values.
///
/// NaN when fewer than two non-missing control values are present.
pub fn equivalence_delta(values: &[f64], params: &EquivalenceParams) -> f64 {
    let n = nan_count(values);
    if n < 2 {
        return f64::NAN;
    }
    let n_f = n as f64;
    let s = nan_std(values);

    let t_df = 2.0 * n_f - 2.0;
    let (t_alpha, t_beta) = match StudentsT::new(0.0, 1.0, t_df) {
        Ok(dist) => (
            dist.inverse_cdf(1.0 - params.alpha),
            dist.inverse_cdf(1.0 - params.beta / 2.0),
        ),
        Err(_) => return f64::NAN,
    };
    let chi = match ChiSquared::new(n_f - 1.0) {
        Ok(dist) => dist.inverse_cdf(1.0 - params.gamma),
        Err(_) => return f64::NAN,
    };

    let s_corr = s * ((n_f - 1.0) / chi).sqrt();
    let delta = params.reference_diff + s_corr * (t_alpha + t_beta) * (2.0 / n_f).sqrt();
    match params.delta_max {
        Some(max) => delta.min(max),
        None => delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_value() {
        // n = 4, s ≈ 0.29861, t_{0.95,6} = 1.9432, t_{0.90,6} = 1.4398,
        // χ²_{0.05,3} = 0.35185 → δ ≈ 2.086
        let values = [10.0, 10.5, 9.8, 10.2];
        let delta = equivalence_delta(&values, &EquivalenceParams::new(0.05, 0.2, 0.95));
        assert!((delta - 2.086).abs() < 2e-2, "delta = {}", delta);
    }

    #[test]
    fn monotone_in_gamma() {
        let values = [10.0, 10.5, 9.8, 10.2, 10.1];
        let mut last = f64::NEG_INFINITY;
        for gamma in [0.5, 0.7, 0.9, 0.95, 0.99] {
            let delta = equivalence_delta(&values, &EquivalenceParams::new(0.05, 0.2, gamma));
            assert!(delta >= last, "delta decreased at gamma {}", gamma);
            last = delta;
        }
    }

    #[test]
    fn reference_diff_shifts_delta() {
        let values = [10.0, 10.5, 9.8, 10.2];
        let base = equivalence_delta(&values, &EquivalenceParams::new(0.05, 0.2, 0.95));
        let shifted = equivalence_delta(
            &values,
            &EquivalenceParams::new(0.05, 0.2, 0.95).reference_diff(1.0),
        );
        assert!((shifted - base - 1.0).abs() < 1e-9);
    }

    #[test]
    fn clipped_at_delta_max() {
        let values = [10.0, 10.5, 9.8, 10.2];
        let delta = equivalence_delta(
            &values,
            &EquivalenceParams::new(0.05, 0.2, 0.95).delta_max(0.5),
        );
        assert_eq!(delta, 0.5);
    }

    #[test]
    fn degenerate_control_is_nan() {
        assert!(equivalence_delta(&[10.0], &EquivalenceParams::new(0.05, 0.2, 0.95)).is_nan());
        assert!(equivalence_delta(
            &[f64::NAN, f64::NAN],
            &EquivalenceParams::new(0.05, 0.2, 0.95)
        )
        .is_nan());
    }

    #[test]
    #[should_panic(expected = "gamma must be in (0, 1)")]
    fn invalid_gamma_panics() {
        let _ = EquivalenceParams::new(0.05, 0.2, 1.0);
    }
}
