//! Homogeneity-of-slopes test for grouped regressions.
//!
//! Each group holds several paired X/Y series, one regression line per pair.
//! The test compares the fit of individual slopes against one common slope
//! via a sum-of-squares decomposition:
//!
//! ```text
//! SS_within = Σ_i (Syy_i − Sxy_i²/Sxx_i)          separate slopes
//! SS_common = Σ_i Syy_i − (Σ_i Sxy_i)²/Σ_i Sxx_i   one pooled slope
//! F = ((SS_common − SS_within)/(k−1)) / (SS_within/(N−2k))
//! ```
//!
//! with `k` usable lines and `N` total observations. One p-value per group;
//! a degenerate group (fewer than two usable lines, no residual spread, or
//! exhausted degrees of freedom) yields NaN.

use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// One paired X/Y series.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionPair {
    /// Predictor values.
    pub x: Vec<f64>,
    /// Response values.
    pub y: Vec<f64>,
}

impl RegressionPair {
    /// Pair up predictor and response series of equal length.
    ///
    /// # Panics
    ///
    /// Panics if the series lengths differ.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        assert_eq!(x.len(), y.len(), "paired series must have equal length");
        Self { x, y }
    }

    /// Corrected sums of squares over complete observations:
    /// `(Sxx, Sxy, Syy, n)`.
    fn sums(&self) -> (f64, f64, f64, usize) {
        let complete: Vec<(f64, f64)> = self
            .x
            .iter()
            .zip(&self.y)
            .filter(|(x, y)| !x.is_nan() && !y.is_nan())
            .map(|(&x, &y)| (x, y))
            .collect();
        let n = complete.len();
        if n == 0 {
            return (0.0, 0.0, 0.0, 0);
        }
        let mean_x = complete.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
        let mean_y = complete.iter().map(|(_, y)| y).sum::<f64>() / n as f64;
        let mut sxx = 0.0;
        let mut sxy = 0.0;
        let mut syy = 0.0;
        for (x, y) in complete {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        (sxx, sxy, syy, n)
    }
}

/// Homogeneity-of-slopes p-values, one per group.
///
/// `group_sizes` partitions `pairs` into consecutive groups.
///
/// # Panics
///
/// Panics if `group_sizes` does not sum to the number of pairs.
pub fn regression_slope_homogeneity(pairs: &[RegressionPair], group_sizes: &[usize]) -> Vec<f64> {
    assert_eq!(
        group_sizes.iter().sum::<usize>(),
        pairs.len(),
        "group sizes must partition the pair list"
    );

    let mut p_values = Vec::with_capacity(group_sizes.len());
    let mut offset = 0usize;
    for &size in group_sizes {
        let group = &pairs[offset..offset + size];
        offset += size;
        p_values.push(group_p_value(group));
    }
    p_values
}

fn group_p_value(group: &[RegressionPair]) -> f64 {
    let mut k = 0usize;
    let mut n_total = 0usize;
    let mut ss_within = 0.0;
    let mut sxx_sum = 0.0;
    let mut sxy_sum = 0.0;
    let mut syy_sum = 0.0;

    for pair in group {
        let (sxx, sxy, syy, n) = pair.sums();
        // A usable line needs at least three observations and spread in X.
        if n < 3 || sxx <= 0.0 {
            continue;
        }
        k += 1;
        n_total += n;
        ss_within += syy - sxy * sxy / sxx;
        sxx_sum += sxx;
        sxy_sum += sxy;
        syy_sum += syy;
    }

    if k < 2 || sxx_sum <= 0.0 {
        return f64::NAN;
    }
    let df1 = (k - 1) as f64;
    let df2 = n_total as f64 - 2.0 * k as f64;
    if df2 <= 0.0 || ss_within <= 0.0 {
        return f64::NAN;
    }

    let ss_common = syy_sum - sxy_sum * sxy_sum / sxx_sum;
    let f = ((ss_common - ss_within) / df1) / (ss_within / df2);
    if !f.is_finite() || f < 0.0 {
        return f64::NAN;
    }
    match FisherSnedecor::new(df1, df2) {
        Ok(dist) => 1.0 - dist.cdf(f),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_line(slope: f64, n: usize) -> RegressionPair {
        // Small fixed perturbations keep residual spread non-zero without
        // pulling in a random source.
        let noise = [0.05, -0.04, 0.02, -0.03, 0.01, -0.02, 0.04, -0.01];
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, &x)| slope * x + noise[i % noise.len()])
            .collect();
        RegressionPair::new(x, y)
    }

    #[test]
    fn parallel_lines_have_high_p() {
        let pairs = vec![noisy_line(2.0, 8), noisy_line(2.0, 8)];
        let p = regression_slope_homogeneity(&pairs, &[2]);
        assert_eq!(p.len(), 1);
        assert!(p[0] > 0.5, "p = {}", p[0]);
    }

    #[test]
    fn diverging_slopes_have_low_p() {
        let pairs = vec![noisy_line(2.0, 8), noisy_line(-2.0, 8)];
        let p = regression_slope_homogeneity(&pairs, &[2]);
        assert!(p[0] < 0.01, "p = {}", p[0]);
    }

    #[test]
    fn groups_are_independent() {
        let pairs = vec![
            noisy_line(2.0, 8),
            noisy_line(2.0, 8),
            noisy_line(1.0, 8),
            noisy_line(-1.0, 8),
        ];
        let p = regression_slope_homogeneity(&pairs, &[2, 2]);
        assert_eq!(p.len(), 2);
        assert!(p[0] > p[1]);
    }

    #[test]
    fn degenerate_group_is_nan() {
        // A single usable line cannot be tested for slope homogeneity.
        let pairs = vec![noisy_line(2.0, 8)];
        let p = regression_slope_homogeneity(&pairs, &[1]);
        assert!(p[0].is_nan());

        // Constant X gives no slope at all.
        let flat = RegressionPair::new(vec![1.0; 5], vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let pairs = vec![flat.clone(), flat];
        let p = regression_slope_homogeneity(&pairs, &[2]);
        assert!(p[0].is_nan());
    }

    #[test]
    #[should_panic(expected = "group sizes must partition")]
    fn mismatched_group_sizes_panic() {
        let pairs = vec![noisy_line(1.0, 5)];
        let _ = regression_slope_homogeneity(&pairs, &[2]);
    }
}
