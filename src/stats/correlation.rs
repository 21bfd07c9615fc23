//! Pairwise correlation matrices.
//!
//! Pearson, Spearman (average ranks) and Kendall (tau-b, tie-corrected)
//! over the columns of a numeric table. Each pair uses its complete
//! observations: rows where either column is missing are dropped for that
//! pair only.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Correlation coefficient family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CorrelationMethod {
    /// Linear (product-moment) correlation.
    #[default]
    Pearson,
    /// Rank correlation via concordant/discordant pairs (tau-b).
    Kendall,
    /// Rank correlation via Pearson on average ranks.
    Spearman,
}

impl std::fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrelationMethod::Pearson => write!(f, "Pearson"),
            CorrelationMethod::Kendall => write!(f, "Kendall"),
            CorrelationMethod::Spearman => write!(f, "Spearman"),
        }
    }
}

/// Full pairwise correlation matrix of `columns`.
///
/// The result is square and symmetric with a unit diagonal. A pair without
/// enough complete observations (or without spread) yields NaN.
pub fn correlation_matrix(columns: &[Vec<f64>], method: CorrelationMethod) -> DMatrix<f64> {
    let k = columns.len();
    let mut matrix = DMatrix::from_element(k, k, f64::NAN);
    for i in 0..k {
        matrix[(i, i)] = 1.0;
        for j in (i + 1)..k {
            let r = pair_correlation(&columns[i], &columns[j], method);
            matrix[(i, j)] = r;
            matrix[(j, i)] = r;
        }
    }
    matrix
}

fn pair_correlation(a: &[f64], b: &[f64], method: CorrelationMethod) -> f64 {
    let complete: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();
    if complete.len() < 2 {
        return f64::NAN;
    }
    let x: Vec<f64> = complete.iter().map(|(x, _)| *x).collect();
    let y: Vec<f64> = complete.iter().map(|(_, y)| *y).collect();
    match method {
        CorrelationMethod::Pearson => pearson(&x, &y),
        CorrelationMethod::Spearman => pearson(&average_ranks(&x), &average_ranks(&y)),
        CorrelationMethod::Kendall => kendall_tau_b(&x, &y),
    }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return f64::NAN;
    }
    sxy / (sxx * syy).sqrt()
}

/// Ranks starting at 1, ties receiving the average of their positions.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

fn kendall_tau_b(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    let mut concordant = 0i64;
    let mut discordant = 0i64;
    let mut ties_x = 0i64;
    let mut ties_y = 0i64;
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            if dx == 0.0 && dy == 0.0 {
                continue;
            } else if dx == 0.0 {
                ties_x += 1;
            } else if dy == 0.0 {
                ties_y += 1;
            } else if (dx > 0.0) == (dy > 0.0) {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }
    let n0 = (n * (n - 1) / 2) as f64;
    let denom = ((n0 - ties_x as f64) * (n0 - ties_y as f64)).sqrt();
    if denom <= 0.0 {
        return f64::NAN;
    }
    (concordant - discordant) as f64 / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pearson_perfect_correlation() {
        let cols = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 4.0, 6.0, 8.0, 10.0],
            vec![5.0, 4.0, 3.0, 2.0, 1.0],
        ];
        let m = correlation_matrix(&cols, CorrelationMethod::Pearson);
        assert!((m[(0, 1)] - 1.0).abs() < 1e-12);
        assert!((m[(0, 2)] + 1.0).abs() < 1e-12);
        assert_eq!(m[(1, 1)], 1.0);
        assert_eq!(m[(1, 2)], m[(2, 1)]);
    }

    #[test]
    fn spearman_uses_average_ranks() {
        // y ranks with a tie: [1, 2, 3.5, 5, 3.5] → r ≈ 0.8208
        let cols = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![5.0, 6.0, 7.0, 8.0, 7.0],
        ];
        let m = correlation_matrix(&cols, CorrelationMethod::Spearman);
        assert!((m[(0, 1)] - 0.8208).abs() < 1e-3);
    }

    #[test]
    fn kendall_small_example() {
        // x=[1,2,3], y=[1,3,2]: 2 concordant, 1 discordant → tau = 1/3
        let cols = vec![vec![1.0, 2.0, 3.0], vec![1.0, 3.0, 2.0]];
        let m = correlation_matrix(&cols, CorrelationMethod::Kendall);
        assert!((m[(0, 1)] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn missing_rows_dropped_pairwise() {
        let cols = vec![
            vec![1.0, 2.0, f64::NAN, 4.0, 5.0],
            vec![2.0, 4.0, 100.0, 8.0, 10.0],
        ];
        let m = correlation_matrix(&cols, CorrelationMethod::Pearson);
        assert!((m[(0, 1)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_is_nan_off_diagonal() {
        let cols = vec![vec![1.0, 1.0, 1.0], vec![1.0, 2.0, 3.0]];
        let m = correlation_matrix(&cols, CorrelationMethod::Pearson);
        assert!(m[(0, 1)].is_nan());
        assert_eq!(m[(0, 0)], 1.0);
    }
}
