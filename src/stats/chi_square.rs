//! Chi-square homogeneity test over a contingency table.
//!
//! Rows are categories, columns are groups. All-zero rows are dropped before
//! testing. When the minimum-cell check is enabled and more than 20% of the
//! remaining cells are below 5, the test is not run at all and the result is
//! classified inconclusive, since the chi-square approximation is unreliable
//! on sparse tables.

use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Classification of a homogeneity test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChiSquareClassification {
    /// Homogeneity rejected at the requested level.
    Significant,
    /// Homogeneity not rejected.
    NotSignificant,
    /// The test could not be run or did not produce a usable statistic.
    Inconclusive,
}

impl std::fmt::Display for ChiSquareClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChiSquareClassification::Significant => write!(f, "significant"),
            ChiSquareClassification::NotSignificant => write!(f, "not significant"),
            ChiSquareClassification::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

/// Result of a chi-square homogeneity test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareResult {
    /// Outcome classification.
    pub classification: ChiSquareClassification,
    /// Raw chi-square statistic (NaN when the test was not run).
    pub statistic: f64,
    /// p-value (NaN when the test was not run).
    pub p_value: f64,
}

impl ChiSquareResult {
    fn inconclusive() -> Self {
        Self {
            classification: ChiSquareClassification::Inconclusive,
            statistic: f64::NAN,
            p_value: f64::NAN,
        }
    }
}

/// Chi-square homogeneity test of a counts table.
///
/// # Arguments
///
/// * `table` - Rows of counts, one inner vector per category.
/// * `alpha` - Significance level for the classification.
/// * `min_cell_check` - Refuse to test sparse tables (>20% of cells < 5).
///
/// # Panics
///
/// Panics if `alpha` is outside (0, 1) or the rows are ragged.
pub fn chi_square_homogeneity(
    table: &[Vec<f64>],
    alpha: f64,
    min_cell_check: bool,
) -> ChiSquareResult {
    assert!(alpha > 0.0 && alpha < 1.0, "alpha must be in (0, 1)");
    let width = table.first().map_or(0, Vec::len);
    assert!(
        table.iter().all(|row| row.len() == width),
        "contingency table rows must have equal length"
    );

    let rows: Vec<&Vec<f64>> = table
        .iter()
        .filter(|row| row.iter().any(|&v| v != 0.0))
        .collect();
    if rows.len() < 2 || width < 2 {
        return ChiSquareResult::inconclusive();
    }

    if min_cell_check {
        let cells = rows.len() * width;
        let small = rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&v| v < 5.0)
            .count();
        if small as f64 > 0.2 * cells as f64 {
            return ChiSquareResult::inconclusive();
        }
    }

    let row_totals: Vec<f64> = rows.iter().map(|row| row.iter().sum()).collect();
    let col_totals: Vec<f64> = (0..width)
        .map(|j| rows.iter().map(|row| row[j]).sum())
        .collect();
    let grand: f64 = row_totals.iter().sum();
    if grand <= 0.0 || col_totals.iter().any(|&c| c <= 0.0) {
        return ChiSquareResult::inconclusive();
    }

    let mut statistic = 0.0;
    for (row, &row_total) in rows.iter().zip(&row_totals) {
        for (j, &observed) in row.iter().enumerate() {
            let expected = row_total * col_totals[j] / grand;
            statistic += (observed - expected) * (observed - expected) / expected;
        }
    }
    if !statistic.is_finite() {
        return ChiSquareResult::inconclusive();
    }

    let df = (rows.len() - 1) as f64 * (width - 1) as f64;
    let p_value = match ChiSquared::new(df) {
        Ok(dist) => 1.0 - dist.cdf(statistic),
        Err(_) => return ChiSquareResult::inconclusive(),
    };

    let classification = if p_value < alpha {
        ChiSquareClassification::Significant
    } else {
        ChiSquareClassification::NotSignificant
    };
    ChiSquareResult {
        classification,
        statistic,
        p_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_value() {
        // Expected counts [[12,18],[28,42]], statistic ≈ 0.7937, p ≈ 0.373
        let table = vec![vec![10.0, 20.0], vec![30.0, 40.0]];
        let result = chi_square_homogeneity(&table, 0.05, false);
        assert_eq!(
            result.classification,
            ChiSquareClassification::NotSignificant
        );
        assert!((result.statistic - 0.7937).abs() < 1e-3);
        assert!((result.p_value - 0.373).abs() < 1e-3);
    }

    #[test]
    fn strong_imbalance_is_significant() {
        let table = vec![vec![50.0, 10.0], vec![10.0, 50.0]];
        let result = chi_square_homogeneity(&table, 0.05, false);
        assert_eq!(result.classification, ChiSquareClassification::Significant);
    }

    #[test]
    fn sparse_table_is_inconclusive_with_check() {
        // Half of the cells are below 5.
        let table = vec![vec![2.0, 30.0], vec![3.0, 40.0]];
        let checked = chi_square_homogeneity(&table, 0.05, true);
        assert_eq!(checked.classification, ChiSquareClassification::Inconclusive);
        assert!(checked.statistic.is_nan());

        // Without the check the test runs.
        let unchecked = chi_square_homogeneity(&table, 0.05, false);
        assert!(!unchecked.statistic.is_nan());
    }

    #[test]
    fn all_zero_rows_are_dropped() {
        let table = vec![
            vec![0.0, 0.0],
            vec![10.0, 20.0],
            vec![30.0, 40.0],
        ];
        let with_zero = chi_square_homogeneity(&table, 0.05, false);
        let without = chi_square_homogeneity(&table[1..], 0.05, false);
        assert!((with_zero.statistic - without.statistic).abs() < 1e-12);
    }

    #[test]
    fn single_surviving_row_is_inconclusive() {
        let table = vec![vec![0.0, 0.0], vec![10.0, 20.0]];
        let result = chi_square_homogeneity(&table, 0.05, false);
        assert_eq!(result.classification, ChiSquareClassification::Inconclusive);
    }
}
