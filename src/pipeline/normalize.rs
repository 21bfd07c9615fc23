//! Stage 3: column normalization.

use crate::config::{Normalization, PreparationConfig};
use crate::stats::nan_median;
use crate::table::{DataTable, TableError, Value};

pub(crate) fn apply(
    table: &DataTable,
    config: &PreparationConfig,
) -> Result<DataTable, TableError> {
    match config.normalization {
        Normalization::None => Ok(table.clone()),
        Normalization::Median => median(table, &config.normalize_cols),
    }
}

/// Subtract the column-wise median (missing-aware) from every value in the
/// column, centering each sample's distribution at zero.
fn median(table: &DataTable, cols: &[usize]) -> Result<DataTable, TableError> {
    let mut out = table.clone();
    for &col in cols {
        let floats = out.float_column(col)?;
        let center = nan_median(&floats);
        if center.is_nan() {
            // Column with no measurements; nothing to center.
            continue;
        }
        let values = floats
            .into_iter()
            .map(|v| {
                if v.is_nan() {
                    Value::Missing
                } else {
                    Value::Number(v - center)
                }
            })
            .collect();
        out = out.with_column_values(col, values)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn median_centers_column() {
        let table = DataTable::new(vec![Column::from_floats("v", &[2.0, 4.0, 8.0])]).unwrap();
        let config = PreparationConfig::new(vec![0]).normalize(Normalization::Median, vec![0]);
        let out = apply(&table, &config).unwrap();
        assert_eq!(out.float_column(0).unwrap(), vec![-2.0, 0.0, 4.0]);
    }

    #[test]
    fn median_ignores_missing() {
        let table =
            DataTable::new(vec![Column::from_floats("v", &[2.0, f64::NAN, 4.0, 8.0])]).unwrap();
        let config = PreparationConfig::new(vec![0]).normalize(Normalization::Median, vec![0]);
        let out = apply(&table, &config).unwrap();
        let floats = out.float_column(0).unwrap();
        assert_eq!(floats[0], -2.0);
        assert!(floats[1].is_nan());
        assert_eq!(floats[3], 4.0);
    }

    #[test]
    fn none_is_idempotent() {
        let table = DataTable::new(vec![Column::from_floats("v", &[2.0, 4.0, 8.0])]).unwrap();
        let config = PreparationConfig::new(vec![0]);
        let out = apply(&table, &config).unwrap();
        assert_eq!(out, table);
    }

    #[test]
    fn untouched_columns_keep_values() {
        let table = DataTable::new(vec![
            Column::from_floats("a", &[2.0, 4.0, 8.0]),
            Column::from_floats("b", &[1.0, 1.0, 1.0]),
        ])
        .unwrap();
        let config = PreparationConfig::new(vec![0, 1]).normalize(Normalization::Median, vec![0]);
        let out = apply(&table, &config).unwrap();
        assert_eq!(out.float_column(1).unwrap(), vec![1.0, 1.0, 1.0]);
    }
}
