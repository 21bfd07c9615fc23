//! Stage 2: value transformation.

use crate::config::{PreparationConfig, Transform};
use crate::table::{DataTable, TableError, Value};

pub(crate) fn apply(
    table: &DataTable,
    config: &PreparationConfig,
) -> Result<DataTable, TableError> {
    match config.transform {
        Transform::None => Ok(table.clone()),
        Transform::Log2 => log2(table, &config.transform_cols, config.log_missing_replacement),
    }
}

/// Base-2 logarithm of every value in `cols`.
///
/// log2 of zero yields negative infinity, which is replaced by
/// `missing_replacement` (a NaN replacement keeps the cell missing).
/// Negative inputs have no logarithm and become missing.
fn log2(table: &DataTable, cols: &[usize], missing_replacement: f64) -> Result<DataTable, TableError> {
    let mut out = table.clone();
    for &col in cols {
        let values = out
            .float_column(col)?
            .into_iter()
            .map(|v| {
                if v.is_nan() {
                    return Value::Missing;
                }
                let logged = v.log2();
                if logged == f64::NEG_INFINITY {
                    if missing_replacement.is_nan() {
                        Value::Missing
                    } else {
                        Value::Number(missing_replacement)
                    }
                } else if logged.is_nan() {
                    Value::Missing
                } else {
                    Value::Number(logged)
                }
            })
            .collect();
        out = out.with_column_values(col, values)?;
    }
    Ok(out)
}
