//! Stage 1: float coercion.
//!
//! Replaces empty cells (always) and zeros (when configured) with the
//! missing sentinel inside the designated columns, then casts the float
//! columns to numbers. Unparseable text in a float column is an input-shape
//! error naming the column.

use crate::config::PreparationConfig;
use crate::table::{DataTable, TableError, Value};

pub(crate) fn float_coercion(
    table: &DataTable,
    config: &PreparationConfig,
) -> Result<DataTable, TableError> {
    let mut out = table.clone();

    for &col in &config.zero_replace_cols {
        let values = out
            .column(col)?
            .values
            .iter()
            .map(|v| replace_cell(v, config.zero_is_missing))
            .collect();
        out = out.with_column_values(col, values)?;
    }

    for &col in &config.float_cols {
        let floats = out.float_column(col)?;
        let values = floats
            .into_iter()
            .map(|v| {
                if v.is_nan() {
                    Value::Missing
                } else {
                    Value::Number(v)
                }
            })
            .collect();
        out = out.with_column_values(col, values)?;
    }

    Ok(out)
}

fn replace_cell(value: &Value, zero_is_missing: bool) -> Value {
    match value {
        Value::Text(s) if s.is_empty() => Value::Missing,
        Value::Text(s) if zero_is_missing && matches!(s.trim().parse::<f64>(), Ok(v) if v == 0.0) => {
            Value::Missing
        }
        Value::Number(v) if zero_is_missing && *v == 0.0 => Value::Missing,
        other => other.clone(),
    }
}
