//! Stages 5–7: row filters.
//!
//! Target and exclusion filters pass the table through unchanged when not
//! configured. The score filter is the only stage allowed to leave the table
//! empty in a way that short-circuits the run; the caller checks the row
//! count of its output.

use crate::config::PreparationConfig;
use crate::table::{DataTable, TableError};

/// Keep rows whose target column equals the configured value.
pub(crate) fn target(
    table: &DataTable,
    config: &PreparationConfig,
) -> Result<DataTable, TableError> {
    let Some(filter) = &config.target_filter else {
        return Ok(table.clone());
    };
    let column = table.column(filter.column)?;
    let mask: Vec<bool> = column.values.iter().map(|v| *v == filter.value).collect();
    Ok(table.retain_rows(&mask))
}

/// Drop rows where any configured exclusion column is truthy.
pub(crate) fn exclusion(
    table: &DataTable,
    config: &PreparationConfig,
) -> Result<DataTable, TableError> {
    if config.exclusion_cols.is_empty() {
        return Ok(table.clone());
    }
    let mut mask = vec![true; table.n_rows()];
    for &col in &config.exclusion_cols {
        let column = table.column(col)?;
        for (row, value) in column.values.iter().enumerate() {
            if value.is_truthy() {
                mask[row] = false;
            }
        }
    }
    Ok(table.retain_rows(&mask))
}

/// Keep rows whose score column reaches the configured minimum.
pub(crate) fn score(
    table: &DataTable,
    config: &PreparationConfig,
) -> Result<DataTable, TableError> {
    let Some(filter) = &config.score_filter else {
        return Ok(table.clone());
    };
    let scores = table.float_column(filter.column)?;
    let mask: Vec<bool> = scores.iter().map(|&s| s >= filter.min_score).collect();
    Ok(table.retain_rows(&mask))
}
