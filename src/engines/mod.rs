//! Analysis engines.
//!
//! Three orchestrators over the preparation pipeline and the statistical
//! primitives:
//!
//! - [`CorrelationAnalysis`]: sample-vs-sample correlation matrix of the
//!   imputed table.
//! - [`LimitedProteolysisAnalysis`]: per-peptide equivalence testing across
//!   a Band × Lane grid.
//! - [`ProteomeProfilingAnalysis`]: differential statistics across a
//!   Condition × RelevantPoint grid.
//!
//! Every engine returns an [`AnalysisOutcome`](crate::outcome::AnalysisOutcome)
//! and never panics on analysis failure; only configuration contract
//! violations panic.

mod correlation;
mod profiling;
mod proteolysis;

pub use correlation::{CorrelationAnalysis, CorrelationConfig, CorrelationReport};
pub use profiling::{ControlColumns, ProfilingConfig, ProfilingReport, ProteomeProfilingAnalysis};
pub use proteolysis::{LimitedProteolysisAnalysis, ProteolysisConfig, ProteolysisReport};

use crate::table::{DataTable, TableError, Value};

/// Extract several columns as float vectors.
pub(crate) fn float_columns(
    table: &DataTable,
    cols: &[usize],
) -> Result<Vec<Vec<f64>>, TableError> {
    cols.iter().map(|&c| table.float_column(c)).collect()
}

/// Values of one row across pre-extracted columns.
pub(crate) fn row_values(columns: &[Vec<f64>], row: usize) -> Vec<f64> {
    columns.iter().map(|c| c[row]).collect()
}

/// Round to two decimals, NaN passing through.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Ordering of table cells for row sorting: numbers first by value, then
/// text lexicographically, missing cells last.
pub(crate) fn value_ordering(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Number(_), Value::Text(_)) => Ordering::Less,
        (Value::Text(_), Value::Number(_)) => Ordering::Greater,
        (Value::Missing, Value::Missing) => Ordering::Equal,
        (Value::Missing, _) => Ordering::Greater,
        (_, Value::Missing) => Ordering::Less,
    }
}
