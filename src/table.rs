//! Rectangular data table model.
//!
//! This module defines the core tabular types shared by the preparation
//! pipeline and the analysis engines: a [`Value`] cell, a named [`Column`],
//! and a [`DataTable`] with a stable column order and a row index that
//! survives filtering.
//!
//! Tables have value semantics: every operation returns a newly owned table,
//! so each pipeline stage can retain its output as an independent snapshot.

use serde::{Deserialize, Serialize};

/// A single table cell.
///
/// Numeric columns use `Number`; cells that carry no measurement use
/// `Missing`. From float coercion onward, `Missing` is the one uniform
/// sentinel for absent values and maps to `f64::NAN` on numeric extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Textual cell (identifiers, sequences, annotations).
    Text(String),
    /// Numeric cell.
    Number(f64),
    /// Absent measurement.
    Missing,
}

impl Value {
    /// Numeric view of the cell: `Number` as-is, `Missing` as NaN.
    ///
    /// Text cells have no numeric view and return `None`; callers that
    /// require numbers should coerce the column first.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Missing => Some(f64::NAN),
            Value::Text(_) => None,
        }
    }

    /// Whether the cell is the missing sentinel.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Truthiness used by the exclusion filter: non-zero finite numbers and
    /// non-empty text are truthy, `Missing` is falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(v) => v.is_finite() && *v != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Missing => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(v) => write!(f, "{}", v),
            Value::Missing => write!(f, ""),
        }
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name as supplied by the file-reading collaborator.
    pub name: String,
    /// Cell values, one per row.
    pub values: Vec<Value>,
}

impl Column {
    /// Create a column from a name and its cells.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Create a numeric column from raw floats. NaN entries become the
    /// missing sentinel.
    pub fn from_floats(name: impl Into<String>, values: &[f64]) -> Self {
        Self {
            name: name.into(),
            values: values
                .iter()
                .map(|&v| {
                    if v.is_nan() {
                        Value::Missing
                    } else {
                        Value::Number(v)
                    }
                })
                .collect(),
        }
    }

    /// Create a text column.
    pub fn from_text(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|s| Value::Text((*s).to_string())).collect(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Errors raised by table operations.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Columns of unequal length were combined into one table.
    #[error("columns have unequal lengths: {0}")]
    RaggedColumns(String),
    /// A column position outside the table was referenced.
    #[error("column index {index} out of range (table has {width} columns)")]
    ColumnOutOfRange {
        /// Offending position.
        index: usize,
        /// Number of columns in the table.
        width: usize,
    },
    /// A cell could not be interpreted as a number.
    #[error("column '{column}' is not numeric: cannot coerce '{cell}'")]
    NonNumeric {
        /// Name of the offending column.
        column: String,
        /// The cell that failed to parse.
        cell: String,
    },
}

/// A rectangular table: rows are features/peptides/proteins, columns are
/// sample measurements plus identifying metadata.
///
/// The `index` carries original row identities through row filters; it can
/// be renumbered with [`DataTable::reset_index`] as an optional final step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    index: Vec<usize>,
    columns: Vec<Column>,
}

impl DataTable {
    /// Build a table from columns, checking that all lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let n = columns.first().map_or(0, Column::len);
        for col in &columns {
            if col.len() != n {
                return Err(TableError::RaggedColumns(format!(
                    "'{}' has {} rows, expected {}",
                    col.name,
                    col.len(),
                    n
                )));
            }
        }
        Ok(Self {
            index: (0..n).collect(),
            columns,
        })
    }

    fn with_index(index: Vec<usize>, columns: Vec<Column>) -> Self {
        Self { index, columns }
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Row index values (original row identities).
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column at `idx`, or an out-of-range error.
    pub fn column(&self, idx: usize) -> Result<&Column, TableError> {
        self.columns.get(idx).ok_or(TableError::ColumnOutOfRange {
            index: idx,
            width: self.columns.len(),
        })
    }

    /// Cell at (`row`, `col`). Panics on out-of-range positions; callers
    /// validate shapes before iterating rows.
    pub fn value(&self, row: usize, col: usize) -> &Value {
        &self.columns[col].values[row]
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// New table holding only the columns at `selection`, in that order.
    pub fn select_columns(&self, selection: &[usize]) -> Result<Self, TableError> {
        let mut columns = Vec::with_capacity(selection.len());
        for &idx in selection {
            columns.push(self.column(idx)?.clone());
        }
        Ok(Self::with_index(self.index.clone(), columns))
    }

    /// Numeric view of a column: `Number` as-is, `Missing` as NaN, text
    /// parsed as a float. Unparseable text is a [`TableError::NonNumeric`].
    pub fn float_column(&self, idx: usize) -> Result<Vec<f64>, TableError> {
        let col = self.column(idx)?;
        col.values
            .iter()
            .map(|v| match v {
                Value::Number(x) => Ok(*x),
                Value::Missing => Ok(f64::NAN),
                Value::Text(s) => s.trim().parse::<f64>().map_err(|_| TableError::NonNumeric {
                    column: col.name.clone(),
                    cell: s.clone(),
                }),
            })
            .collect()
    }

    /// Replace the cells of one column, returning a new table.
    pub fn with_column_values(&self, idx: usize, values: Vec<Value>) -> Result<Self, TableError> {
        if idx >= self.columns.len() {
            return Err(TableError::ColumnOutOfRange {
                index: idx,
                width: self.columns.len(),
            });
        }
        assert_eq!(
            values.len(),
            self.n_rows(),
            "replacement column must match row count"
        );
        let mut columns = self.columns.clone();
        columns[idx].values = values;
        Ok(Self::with_index(self.index.clone(), columns))
    }

    /// New table keeping only rows where `mask` is true.
    pub fn retain_rows(&self, mask: &[bool]) -> Self {
        assert_eq!(mask.len(), self.n_rows(), "mask must match row count");
        let index = self
            .index
            .iter()
            .zip(mask)
            .filter(|(_, &keep)| keep)
            .map(|(&i, _)| i)
            .collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: c
                    .values
                    .iter()
                    .zip(mask)
                    .filter(|(_, &keep)| keep)
                    .map(|(v, _)| v.clone())
                    .collect(),
            })
            .collect();
        Self::with_index(index, columns)
    }

    /// New table with rows rearranged by `order` (a permutation of row
    /// positions).
    pub fn permute_rows(&self, order: &[usize]) -> Self {
        assert_eq!(order.len(), self.n_rows(), "permutation must match row count");
        let index = order.iter().map(|&i| self.index[i]).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: order.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Self::with_index(index, columns)
    }

    /// New table with the row index renumbered from zero.
    pub fn reset_index(&self) -> Self {
        Self::with_index((0..self.n_rows()).collect(), self.columns.clone())
    }
}
