//! Result table keyed by (group, subgroup, statistic).
//!
//! The terminal artifact of the proteolysis and profiling engines:
//! identifying columns first (sequence/name, score, optional terminus
//! positions), then one block of values per comparison cell and statistic.
//! Block order is fixed by construction order, which follows the statistic
//! vocabulary below.

use serde::{Deserialize, Serialize};

use crate::table::Column;

/// Statistic vocabulary of the result blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statistic {
    /// Control mean (`aveC`).
    ControlMean,
    /// Control standard deviation (`stdC`).
    ControlStd,
    /// Experiment mean (`ave`).
    Mean,
    /// Experiment standard deviation (`std`).
    Std,
    /// Log2 fold-change (`FC`).
    FoldChange,
    /// Z-scored fold-change (`FCz`).
    FoldChangeZ,
    /// Confidence-interval half-width (`CI`).
    ConfidenceInterval,
    /// t-test p-value (`P`).
    PValue,
    /// Corrected p-value (`Pc`).
    CorrectedPValue,
    /// Equivalence p-value (`Ptost`).
    Equivalence,
}

impl Statistic {
    /// Column label used in persisted output.
    pub fn label(&self) -> &'static str {
        match self {
            Statistic::ControlMean => "aveC",
            Statistic::ControlStd => "stdC",
            Statistic::Mean => "ave",
            Statistic::Std => "std",
            Statistic::FoldChange => "FC",
            Statistic::FoldChangeZ => "FCz",
            Statistic::ConfidenceInterval => "CI",
            Statistic::PValue => "P",
            Statistic::CorrectedPValue => "Pc",
            Statistic::Equivalence => "Ptost",
        }
    }
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One column of statistic values for one comparison cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticBlock {
    /// Group label (band or condition).
    pub group: String,
    /// Subgroup label (lane or relevant point).
    pub subgroup: String,
    /// Which statistic the values carry.
    pub statistic: Statistic,
    /// One value per result row, aligned with the identifying columns.
    pub values: Vec<f64>,
}

/// Identifying columns plus ordered statistic blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Identifying columns (sequence/name, score, terminus positions).
    pub id_columns: Vec<Column>,
    /// Statistic blocks in their fixed output order.
    pub blocks: Vec<StatisticBlock>,
}

impl ResultTable {
    /// Build a result table from its identifying columns.
    ///
    /// # Panics
    ///
    /// Panics if the identifying columns have unequal lengths.
    pub fn new(id_columns: Vec<Column>) -> Self {
        if let Some(first) = id_columns.first() {
            assert!(
                id_columns.iter().all(|c| c.len() == first.len()),
                "identifying columns must have equal lengths"
            );
        }
        Self {
            id_columns,
            blocks: Vec::new(),
        }
    }

    /// Number of result rows.
    pub fn n_rows(&self) -> usize {
        self.id_columns.first().map_or(0, Column::len)
    }

    /// Append one statistic block.
    ///
    /// # Panics
    ///
    /// Panics if the value count does not match the row count.
    pub fn push_block(
        &mut self,
        group: impl Into<String>,
        subgroup: impl Into<String>,
        statistic: Statistic,
        values: Vec<f64>,
    ) {
        assert_eq!(
            values.len(),
            self.n_rows(),
            "statistic block must match the row count"
        );
        self.blocks.push(StatisticBlock {
            group: group.into(),
            subgroup: subgroup.into(),
            statistic,
            values,
        });
    }

    /// The block for one (group, subgroup, statistic) key.
    pub fn block(&self, group: &str, subgroup: &str, statistic: Statistic) -> Option<&StatisticBlock> {
        self.blocks
            .iter()
            .find(|b| b.group == group && b.subgroup == subgroup && b.statistic == statistic)
    }

    /// Rearrange rows by `order`, keeping identifying columns and every
    /// block aligned.
    pub fn permute_rows(&mut self, order: &[usize]) {
        assert_eq!(order.len(), self.n_rows(), "permutation must match row count");
        for col in &mut self.id_columns {
            col.values = order.iter().map(|&i| col.values[i].clone()).collect();
        }
        for block in &mut self.blocks {
            block.values = order.iter().map(|&i| block.values[i]).collect();
        }
    }
}
