//! Proteome-profiling differential analysis over a Condition ×
//! RelevantPoint grid.
//!
//! Each cell gets a block of per-protein statistics: control and experiment
//! mean/std, log2 fold-change, its z-score across the cell, a mode-dependent
//! confidence interval, a two-sided t-test p-value and an optional corrected
//! p-value. The control columns for a cell come from one of four mapping
//! strategies; the ratio strategy has no explicit control at all.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ColumnSelection, PreparationConfig, SampleRelation, Transform};
use crate::outcome::{AnalysisError, AnalysisOutcome, NO_DATA_MESSAGE};
use crate::pipeline::{self, PipelineOutcome, StageSnapshots};
use crate::result_table::{ResultTable, Statistic};
use crate::stats::{
    adjust_p_values, mean_difference_ci, nan_mean, nan_std, one_sample_ci, t_test_independent,
    t_test_paired, CorrectionMethod, Tail,
};
use crate::table::DataTable;

use super::{float_columns, round2, row_values, value_ordering};

/// Control-column mapping strategy.
///
/// The tag and the column lists travel together, so a mapping cannot
/// disagree with its own strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlColumns {
    /// One control selection shared by every cell.
    Shared(ColumnSelection),
    /// One control selection per relevant point, shared across conditions.
    PerPoint(Vec<ColumnSelection>),
    /// One control selection per condition, shared across points.
    PerCondition(Vec<ColumnSelection>),
    /// No explicit control: the experiment columns already hold ratios of
    /// intensities.
    Ratio,
}

/// Configuration of a proteome-profiling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilingConfig {
    /// Preparation settings (all seven stages).
    pub preparation: PreparationConfig,
    /// Condition labels, outer grid axis.
    pub conditions: Vec<String>,
    /// Relevant-point labels, inner grid axis.
    pub points: Vec<String>,
    /// Column holding the protein/peptide identifier.
    pub id_col: usize,
    /// Secondary sort column.
    pub secondary_col: Option<usize>,
    /// Score column carried into the result.
    pub score_col: Option<usize>,
    /// Control mapping strategy.
    pub control: ControlColumns,
    /// Whether the measurement columns hold raw intensities (as opposed to
    /// precomputed ratios).
    pub raw_intensities: bool,
    /// Control/experiment sample relationship.
    pub relation: SampleRelation,
    /// Significance level, also used for the confidence intervals.
    pub alpha: f64,
    /// Multiple-testing correction applied per cell.
    pub correction: CorrectionMethod,
    /// Experiment replicate columns per (condition, point) cell.
    pub cell_cols: BTreeMap<(usize, usize), ColumnSelection>,
}

impl ProfilingConfig {
    /// Configuration with raw independent intensities, α 0.05 and no
    /// correction.
    pub fn new(
        preparation: PreparationConfig,
        conditions: Vec<String>,
        points: Vec<String>,
        id_col: usize,
        control: ControlColumns,
    ) -> Self {
        Self {
            preparation,
            conditions,
            points,
            id_col,
            secondary_col: None,
            score_col: None,
            control,
            raw_intensities: true,
            relation: SampleRelation::Independent,
            alpha: 0.05,
            correction: CorrectionMethod::None,
            cell_cols: BTreeMap::new(),
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Assign experiment columns to one (condition, point) cell.
    pub fn cell(mut self, condition: usize, point: usize, cols: ColumnSelection) -> Self {
        self.cell_cols.insert((condition, point), cols);
        self
    }

    /// Set the secondary sort column.
    pub fn secondary_col(mut self, col: usize) -> Self {
        self.secondary_col = Some(col);
        self
    }

    /// Carry the score column into the result table.
    pub fn score_col(mut self, col: usize) -> Self {
        self.score_col = Some(col);
        self
    }

    /// Declare the measurements as precomputed ratios.
    pub fn ratio_intensities(mut self) -> Self {
        self.raw_intensities = false;
        self
    }

    /// Set the sample relationship.
    pub fn relation(mut self, relation: SampleRelation) -> Self {
        self.relation = relation;
        self
    }

    /// Set the significance level.
    pub fn alpha(mut self, alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha < 1.0, "alpha must be in (0, 1)");
        self.alpha = alpha;
        self
    }

    /// Set the multiple-testing correction.
    pub fn correction(mut self, method: CorrectionMethod) -> Self {
        self.correction = method;
        self
    }

    /// Check the configuration before running.
    pub fn validate(&self) -> Result<(), String> {
        self.preparation.validate()?;
        if self.conditions.is_empty() || self.points.is_empty() {
            return Err("conditions and points must not be empty".to_string());
        }
        let width = self.preparation.select_cols.len();
        let in_range = |name: &str, cols: &[usize]| -> Result<(), String> {
            for &c in cols {
                if c >= width {
                    return Err(format!("{} position {} outside the prepared table", name, c));
                }
            }
            Ok(())
        };
        in_range("id_col", &[self.id_col])?;
        if let Some(col) = self.secondary_col {
            in_range("secondary_col", &[col])?;
        }
        if let Some(col) = self.score_col {
            in_range("score_col", &[col])?;
        }
        match &self.control {
            ControlColumns::Shared(cols) => {
                if cols.is_empty() {
                    return Err("shared control selection must not be empty".to_string());
                }
                in_range("control columns", cols)?;
            }
            ControlColumns::PerPoint(lists) => {
                if lists.len() != self.points.len() {
                    return Err("per-point control needs one selection per point".to_string());
                }
                for cols in lists {
                    in_range("control columns", cols)?;
                }
            }
            ControlColumns::PerCondition(lists) => {
                if lists.len() != self.conditions.len() {
                    return Err(
                        "per-condition control needs one selection per condition".to_string()
                    );
                }
                for cols in lists {
                    in_range("control columns", cols)?;
                }
            }
            ControlColumns::Ratio => {
                if self.raw_intensities {
                    return Err("ratio control has no raw intensities".to_string());
                }
            }
        }
        for (&(condition, point), cols) in &self.cell_cols {
            if condition >= self.conditions.len() || point >= self.points.len() {
                return Err(format!(
                    "cell ({}, {}) outside the condition/point grid",
                    condition, point
                ));
            }
            in_range("cell columns", cols)?;
            if self.relation == SampleRelation::Paired {
                if let Some(control) = self.control_for(condition, point) {
                    if control.len() != cols.len() {
                        return Err(format!(
                            "paired samples need matching replicate counts in cell ({}, {})",
                            condition, point
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Control columns serving the given cell, `None` in ratio mode.
    fn control_for(&self, condition: usize, point: usize) -> Option<&ColumnSelection> {
        match &self.control {
            ControlColumns::Shared(cols) => Some(cols),
            ControlColumns::PerPoint(lists) => Some(&lists[point]),
            ControlColumns::PerCondition(lists) => Some(&lists[condition]),
            ControlColumns::Ratio => None,
        }
    }
}

/// Output of a proteome-profiling run.
#[derive(Debug, Clone)]
pub struct ProfilingReport {
    /// Result rows sorted by (identifier, secondary key), one statistic
    /// block set per cell with data.
    pub table: ResultTable,
    /// All pipeline stage snapshots.
    pub snapshots: StageSnapshots,
}

/// Proteome-profiling analysis engine.
#[derive(Debug, Clone)]
pub struct ProteomeProfilingAnalysis {
    config: ProfilingConfig,
}

impl ProteomeProfilingAnalysis {
    /// Engine with the given configuration.
    pub fn new(config: ProfilingConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &ProfilingConfig {
        &self.config
    }

    /// Run the analysis over `table`.
    pub fn run<R: Rng + ?Sized>(
        &self,
        table: &DataTable,
        rng: &mut R,
    ) -> AnalysisOutcome<ProfilingReport> {
        match self.run_inner(table, rng) {
            Ok(outcome) => outcome,
            Err(e) => AnalysisOutcome::failed(e),
        }
    }

    fn run_inner<R: Rng + ?Sized>(
        &self,
        table: &DataTable,
        rng: &mut R,
    ) -> Result<AnalysisOutcome<ProfilingReport>, AnalysisError> {
        let config = &self.config;
        config.validate().map_err(AnalysisError::Config)?;

        let snapshots = match pipeline::prepare(table, &config.preparation, rng)? {
            PipelineOutcome::Prepared(s) => s,
            PipelineOutcome::NoDataLeft(_) => {
                return Ok(AnalysisOutcome::empty(NO_DATA_MESSAGE));
            }
        };

        // Sort surviving rows by (identifier, secondary key) before any
        // statistics, so every block is built in final row order.
        let unsorted = snapshots.final_table();
        let id_values = &unsorted.column(config.id_col)?.values;
        let secondary_values = match config.secondary_col {
            Some(col) => Some(&unsorted.column(col)?.values),
            None => None,
        };
        let mut order: Vec<usize> = (0..unsorted.n_rows()).collect();
        order.sort_by(|&a, &b| {
            value_ordering(&id_values[a], &id_values[b]).then_with(|| match secondary_values {
                Some(values) => value_ordering(&values[a], &values[b]),
                None => std::cmp::Ordering::Equal,
            })
        });
        let final_table = unsorted.permute_rows(&order);
        let n_rows = final_table.n_rows();

        let mut id_columns = vec![final_table.column(config.id_col)?.clone()];
        if let Some(col) = config.secondary_col {
            id_columns.push(final_table.column(col)?.clone());
        }
        if let Some(col) = config.score_col {
            id_columns.push(final_table.column(col)?.clone());
        }
        let mut result = ResultTable::new(id_columns);

        let log2_upstream = config.preparation.transform == Transform::Log2;
        for (cond_idx, condition) in config.conditions.iter().enumerate() {
            for (point_idx, point) in config.points.iter().enumerate() {
                let Some(cols) = config.cell_cols.get(&(cond_idx, point_idx)) else {
                    continue;
                };
                let cell = CellInput {
                    group: condition,
                    subgroup: point,
                    data: float_columns(&final_table, cols)
                        .map_err(|e| group_error(condition, point, e))?,
                    control: match config.control_for(cond_idx, point_idx) {
                        Some(control_cols) => Some(
                            float_columns(&final_table, control_cols)
                                .map_err(|e| group_error(condition, point, e))?,
                        ),
                        None => None,
                    },
                };
                push_cell_blocks(&mut result, &cell, config, log2_upstream, n_rows);
            }
        }

        log::debug!(
            "profiling: {} rows, {} statistic blocks",
            n_rows,
            result.blocks.len()
        );
        Ok(AnalysisOutcome::Completed(ProfilingReport {
            table: result,
            snapshots,
        }))
    }
}

struct CellInput<'a> {
    group: &'a str,
    subgroup: &'a str,
    data: Vec<Vec<f64>>,
    control: Option<Vec<Vec<f64>>>,
}

fn group_error(group: &str, subgroup: &str, source: crate::table::TableError) -> AnalysisError {
    AnalysisError::Group {
        group: group.to_string(),
        subgroup: subgroup.to_string(),
        detail: source.to_string(),
    }
}

/// Compute and append the full statistic block set for one cell, in the
/// fixed output order.
fn push_cell_blocks(
    result: &mut ResultTable,
    cell: &CellInput<'_>,
    config: &ProfilingConfig,
    log2_upstream: bool,
    n_rows: usize,
) {
    let mut ave_c = Vec::with_capacity(n_rows);
    let mut std_c = Vec::with_capacity(n_rows);
    let mut ave = Vec::with_capacity(n_rows);
    let mut std = Vec::with_capacity(n_rows);
    let mut fold_change = Vec::with_capacity(n_rows);
    let mut ci = Vec::with_capacity(n_rows);
    let mut p_values = Vec::with_capacity(n_rows);

    for row in 0..n_rows {
        let data_row = row_values(&cell.data, row);
        let control_row = cell.control.as_ref().map(|c| row_values(c, row));

        let data_mean = nan_mean(&data_row);
        ave.push(data_mean);
        std.push(nan_std(&data_row));
        if let Some(control_row) = &control_row {
            ave_c.push(nan_mean(control_row));
            std_c.push(nan_std(control_row));
        }

        fold_change.push(match &control_row {
            Some(control_row) => {
                let control_mean = nan_mean(control_row);
                if log2_upstream {
                    data_mean - control_mean
                } else {
                    data_mean.log2() - control_mean.log2()
                }
            }
            None => {
                if log2_upstream {
                    data_mean
                } else {
                    data_mean.log2()
                }
            }
        });

        ci.push(cell_ci(&data_row, control_row.as_deref(), config).half_width());
        p_values.push(cell_p_value(&data_row, control_row.as_deref(), config));
    }

    // Z-score of the fold-change across this cell's rows.
    let fc_center = nan_mean(&fold_change);
    let fc_spread = nan_std(&fold_change);
    let fc_z: Vec<f64> = fold_change
        .iter()
        .map(|&fc| (fc - fc_center) / fc_spread)
        .collect();

    let corrected = match config.correction {
        CorrectionMethod::None => None,
        method => Some(adjust_p_values(&p_values, method)),
    };

    let rounded = |values: Vec<f64>| values.into_iter().map(round2).collect::<Vec<f64>>();
    if cell.control.is_some() {
        result.push_block(cell.group, cell.subgroup, Statistic::ControlMean, rounded(ave_c));
        result.push_block(cell.group, cell.subgroup, Statistic::ControlStd, rounded(std_c));
    }
    result.push_block(cell.group, cell.subgroup, Statistic::Mean, rounded(ave));
    result.push_block(cell.group, cell.subgroup, Statistic::Std, rounded(std));
    result.push_block(cell.group, cell.subgroup, Statistic::FoldChange, rounded(fold_change));
    result.push_block(cell.group, cell.subgroup, Statistic::FoldChangeZ, rounded(fc_z));
    result.push_block(cell.group, cell.subgroup, Statistic::ConfidenceInterval, rounded(ci));
    result.push_block(cell.group, cell.subgroup, Statistic::PValue, rounded(p_values));
    if let Some(corrected) = corrected {
        result.push_block(
            cell.group,
            cell.subgroup,
            Statistic::CorrectedPValue,
            rounded(corrected),
        );
    }
}

/// Fold-change confidence interval for one row, chosen by mode:
/// independent-mean-difference on raw independent intensities, one-sample
/// on the paired differences for raw paired intensities, one-sample on the
/// experiment values otherwise.
fn cell_ci(
    data: &[f64],
    control: Option<&[f64]>,
    config: &ProfilingConfig,
) -> crate::stats::CiEstimate {
    match (config.raw_intensities, control) {
        (true, Some(control)) => match config.relation {
            SampleRelation::Independent => {
                mean_difference_ci(data, control, config.alpha, true, false)
            }
            SampleRelation::Paired => {
                let diffs: Vec<f64> = data
                    .iter()
                    .zip(control)
                    .filter(|(d, c)| !d.is_nan() && !c.is_nan())
                    .map(|(d, c)| d - c)
                    .collect();
                one_sample_ci(&diffs, config.alpha, false)
            }
        },
        _ => one_sample_ci(data, config.alpha, false),
    }
}

/// Two-sided t-test for one row: experiment vs control, or vs an implicit
/// zero partner in ratio mode.
fn cell_p_value(data: &[f64], control: Option<&[f64]>, config: &ProfilingConfig) -> f64 {
    let zeros;
    let control = match control {
        Some(control) => control,
        None => {
            zeros = vec![0.0; data.len()];
            &zeros
        }
    };
    match config.relation {
        SampleRelation::Independent => {
            t_test_independent(data, control, true, Tail::TwoSided).p_value
        }
        SampleRelation::Paired => t_test_paired(data, control, Tail::TwoSided).p_value,
    }
}
