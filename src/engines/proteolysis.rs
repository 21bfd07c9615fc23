//! Limited-proteolysis analysis over a Band × Lane grid.
//!
//! Each surviving peptide gets one bias-corrected equivalence margin from
//! the shared control columns, then one equivalence p-value (`Ptost`) per
//! grid cell: the larger of two one-sided t-tests, control+δ tested
//! "greater" and control−δ tested "less" against the cell's replicates.
//! `Ptost` falls under α when the cell's replicates sit within ±δ of the
//! control, marking the peptide as present in that band at control-level
//! intensity. When no cell anywhere reaches significance, the run returns
//! the no-cleavage outcome instead of a table.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ColumnSelection, PreparationConfig, SampleRelation};
use crate::outcome::{AnalysisError, AnalysisOutcome, NO_CLEAVAGE_MESSAGE, NO_DATA_MESSAGE};
use crate::pipeline::{self, PipelineOutcome, StageSnapshots};
use crate::result_table::{ResultTable, Statistic};
use crate::sequence::SequenceReference;
use crate::stats::{
    equivalence_delta, t_test_independent, t_test_paired, EquivalenceParams, Tail,
};
use crate::table::{Column, DataTable};

use super::{float_columns, row_values};

/// Configuration of a limited-proteolysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteolysisConfig {
    /// Preparation settings (all seven stages).
    pub preparation: PreparationConfig,
    /// Band labels, outer grid axis.
    pub bands: Vec<String>,
    /// Lane labels, inner grid axis.
    pub lanes: Vec<String>,
    /// Column holding the peptide sequence.
    pub sequence_col: usize,
    /// Column holding the identification score, carried into the result.
    pub score_col: Option<usize>,
    /// Control replicate columns, shared across all cells.
    pub control_cols: ColumnSelection,
    /// Experiment replicate columns per (band, lane) cell. Cells without an
    /// entry carry no data and produce no block.
    pub cell_cols: BTreeMap<(usize, usize), ColumnSelection>,
    /// Control/experiment sample relationship.
    pub relation: SampleRelation,
    /// Significance level of the equivalence decision.
    pub alpha: f64,
    /// Type-II error rate of the margin.
    pub beta: f64,
    /// Confidence level of the variance correction.
    pub gamma: f64,
    /// Reference difference added to the margin.
    pub reference_diff: f64,
    /// Fixed margin overriding the per-peptide computation.
    pub theta: Option<f64>,
    /// Upper clip for the computed margin.
    pub theta_max: Option<f64>,
}

impl ProteolysisConfig {
    /// Configuration with default rates (α 0.05, β 0.2, γ 0.95) and no
    /// margin override.
    pub fn new(
        preparation: PreparationConfig,
        bands: Vec<String>,
        lanes: Vec<String>,
        sequence_col: usize,
        control_cols: ColumnSelection,
    ) -> Self {
        Self {
            preparation,
            bands,
            lanes,
            sequence_col,
            score_col: None,
            control_cols,
            cell_cols: BTreeMap::new(),
            relation: SampleRelation::Independent,
            alpha: 0.05,
            beta: 0.2,
            gamma: 0.95,
            reference_diff: 0.0,
            theta: None,
            theta_max: None,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Assign experiment columns to one (band, lane) cell.
    pub fn cell(mut self, band: usize, lane: usize, cols: ColumnSelection) -> Self {
        self.cell_cols.insert((band, lane), cols);
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

    /// Set the type-II error rate.
    pub fn beta(mut self, beta: f64) -> Self {
        assert!(beta > 0.0 && beta < 1.0, "beta must be in (0, 1)");
        self.beta = beta;
        self
    }

    /// Set the variance-correction confidence level.
    pub fn gamma(mut self, gamma: f64) -> Self {
        assert!(gamma > 0.0 && gamma < 1.0, "gamma must be in (0, 1)");
        self.gamma = gamma;
        self
    }

    /// Use a fixed equivalence margin instead of the per-peptide one.
    pub fn theta(mut self, theta: f64) -> Self {
        assert!(theta.is_finite() && theta > 0.0, "theta must be positive");
        self.theta = Some(theta);
        self
    }

    /// Clip the computed margin.
    pub fn theta_max(mut self, max: f64) -> Self {
        assert!(max.is_finite() && max > 0.0, "theta_max must be positive");
        self.theta_max = Some(max);
        self
    }

    /// Carry the score column into the result table.
    pub fn score_col(mut self, col: usize) -> Self {
        self.score_col = Some(col);
        self
    }

    /// Check the configuration before running.
    pub fn validate(&self) -> Result<(), String> {
        self.preparation.validate()?;
        if self.bands.is_empty() || self.lanes.is_empty() {
            return Err("bands and lanes must not be empty".to_string());
        }
        if self.control_cols.is_empty() {
            return Err("control_cols must not be empty".to_string());
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
        in_range("sequence_col", &[self.sequence_col])?;
        if let Some(col) = self.score_col {
            in_range("score_col", &[col])?;
        }
        in_range("control_cols", &self.control_cols)?;
        for (&(band, lane), cols) in &self.cell_cols {
            if band >= self.bands.len() || lane >= self.lanes.len() {
                return Err(format!("cell ({}, {}) outside the band/lane grid", band, lane));
            }
            in_range("cell columns", cols)?;
            if self.relation == SampleRelation::Paired && cols.len() != self.control_cols.len() {
                return Err(format!(
                    "paired samples need matching replicate counts in cell ({}, {})",
                    band, lane
                ));
            }
        }
        Ok(())
    }
}

/// Output of a limited-proteolysis run.
#[derive(Debug, Clone)]
pub struct ProteolysisReport {
    /// Result rows sorted by (N-terminus, C-terminus), one `Ptost` block
    /// per cell with data.
    pub table: ResultTable,
    /// All pipeline stage snapshots.
    pub snapshots: StageSnapshots,
}

/// Limited-proteolysis analysis engine.
#[derive(Debug, Clone)]
pub struct LimitedProteolysisAnalysis {
    config: ProteolysisConfig,
}

impl LimitedProteolysisAnalysis {
    /// Engine with the given configuration.
    pub fn new(config: ProteolysisConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &ProteolysisConfig {
        &self.config
    }

    /// Run the analysis over `table`, resolving peptide positions through
    /// `sequences`.
    pub fn run<R, S>(
        &self,
        table: &DataTable,
        sequences: &S,
        rng: &mut R,
    ) -> AnalysisOutcome<ProteolysisReport>
    where
        R: Rng + ?Sized,
        S: SequenceReference,
    {
        match self.run_inner(table, sequences, rng) {
            Ok(outcome) => outcome,
            Err(e) => AnalysisOutcome::failed(e),
        }
    }

    fn run_inner<R, S>(
        &self,
        table: &DataTable,
        sequences: &S,
        rng: &mut R,
    ) -> Result<AnalysisOutcome<ProteolysisReport>, AnalysisError>
    where
        R: Rng + ?Sized,
        S: SequenceReference,
    {
        let config = &self.config;
        config.validate().map_err(AnalysisError::Config)?;

        let snapshots = match pipeline::prepare(table, &config.preparation, rng)? {
            PipelineOutcome::Prepared(s) => s,
            PipelineOutcome::NoDataLeft(_) => {
                return Ok(AnalysisOutcome::empty(NO_DATA_MESSAGE));
            }
        };
        let final_table = snapshots.final_table();
        let n_rows = final_table.n_rows();

        // Identifying columns: sequence, score, and terminus positions
        // resolved through the sequence reference. Peptides the reference
        // cannot locate carry the (-1, -1) sentinel.
        let sequence_column = final_table.column(config.sequence_col)?.clone();
        let peptides: Vec<String> = sequence_column
            .values
            .iter()
            .map(|v| v.to_string())
            .collect();

        let mut n_term = vec![-1.0; n_rows];
        let mut c_term = vec![-1.0; n_rows];
        for (i, peptide) in peptides.iter().enumerate() {
            if let Some(loc) = sequences.find_peptide_location(peptide, true)? {
                n_term[i] = loc.start as f64;
                c_term[i] = loc.end as f64;
            }
        }

        let mut id_columns = vec![sequence_column];
        if let Some(col) = config.score_col {
            id_columns.push(final_table.column(col)?.clone());
        }
        id_columns.push(Column::from_floats("n_term", &n_term));
        id_columns.push(Column::from_floats("c_term", &c_term));
        if sequences.has_native() {
            let mut native_start = vec![-1.0; n_rows];
            let mut native_end = vec![-1.0; n_rows];
            for (i, peptide) in peptides.iter().enumerate() {
                if let Some(loc) = sequences.find_peptide_location(peptide, false)? {
                    native_start[i] = loc.start as f64;
                    native_end[i] = loc.end as f64;
                }
            }
            id_columns.push(Column::from_floats("n_term_native", &native_start));
            id_columns.push(Column::from_floats("c_term_native", &native_end));
        }
        let mut result = ResultTable::new(id_columns);

        // One margin per peptide from the shared control columns.
        let controls = float_columns(final_table, &config.control_cols)?;
        let params = EquivalenceParams {
            alpha: config.alpha,
            beta: config.beta,
            gamma: config.gamma,
            reference_diff: config.reference_diff,
            delta_max: config.theta_max,
        };
        let deltas: Vec<f64> = (0..n_rows)
            .map(|row| match config.theta {
                Some(theta) => theta,
                None => equivalence_delta(&row_values(&controls, row), &params),
            })
            .collect();

        // One Ptost block per cell with data.
        let mut any_significant = false;
        for (band_idx, band) in config.bands.iter().enumerate() {
            for (lane_idx, lane) in config.lanes.iter().enumerate() {
                let Some(cols) = config.cell_cols.get(&(band_idx, lane_idx)) else {
                    continue;
                };
                let data = float_columns(final_table, cols).map_err(|e| AnalysisError::Group {
                    group: band.clone(),
                    subgroup: lane.clone(),
                    detail: e.to_string(),
                })?;

                let mut ptost = Vec::with_capacity(n_rows);
                for row in 0..n_rows {
                    let control_row = row_values(&controls, row);
                    let data_row = row_values(&data, row);
                    ptost.push(cell_ptost(
                        &control_row,
                        &data_row,
                        deltas[row],
                        config.relation,
                    ));
                }
                if ptost.iter().any(|&p| p < config.alpha) {
                    any_significant = true;
                }
                result.push_block(band.clone(), lane.clone(), Statistic::Equivalence, ptost);
            }
        }

        if !any_significant {
            return Ok(AnalysisOutcome::empty(NO_CLEAVAGE_MESSAGE));
        }

        // Sort by terminus positions; unlocated peptides lead with (-1, -1).
        let mut order: Vec<usize> = (0..n_rows).collect();
        order.sort_by(|&a, &b| {
            n_term[a]
                .total_cmp(&n_term[b])
                .then(c_term[a].total_cmp(&c_term[b]))
        });
        result.permute_rows(&order);

        log::debug!(
            "proteolysis: {} peptides, {} cells with data",
            n_rows,
            result.blocks.len()
        );
        Ok(AnalysisOutcome::Completed(ProteolysisReport {
            table: result,
            snapshots,
        }))
    }
}

/// Equivalence p-value for one cell: the larger of the two one-sided tests
/// against the shifted controls. NaN when either test is degenerate.
fn cell_ptost(control: &[f64], data: &[f64], delta: f64, relation: SampleRelation) -> f64 {
    let up: Vec<f64> = control.iter().map(|v| v + delta).collect();
    let down: Vec<f64> = control.iter().map(|v| v - delta).collect();
    let (p_greater, p_less) = match relation {
        SampleRelation::Paired => (
            t_test_paired(&up, data, Tail::Greater).p_value,
            t_test_paired(&down, data, Tail::Less).p_value,
        ),
        SampleRelation::Independent => (
            t_test_independent(&up, data, true, Tail::Greater).p_value,
            t_test_independent(&down, data, true, Tail::Less).p_value,
        ),
    };
    if p_greater.is_nan() || p_less.is_nan() {
        f64::NAN
    } else {
        p_greater.max(p_less)
    }
}
