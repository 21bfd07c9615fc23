//! Data-preparation pipeline.
//!
//! A strictly ordered sequence of stages over a [`DataTable`]:
//!
//! 1. Float coercion (subset, missing-sentinel replacement, float cast)
//! 2. Transformation (log2)
//! 3. Normalization (median centering)
//! 4. Imputation (down-shifted normal draws)
//! 5. Target filter
//! 6. Exclusion filter
//! 7. Score filter
//!
//! Every stage receives the previous stage's output and returns a newly
//! owned table; all eight snapshots (the initial subset plus one per stage)
//! stay retrievable afterward so the calling layer can persist them for
//! audit trails. An empty table after the score filter (and only there)
//! short-circuits the run with the no-data outcome instead of an error.

mod coerce;
mod filter;
mod impute;
mod normalize;
mod transform;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::PreparationConfig;
use crate::outcome::AnalysisError;
use crate::table::{DataTable, TableError};

/// Named pipeline stage, also the fixed vocabulary for persisted snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Selected subset of the input table, before any coercion.
    Initial,
    /// After float coercion.
    Float,
    /// After transformation.
    Transformed,
    /// After normalization.
    Normalized,
    /// After imputation.
    Imputed,
    /// After the target filter.
    TargetFiltered,
    /// After the exclusion filter.
    Excluded,
    /// After the score filter.
    ScoreFiltered,
}

impl Stage {
    /// All stages, in execution order.
    pub const ALL: [Stage; 8] = [
        Stage::Initial,
        Stage::Float,
        Stage::Transformed,
        Stage::Normalized,
        Stage::Imputed,
        Stage::TargetFiltered,
        Stage::Excluded,
        Stage::ScoreFiltered,
    ];

    /// Stable snapshot name.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::Float => "float",
            Stage::Transformed => "transformed",
            Stage::Normalized => "normalized",
            Stage::Imputed => "imputed",
            Stage::TargetFiltered => "target_filtered",
            Stage::Excluded => "excluded",
            Stage::ScoreFiltered => "score_filtered",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// All eight stage outputs of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSnapshots {
    /// Selected subset of the input table.
    pub initial: DataTable,
    /// Output of float coercion.
    pub float: DataTable,
    /// Output of the transformation stage.
    pub transformed: DataTable,
    /// Output of the normalization stage.
    pub normalized: DataTable,
    /// Output of the imputation stage.
    pub imputed: DataTable,
    /// Output of the target filter.
    pub target_filtered: DataTable,
    /// Output of the exclusion filter.
    pub excluded: DataTable,
    /// Output of the score filter (the terminal table).
    pub score_filtered: DataTable,
}

impl StageSnapshots {
    /// Snapshot for one stage.
    pub fn get(&self, stage: Stage) -> &DataTable {
        match stage {
            Stage::Initial => &self.initial,
            Stage::Float => &self.float,
            Stage::Transformed => &self.transformed,
            Stage::Normalized => &self.normalized,
            Stage::Imputed => &self.imputed,
            Stage::TargetFiltered => &self.target_filtered,
            Stage::Excluded => &self.excluded,
            Stage::ScoreFiltered => &self.score_filtered,
        }
    }

    /// All snapshots with their stage names, in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, &DataTable)> {
        Stage::ALL.iter().map(move |&s| (s, self.get(s)))
    }

    /// The terminal table of the run.
    pub fn final_table(&self) -> &DataTable {
        &self.score_filtered
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// Rows survived; the terminal table is ready for analysis.
    Prepared(StageSnapshots),
    /// The score filter removed every row. Snapshots up to that point are
    /// still available.
    NoDataLeft(StageSnapshots),
}

fn stage_error(stage: Stage, source: TableError) -> AnalysisError {
    AnalysisError::Stage {
        stage: stage.name(),
        source,
    }
}

/// Run the full pipeline over `table`.
///
/// Strategy parameters are validated before stage 1 runs; an invalid
/// configuration is a contract error reported as
/// [`AnalysisError::Config`]. The generator is used by the imputation stage
/// only; seed it for reproducible runs.
pub fn prepare<R: Rng + ?Sized>(
    table: &DataTable,
    config: &PreparationConfig,
    rng: &mut R,
) -> Result<PipelineOutcome, AnalysisError> {
    config.validate().map_err(AnalysisError::Config)?;

    let initial = table
        .select_columns(&config.select_cols)
        .map_err(|e| stage_error(Stage::Initial, e))?;
    let float = coerce::float_coercion(&initial, config)
        .map_err(|e| stage_error(Stage::Float, e))?;
    let transformed =
        transform::apply(&float, config).map_err(|e| stage_error(Stage::Transformed, e))?;
    let normalized =
        normalize::apply(&transformed, config).map_err(|e| stage_error(Stage::Normalized, e))?;
    let imputed =
        impute::apply(&normalized, config, rng).map_err(|e| stage_error(Stage::Imputed, e))?;
    let target_filtered =
        filter::target(&imputed, config).map_err(|e| stage_error(Stage::TargetFiltered, e))?;
    let excluded =
        filter::exclusion(&target_filtered, config).map_err(|e| stage_error(Stage::Excluded, e))?;
    let mut score_filtered =
        filter::score(&excluded, config).map_err(|e| stage_error(Stage::ScoreFiltered, e))?;
    if config.reset_index {
        score_filtered = score_filtered.reset_index();
    }

    log::debug!(
        "pipeline: {} rows in, {} after filters",
        table.n_rows(),
        score_filtered.n_rows()
    );

    let emptied = config.score_filter.is_some() && score_filtered.n_rows() == 0;
    let snapshots = StageSnapshots {
        initial,
        float,
        transformed,
        normalized,
        imputed,
        target_filtered,
        excluded,
        score_filtered,
    };
    if emptied {
        Ok(PipelineOutcome::NoDataLeft(snapshots))
    } else {
        Ok(PipelineOutcome::Prepared(snapshots))
    }
}
