//! Configuration for the data-preparation pipeline.
//!
//! Strategy selection is expressed as enums rather than string keys, so an
//! unknown strategy cannot reach the pipeline at all; parameter mistakes are
//! caught by [`PreparationConfig::validate`] before stage 1 runs.

use serde::{Deserialize, Serialize};

use crate::table::Value;

/// An ordered list of column positions.
///
/// Positions are always relative to the table produced by the *previous*
/// pipeline stage, not the original file. Stage 1 reshapes the table to the
/// selected columns; every later selection is an index into that reshaped
/// table.
pub type ColumnSelection = Vec<usize>;

/// Value transformation applied after float coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Transform {
    /// Leave values unchanged.
    #[default]
    None,
    /// Replace each value with its base-2 logarithm. A zero input produces
    /// negative infinity, which is then replaced by the configured
    /// missing replacement.
    Log2,
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transform::None => write!(f, "None"),
            Transform::Log2 => write!(f, "Log2"),
        }
    }
}

/// Column normalization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Normalization {
    /// Leave values unchanged.
    #[default]
    None,
    /// Subtract the column-wise median (missing-aware) from every value in
    /// the column.
    Median,
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Normalization::None => write!(f, "None"),
            Normalization::Median => write!(f, "Median"),
        }
    }
}

/// Missing-value imputation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Imputation {
    /// Leave missing entries as they are.
    #[default]
    None,
    /// Replace missing entries with draws from a down-shifted normal
    /// distribution `Normal(median − std·shift, std·width)`, with median and
    /// std computed per column over non-missing entries.
    NormalDistribution {
        /// Down-shift of the distribution center, in column-std units.
        shift: f64,
        /// Width of the distribution, in column-std units.
        width: f64,
    },
}

/// Relationship between control and experiment replicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleRelation {
    /// Replicates are independent samples.
    #[default]
    Independent,
    /// Replicates are paired measurements of the same items.
    Paired,
}

impl std::fmt::Display for SampleRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleRelation::Independent => write!(f, "independent"),
            SampleRelation::Paired => write!(f, "paired"),
        }
    }
}

/// Keep only rows whose target column equals a configured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetFilter {
    /// Column holding the grouping value.
    pub column: usize,
    /// Value a row must carry to be kept.
    pub value: Value,
}

/// Keep only rows whose score column reaches a minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFilter {
    /// Column holding the score.
    pub column: usize,
    /// Minimum score (inclusive).
    pub min_score: f64,
}

/// Full configuration of the preparation pipeline (stages 1–7 plus the
/// optional index reset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparationConfig {
    /// Columns to keep from the input table (stage 1). All later selections
    /// are relative to this subset.
    pub select_cols: ColumnSelection,
    /// Columns in which empty text (always) and zero (when
    /// `zero_is_missing`) become the missing sentinel.
    pub zero_replace_cols: ColumnSelection,
    /// Columns cast to floating point.
    pub float_cols: ColumnSelection,
    /// Whether a measured zero counts as missing.
    pub zero_is_missing: bool,

    /// Transformation strategy (stage 2).
    pub transform: Transform,
    /// Columns the transform applies to.
    pub transform_cols: ColumnSelection,
    /// Replacement for the negative infinity produced by log2 of zero.
    /// NaN keeps such cells missing.
    pub log_missing_replacement: f64,

    /// Normalization strategy (stage 3).
    pub normalization: Normalization,
    /// Columns the normalization applies to.
    pub normalize_cols: ColumnSelection,

    /// Imputation strategy (stage 4).
    pub imputation: Imputation,
    /// Columns the imputation applies to.
    pub impute_cols: ColumnSelection,

    /// Optional row filter on a grouping column (stage 5).
    pub target_filter: Option<TargetFilter>,
    /// Drop rows where any of these columns is truthy (stage 6).
    pub exclusion_cols: ColumnSelection,
    /// Optional minimum-score row filter (stage 7). The only stage allowed
    /// to short-circuit the run with the no-data outcome.
    pub score_filter: Option<ScoreFilter>,

    /// Renumber the row index after the last stage.
    pub reset_index: bool,
}

impl PreparationConfig {
    /// Configuration that selects `select_cols` and leaves every strategy at
    /// its pass-through default.
    pub fn new(select_cols: ColumnSelection) -> Self {
        Self {
            select_cols,
            zero_replace_cols: Vec::new(),
            float_cols: Vec::new(),
            zero_is_missing: false,
            transform: Transform::None,
            transform_cols: Vec::new(),
            log_missing_replacement: f64::NAN,
            normalization: Normalization::None,
            normalize_cols: Vec::new(),
            imputation: Imputation::None,
            impute_cols: Vec::new(),
            target_filter: None,
            exclusion_cols: Vec::new(),
            score_filter: None,
            reset_index: false,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Set the float-coercion columns.
    pub fn coerce(
        mut self,
        zero_replace_cols: ColumnSelection,
        float_cols: ColumnSelection,
    ) -> Self {
        self.zero_replace_cols = zero_replace_cols;
        self.float_cols = float_cols;
        self
    }

    /// Treat measured zeros as missing during coercion.
    pub fn zero_is_missing(mut self, yes: bool) -> Self {
        self.zero_is_missing = yes;
        self
    }

    /// Set the transform strategy and its columns.
    pub fn transform(mut self, method: Transform, cols: ColumnSelection) -> Self {
        self.transform = method;
        self.transform_cols = cols;
        self
    }

    /// Set the replacement for log2-of-zero cells.
    pub fn log_missing_replacement(mut self, replacement: f64) -> Self {
        self.log_missing_replacement = replacement;
        self
    }

    /// Set the normalization strategy and its columns.
    pub fn normalize(mut self, method: Normalization, cols: ColumnSelection) -> Self {
        self.normalization = method;
        self.normalize_cols = cols;
        self
    }

    /// Set the imputation strategy and its columns.
    pub fn impute(mut self, method: Imputation, cols: ColumnSelection) -> Self {
        if let Imputation::NormalDistribution { shift, width } = method {
            assert!(shift.is_finite(), "imputation shift must be finite");
            assert!(
                width.is_finite() && width >= 0.0,
                "imputation width must be finite and non-negative"
            );
        }
        self.imputation = method;
        self.impute_cols = cols;
        self
    }

    /// Keep only rows whose `column` equals `value`.
    pub fn target(mut self, column: usize, value: Value) -> Self {
        self.target_filter = Some(TargetFilter { column, value });
        self
    }

    /// Drop rows flagged in any of `cols`.
    pub fn exclude(mut self, cols: ColumnSelection) -> Self {
        self.exclusion_cols = cols;
        self
    }

    /// Keep only rows with score ≥ `min_score`.
    pub fn min_score(mut self, column: usize, min_score: f64) -> Self {
        assert!(min_score.is_finite(), "min_score must be finite");
        self.score_filter = Some(ScoreFilter { column, min_score });
        self
    }

    /// Renumber the row index after the final stage.
    pub fn reset_index(mut self, yes: bool) -> Self {
        self.reset_index = yes;
        self
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check the configuration before any stage runs.
    ///
    /// Positions in every post-selection list must fall inside the subset
    /// produced by stage 1; strategy parameters must be usable. Returns an
    /// error message naming the offending setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.select_cols.is_empty() {
            return Err("select_cols must not be empty".to_string());
        }
        let width = self.select_cols.len();
        let in_range = |name: &str, cols: &[usize]| -> Result<(), String> {
            for &c in cols {
                if c >= width {
                    return Err(format!(
                        "{} position {} outside the selected table ({} columns)",
                        name, c, width
                    ));
                }
            }
            Ok(())
        };
        in_range("zero_replace_cols", &self.zero_replace_cols)?;
        in_range("float_cols", &self.float_cols)?;
        in_range("transform_cols", &self.transform_cols)?;
        in_range("normalize_cols", &self.normalize_cols)?;
        in_range("impute_cols", &self.impute_cols)?;
        in_range("exclusion_cols", &self.exclusion_cols)?;
        if let Some(filter) = &self.target_filter {
            in_range("target_filter", &[filter.column])?;
        }
        if let Some(filter) = &self.score_filter {
            in_range("score_filter", &[filter.column])?;
            if !filter.min_score.is_finite() {
                return Err("score_filter.min_score must be finite".to_string());
            }
        }
        if let Imputation::NormalDistribution { shift, width } = self.imputation {
            if !shift.is_finite() || !width.is_finite() || width < 0.0 {
                return Err(
                    "normal-distribution imputation needs finite shift and width ≥ 0".to_string(),
                );
            }
        }
        Ok(())
    }

    /// Whether any of the row-filter stages (5–7) is configured.
    pub fn has_row_filters(&self) -> bool {
        self.target_filter.is_some()
            || !self.exclusion_cols.is_empty()
            || self.score_filter.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = PreparationConfig::new(vec![0, 1, 2]);
        assert!(config.validate().is_ok());
        assert!(!config.has_row_filters());
    }

    #[test]
    fn out_of_range_column_rejected() {
        let config = PreparationConfig::new(vec![0, 1]).coerce(vec![], vec![5]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_selection_rejected() {
        let config = PreparationConfig::new(vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    #[should_panic(expected = "width must be finite")]
    fn negative_imputation_width_panics() {
        let _ = PreparationConfig::new(vec![0]).impute(
            Imputation::NormalDistribution {
                shift: 1.8,
                width: -0.3,
            },
            vec![0],
        );
    }

    #[test]
    fn filters_toggle_has_row_filters() {
        let config = PreparationConfig::new(vec![0, 1]).min_score(1, 0.5);
        assert!(config.has_row_filters());
    }
}
