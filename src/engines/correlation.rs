//! Sample-correlation analysis.
//!
//! Runs pipeline stages 1–4 (no row filtering), then computes the full
//! pairwise correlation matrix of the imputed table's measurement columns.

use nalgebra::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::PreparationConfig;
use crate::outcome::{AnalysisError, AnalysisOutcome, NO_DATA_MESSAGE};
use crate::pipeline::{self, PipelineOutcome, StageSnapshots};
use crate::stats::{correlation_matrix, CorrelationMethod};
use crate::table::DataTable;

/// Configuration of a correlation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Preparation settings (stages 1–4; row filters must stay unset).
    pub preparation: PreparationConfig,
    /// Correlation coefficient family.
    pub method: CorrelationMethod,
}

impl CorrelationConfig {
    /// Correlation over the preparation's float columns.
    pub fn new(preparation: PreparationConfig, method: CorrelationMethod) -> Self {
        Self {
            preparation,
            method,
        }
    }

    /// Check the configuration before running.
    pub fn validate(&self) -> Result<(), String> {
        self.preparation.validate()?;
        if self.preparation.has_row_filters() {
            return Err("correlation analysis runs without row filters".to_string());
        }
        if self.preparation.float_cols.is_empty() {
            return Err("correlation analysis needs at least one float column".to_string());
        }
        Ok(())
    }
}

/// Output of a correlation run.
#[derive(Debug, Clone)]
pub struct CorrelationReport {
    /// Names of the correlated columns, in matrix order.
    pub labels: Vec<String>,
    /// Square, symmetric correlation matrix with a unit diagonal.
    pub matrix: DMatrix<f64>,
    /// All pipeline stage snapshots.
    pub snapshots: StageSnapshots,
}

/// Correlation analysis engine.
#[derive(Debug, Clone)]
pub struct CorrelationAnalysis {
    config: CorrelationConfig,
}

impl CorrelationAnalysis {
    /// Engine with the given configuration.
    pub fn new(config: CorrelationConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// Run the analysis over `table`.
    ///
    /// The generator feeds the imputation stage; seed it for reproducible
    /// matrices.
    pub fn run<R: Rng + ?Sized>(
        &self,
        table: &DataTable,
        rng: &mut R,
    ) -> AnalysisOutcome<CorrelationReport> {
        if let Err(msg) = self.config.validate() {
            return AnalysisOutcome::failed(AnalysisError::Config(msg));
        }

        let snapshots = match pipeline::prepare(table, &self.config.preparation, rng) {
            Ok(PipelineOutcome::Prepared(s)) => s,
            Ok(PipelineOutcome::NoDataLeft(_)) => {
                return AnalysisOutcome::empty(NO_DATA_MESSAGE);
            }
            Err(e) => return AnalysisOutcome::failed(e),
        };

        let imputed = &snapshots.imputed;
        let cols = &self.config.preparation.float_cols;
        let mut labels = Vec::with_capacity(cols.len());
        let mut columns = Vec::with_capacity(cols.len());
        for &c in cols {
            let column = match imputed.column(c) {
                Ok(col) => col,
                Err(e) => {
                    return AnalysisOutcome::failed(AnalysisError::Correlation(e.to_string()));
                }
            };
            labels.push(column.name.clone());
            match imputed.float_column(c) {
                Ok(values) => columns.push(values),
                Err(e) => {
                    return AnalysisOutcome::failed(AnalysisError::Correlation(e.to_string()));
                }
            }
        }

        let matrix = correlation_matrix(&columns, self.config.method);
        log::debug!(
            "correlation: {}x{} matrix ({})",
            matrix.nrows(),
            matrix.ncols(),
            self.config.method
        );
        AnalysisOutcome::Completed(CorrelationReport {
            labels,
            matrix,
            snapshots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Normalization;
    use crate::table::{Column, Value};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn intensity_table() -> DataTable {
        DataTable::new(vec![
            Column::from_text("name", &["p1", "p2", "p3", "p4"]),
            Column::from_floats("s1", &[1.0, 2.0, 3.0, 4.0]),
            Column::from_floats("s2", &[2.0, 4.0, 6.0, 8.0]),
            Column::from_floats("s3", &[4.0, 3.0, 2.0, 1.0]),
        ])
        .unwrap()
    }

    fn engine(method: CorrelationMethod) -> CorrelationAnalysis {
        let preparation = PreparationConfig::new(vec![0, 1, 2, 3])
            .coerce(vec![], vec![1, 2, 3])
            .normalize(Normalization::Median, vec![1, 2, 3]);
        CorrelationAnalysis::new(CorrelationConfig::new(preparation, method))
    }

    #[test]
    fn pearson_matrix_has_unit_diagonal() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let report = engine(CorrelationMethod::Pearson)
            .run(&intensity_table(), &mut rng)
            .expect_completed();
        assert_eq!(report.labels, vec!["s1", "s2", "s3"]);
        assert_eq!(report.matrix.nrows(), 3);
        for i in 0..3 {
            assert_eq!(report.matrix[(i, i)], 1.0);
        }
        assert!((report.matrix[(0, 1)] - 1.0).abs() < 1e-12);
        assert!((report.matrix[(0, 2)] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn snapshots_come_back_with_the_report() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let report = engine(CorrelationMethod::Spearman)
            .run(&intensity_table(), &mut rng)
            .expect_completed();
        // Median normalization centered each measurement column.
        let normalized = report.snapshots.normalized.float_column(1).unwrap();
        assert!((normalized[0] + 1.5).abs() < 1e-12);
        // Filters stayed pass-through.
        assert_eq!(
            report.snapshots.score_filtered.n_rows(),
            report.snapshots.imputed.n_rows()
        );
    }

    #[test]
    fn row_filters_are_a_contract_violation() {
        let preparation = PreparationConfig::new(vec![0, 1])
            .coerce(vec![], vec![1])
            .min_score(1, 0.5);
        let engine =
            CorrelationAnalysis::new(CorrelationConfig::new(preparation, CorrelationMethod::Pearson));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let outcome = engine.run(&intensity_table(), &mut rng);
        assert!(matches!(
            outcome,
            AnalysisOutcome::Failed {
                source: AnalysisError::Config(_),
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_column_fails_with_the_offending_name() {
        let table = DataTable::new(vec![
            Column::from_text("name", &["p1", "p2"]),
            Column::new("s1", vec![Value::Text("oops".into()), Value::Number(1.0)]),
        ])
        .unwrap();
        let preparation = PreparationConfig::new(vec![0, 1]).coerce(vec![], vec![1]);
        let engine = CorrelationAnalysis::new(CorrelationConfig::new(
            preparation,
            CorrelationMethod::Pearson,
        ));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let outcome = engine.run(&table, &mut rng);
        let message = outcome.message().unwrap().to_string();
        assert!(message.contains("s1"), "message was: {}", message);
    }
}
