//! # protquant
//!
//! Statistical analysis engines for quantitative proteomics experiments.
//!
//! This crate turns raw per-sample intensity tables into calibrated,
//! testable per-feature results for three analysis modes:
//!
//! - **Correlation**: pairwise sample-correlation matrix of the prepared
//!   intensity columns.
//! - **Limited proteolysis**: equivalence testing (TOST with a
//!   bias-corrected margin) of peptides across a Band × Lane gel grid.
//! - **Proteome profiling**: differential statistics (fold-changes,
//!   confidence intervals, corrected p-values) across a Condition ×
//!   RelevantPoint grid.
//!
//! All three run the same data-preparation pipeline first: float coercion,
//! an optional log2 transform, median normalization, missing-value
//! imputation from a down-shifted normal distribution, and row filters.
//! Every stage returns a new snapshot, retained for the whole run so the
//! calling layer can persist the full audit trail.
//!
//! ## Outcomes instead of errors
//!
//! Public entry points return [`AnalysisOutcome`]: a completed report, an
//! empty outcome with a fixed message ("no data left after filtering",
//! "no significant cleavage detected"), or a failure wrapping the
//! underlying [`AnalysisError`]. Configuration mistakes are contract
//! violations: builder methods panic on out-of-range rates and `validate()`
//! rejects malformed column maps before any stage runs.
//!
//! ## Reproducibility
//!
//! Nothing in the crate creates ambient randomness. The imputation stage
//! draws from a caller-supplied [`rand::Rng`]; hand each run its own seeded
//! generator and the whole analysis is reproducible:
//!
//! ```
//! use protquant::{
//!     CorrelationAnalysis, CorrelationConfig, CorrelationMethod, Column, DataTable,
//!     Normalization, PreparationConfig,
//! };
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//!
//! let table = DataTable::new(vec![
//!     Column::from_text("name", &["p1", "p2", "p3"]),
//!     Column::from_floats("s1", &[1.0, 2.0, 3.0]),
//!     Column::from_floats("s2", &[2.0, 4.0, 6.0]),
//! ])
//! .unwrap();
//!
//! let preparation = PreparationConfig::new(vec![0, 1, 2])
//!     .coerce(vec![], vec![1, 2])
//!     .normalize(Normalization::Median, vec![1, 2]);
//! let engine = CorrelationAnalysis::new(CorrelationConfig::new(
//!     preparation,
//!     CorrelationMethod::Pearson,
//! ));
//!
//! let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
//! let report = engine.run(&table, &mut rng).expect_completed();
//! assert_eq!(report.matrix.nrows(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engines;
pub mod outcome;
pub mod pipeline;
pub mod result_table;
pub mod sequence;
pub mod stats;
pub mod table;

// Re-exports for the public API surface.
pub use config::{
    ColumnSelection, Imputation, Normalization, PreparationConfig, SampleRelation, ScoreFilter,
    TargetFilter, Transform,
};
pub use engines::{
    ControlColumns, CorrelationAnalysis, CorrelationConfig, CorrelationReport,
    LimitedProteolysisAnalysis, ProfilingConfig, ProfilingReport, ProteolysisConfig,
    ProteolysisReport, ProteomeProfilingAnalysis,
};
pub use outcome::{AnalysisError, AnalysisOutcome, NO_CLEAVAGE_MESSAGE, NO_DATA_MESSAGE};
pub use pipeline::{PipelineOutcome, Stage, StageSnapshots};
pub use result_table::{ResultTable, Statistic, StatisticBlock};
pub use sequence::{PeptideLocation, ProteinSequences, SequenceError, SequenceReference};
pub use stats::{CorrectionMethod, CorrelationMethod, EquivalenceParams, StatsError};
pub use table::{Column, DataTable, TableError, Value};
