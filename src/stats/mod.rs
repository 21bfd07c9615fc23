//! Statistical primitives for the analysis engines.
//!
//! Pure, side-effect-free functions over `f64` slices. Missing values are
//! NaN and are excluded from every count-based statistic; the functions do
//! not fail on missing data, only on genuinely malformed input (an empty
//! range request).

mod chi_square;
mod correction;
mod correlation;
mod describe;
mod equivalence;
mod interval;
mod regression;
mod ttest;

pub use chi_square::{chi_square_homogeneity, ChiSquareClassification, ChiSquareResult};
pub use correction::{adjust_p_values, CorrectionMethod};
pub use correlation::{correlation_matrix, CorrelationMethod};
pub use describe::{data_range, nan_count, nan_mean, nan_median, nan_std};
pub use equivalence::{equivalence_delta, EquivalenceParams};
pub use interval::{mean_difference_ci, one_sample_ci, CiEstimate};
pub use regression::{regression_slope_homogeneity, RegressionPair};
pub use ttest::{t_test_independent, t_test_one_sample, t_test_paired, TTest, Tail};

/// Errors raised by the numeric primitives.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// A value range was requested over an input with no usable entries.
    #[error("cannot compute a range over empty input")]
    EmptyInput,
}
