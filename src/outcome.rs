//! Uniform outcome contract for analysis entry points.
//!
//! Every public engine returns an [`AnalysisOutcome`]: completed with a
//! result, empty with a fixed user-facing message, or failed with a message
//! and the underlying error. Ordinary analysis failure therefore never
//! requires error matching by the caller; only contract violations (invalid
//! configuration caught by builder assertions) panic.

use crate::sequence::SequenceError;
use crate::stats::StatsError;
use crate::table::TableError;

/// Fixed message for the empty-after-filtering outcome.
pub const NO_DATA_MESSAGE: &str = "no data left after filtering";

/// Fixed message for the limited-proteolysis no-detection outcome.
pub const NO_CLEAVAGE_MESSAGE: &str = "no significant cleavage detected";

/// Errors surfaced through [`AnalysisOutcome::Failed`].
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Input table shape or cell-type problem, reported with the offending
    /// column.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A preparation stage failed.
    #[error("pipeline stage '{stage}' failed: {source}")]
    Stage {
        /// Name of the failing stage.
        stage: &'static str,
        /// Underlying table error.
        source: TableError,
    },

    /// A statistic could not be computed for one comparison cell. The whole
    /// run aborts with the offending group's label.
    #[error("statistics failed for group {group}/{subgroup}: {detail}")]
    Group {
        /// Group label (band or condition).
        group: String,
        /// Subgroup label (lane or relevant point).
        subgroup: String,
        /// What went wrong.
        detail: String,
    },

    /// The correlation matrix could not be computed.
    #[error("correlation computation failed: {0}")]
    Correlation(String),

    /// Configuration rejected by pre-run validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Sequence-reference lookup failure.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// Numeric primitive failure.
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// Result of one analysis run.
#[derive(Debug)]
pub enum AnalysisOutcome<T> {
    /// The run finished and produced a result.
    Completed(T),
    /// The run finished without a result (no data left, nothing detected).
    /// Not an error: the message is one of the fixed sentinel messages.
    Empty {
        /// User-facing explanation.
        message: String,
    },
    /// The run aborted.
    Failed {
        /// User-facing explanation (derived from `source`).
        message: String,
        /// Underlying error.
        source: AnalysisError,
    },
}

impl<T> AnalysisOutcome<T> {
    /// Wrap an error into the failed outcome, deriving the message.
    pub fn failed(source: AnalysisError) -> Self {
        Self::Failed {
            message: source.to_string(),
            source,
        }
    }

    /// Empty outcome with the given sentinel message.
    pub fn empty(message: impl Into<String>) -> Self {
        Self::Empty {
            message: message.into(),
        }
    }

    /// Whether the run produced a result.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The message attached to an empty or failed outcome.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Empty { message } => Some(message),
            Self::Failed { message, .. } => Some(message),
        }
    }

    /// The result, discarding empty/failed outcomes.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// The result, panicking with the outcome's message otherwise.
    /// Intended for tests and examples.
    pub fn expect_completed(self) -> T {
        match self {
            Self::Completed(value) => value,
            Self::Empty { message } => panic!("analysis returned empty outcome: {}", message),
            Self::Failed { message, .. } => panic!("analysis failed: {}", message),
        }
    }
}

impl<T> From<AnalysisError> for AnalysisOutcome<T> {
    fn from(source: AnalysisError) -> Self {
        Self::failed(source)
    }
}
