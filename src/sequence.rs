//! Sequence-reference collaborator.
//!
//! The limited-proteolysis engine resolves each peptide to residue positions
//! within the protein under study. The reference protein always has a
//! recombinant sequence; a native sequence is optional and, when defined,
//! contributes a second pair of terminus columns to the result table.

use serde::{Deserialize, Serialize};

/// Residue span of a peptide within a protein sequence (1-based, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeptideLocation {
    /// First residue number of the peptide.
    pub start: usize,
    /// Last residue number of the peptide.
    pub end: usize,
}

/// Sequence lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// A native-sequence lookup was requested but no native sequence is
    /// defined for this protein.
    #[error("no native sequence defined")]
    NoNativeSequence,
}

/// Resolves peptides to residue positions.
pub trait SequenceReference {
    /// Locate `peptide` in the recombinant (`use_recombinant = true`) or
    /// native sequence. Returns `None` when the peptide does not occur.
    ///
    /// # Errors
    ///
    /// [`SequenceError::NoNativeSequence`] when `use_recombinant = false`
    /// and no native sequence is defined.
    fn find_peptide_location(
        &self,
        peptide: &str,
        use_recombinant: bool,
    ) -> Result<Option<PeptideLocation>, SequenceError>;

    /// Whether a native sequence is defined.
    fn has_native(&self) -> bool;
}

/// Plain in-memory sequence pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProteinSequences {
    recombinant: String,
    native: Option<String>,
}

impl ProteinSequences {
    /// Protein with only a recombinant sequence.
    pub fn recombinant(sequence: impl Into<String>) -> Self {
        Self {
            recombinant: sequence.into(),
            native: None,
        }
    }

    /// Protein with both a recombinant and a native sequence.
    pub fn with_native(sequence: impl Into<String>, native: impl Into<String>) -> Self {
        Self {
            recombinant: sequence.into(),
            native: Some(native.into()),
        }
    }
}

fn locate(haystack: &str, peptide: &str) -> Option<PeptideLocation> {
    if peptide.is_empty() {
        return None;
    }
    haystack.find(peptide).map(|pos| PeptideLocation {
        start: pos + 1,
        end: pos + peptide.len(),
    })
}

impl SequenceReference for ProteinSequences {
    fn find_peptide_location(
        &self,
        peptide: &str,
        use_recombinant: bool,
    ) -> Result<Option<PeptideLocation>, SequenceError> {
        if use_recombinant {
            Ok(locate(&self.recombinant, peptide))
        } else {
            let native = self.native.as_deref().ok_or(SequenceError::NoNativeSequence)?;
            Ok(locate(native, peptide))
        }
    }

    fn has_native(&self) -> bool {
        self.native.is_some()
    }
}
