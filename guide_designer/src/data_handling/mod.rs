pub mod fasta_sequence;
pub mod inline_sequence;

use crate::error::{DesignError, Result};

/// A stretch of genomic sequence anchored to 1-based coordinates.
///
/// This is the input contract of the design pipeline; how it was obtained
/// (FASTA file, remote lookup) is up to the [`SequenceSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceWindow {
    sequence: String,
    pub start_position: u64,
    pub chromosome: String,
    pub gene_name: Option<String>,
}

impl SequenceWindow {
    /// `start_position` is the 1-based coordinate of the first base; sources
    /// reject 0 before building a window.
    pub fn new(
        sequence: impl AsRef<str>,
        start_position: u64,
        chromosome: impl Into<String>,
        gene_name: Option<String>,
    ) -> Self {
        Self {
            sequence: sequence.as_ref().trim().to_ascii_uppercase(),
            start_position,
            chromosome: chromosome.into(),
            gene_name,
        }
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Coordinate of the last base.
    pub fn end_position(&self) -> u64 {
        self.start_position + (self.sequence.len() as u64).saturating_sub(1)
    }
}

/// Rejects a zero anchor; coordinates are 1-based.
pub(crate) fn check_anchor(chromosome: &str, start_position: u64) -> Result<()> {
    if start_position == 0 {
        return Err(DesignError::InvalidCoordinates(format!(
            "Start coordinate must be >= 1, got 0 for {}",
            chromosome
        )));
    }
    Ok(())
}

/// Anything that can hand the pipeline a sequence window.
pub trait SequenceSource {
    fn load(&self) -> Result<SequenceWindow>;
}
