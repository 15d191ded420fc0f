// src/models.rs

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::helper_functions::{gc_percent, has_any_homopolymer, has_homopolymer};

/// Default protospacer length for SpCas9.
pub const DEFAULT_GUIDE_LENGTH: usize = 20;

/// Every supported PAM is three symbols long.
pub const PAM_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    pub fn as_char(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Closed mismatch domain of the off-target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mismatches {
    Zero,
    One,
    Two,
    Three,
}

impl Mismatches {
    pub const ALL: [Mismatches; 4] = [
        Mismatches::Zero,
        Mismatches::One,
        Mismatches::Two,
        Mismatches::Three,
    ];

    pub const fn to_index(self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Zero),
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }
}

/// Off-target counts indexed by mismatch count 0..=3.
///
/// Index 0 is the guide's own target site: it stays 0 until an estimator
/// has run and is 1 afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OffTargetCounts([u32; 4]);

impl OffTargetCounts {
    pub const fn new(mm0: u32, mm1: u32, mm2: u32, mm3: u32) -> Self {
        Self([mm0, mm1, mm2, mm3])
    }

    pub fn get(&self, mismatches: Mismatches) -> u32 {
        self.0[mismatches.to_index()]
    }

    /// Combined 0/1/2-mismatch hits, the secondary ranking key.
    pub fn critical(&self) -> u32 {
        self.0[0] + self.0[1] + self.0[2]
    }

    pub fn as_array(&self) -> [u32; 4] {
        self.0
    }
}

impl Index<Mismatches> for OffTargetCounts {
    type Output = u32;

    fn index(&self, mismatches: Mismatches) -> &u32 {
        &self.0[mismatches.to_index()]
    }
}

impl IndexMut<Mismatches> for OffTargetCounts {
    fn index_mut(&mut self, mismatches: Mismatches) -> &mut u32 {
        &mut self.0[mismatches.to_index()]
    }
}

/// Thresholds a guide must satisfy to be kept by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityFilter {
    pub min_gc: f64,
    pub max_gc: f64,
    /// Runs of this length or longer of any base are rejected.
    pub max_homopolymer: usize,
    /// Poly-T runs of this length terminate Pol III transcription.
    pub poly_t_run: usize,
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self {
            min_gc: 40.0,
            max_gc: 60.0,
            max_homopolymer: 4,
            poly_t_run: 4,
        }
    }
}

/// One sgRNA candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Guide {
    sequence: String,
    pub pam: String,
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub efficiency_score: f64,
    pub off_targets: OffTargetCounts,
    gc_content: f64,
    pub gene_name: Option<String>,
    pub exon: Option<u32>,
}

impl Guide {
    pub fn new(
        sequence: impl Into<String>,
        pam: impl Into<String>,
        chromosome: impl Into<String>,
        start: u64,
        end: u64,
        strand: Strand,
    ) -> Self {
        let mut guide = Guide {
            sequence: sequence.into(),
            pam: pam.into(),
            chromosome: chromosome.into(),
            start,
            end,
            strand,
            efficiency_score: 0.0,
            off_targets: OffTargetCounts::default(),
            gc_content: 0.0,
            gene_name: None,
            exon: None,
        };
        guide.calculate_gc_content();
        guide
    }

    pub fn with_gene_name(mut self, gene_name: Option<String>) -> Self {
        self.gene_name = gene_name;
        self
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Replace the protospacer; GC content follows.
    pub fn set_sequence(&mut self, sequence: impl Into<String>) {
        self.sequence = sequence.into();
        self.calculate_gc_content();
    }

    pub fn gc_content(&self) -> f64 {
        self.gc_content
    }

    /// Protospacer followed by its PAM, as ordered from a synthesis vendor.
    pub fn full_sequence(&self) -> String {
        format!("{}{}", self.sequence, self.pam)
    }

    /// Recompute GC percentage from the current sequence and return it.
    pub fn calculate_gc_content(&mut self) -> f64 {
        self.gc_content = gc_percent(self.sequence.as_bytes());
        self.gc_content
    }

    pub fn passes_quality_filters(&self, filter: &QualityFilter) -> bool {
        if self.gc_content < filter.min_gc || self.gc_content > filter.max_gc {
            return false;
        }

        let seq = self.sequence.as_bytes();
        if has_any_homopolymer(seq, filter.max_homopolymer) {
            return false;
        }

        !has_homopolymer(seq, b'T', filter.poly_t_run)
    }
}
