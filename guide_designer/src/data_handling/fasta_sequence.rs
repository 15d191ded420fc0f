// src/data_handling/fasta_sequence.rs
use std::fs::File;
use std::path::PathBuf;

use bio::io::fasta;
use tracing::{info, warn};

use crate::data_handling::{check_anchor, SequenceSource, SequenceWindow};
use crate::error::{DesignError, Result};
use crate::helper_functions::resolve_path;
use crate::validation::{parse_genomic_coordinates, GenomicRegion};

/// The first record of a FASTA file, anchored to genomic coordinates.
///
/// The anchor comes from, in order:
/// 1. `region`, when given;
/// 2. a record id of the form `chr:start-end`;
/// 3. the record id as chromosome, starting at 1.
///
/// `chromosome` and `start` override whatever was derived above.
pub struct FastaSequence {
    pub path: PathBuf,
    pub region: Option<GenomicRegion>,
    pub chromosome: Option<String>,
    pub start: Option<u64>,
    pub gene_name: Option<String>,
}

impl FastaSequence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            region: None,
            chromosome: None,
            start: None,
            gene_name: None,
        }
    }

    pub fn with_region(mut self, region: GenomicRegion) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_anchor(mut self, chromosome: Option<String>, start: Option<u64>) -> Self {
        self.chromosome = chromosome;
        self.start = start;
        self
    }

    pub fn with_gene_name(mut self, gene_name: Option<String>) -> Self {
        self.gene_name = gene_name;
        self
    }

    fn anchor_for(&self, record_id: &str) -> (String, u64) {
        let (chromosome, start) = match &self.region {
            Some(region) => (region.chromosome.clone(), region.start),
            None => match parse_genomic_coordinates(record_id) {
                Ok(region) => (region.chromosome, region.start),
                Err(_) => (record_id.to_string(), 1),
            },
        };
        (
            self.chromosome.clone().unwrap_or(chromosome),
            self.start.unwrap_or(start),
        )
    }
}

impl SequenceSource for FastaSequence {
    fn load(&self) -> Result<SequenceWindow> {
        let path = resolve_path(&self.path);
        info!("Loading sequence from {}", path.display());

        let reader = fasta::Reader::new(File::open(&path)?);
        let record = match reader.records().next() {
            Some(record) => record?,
            None => {
                return Err(DesignError::EmptySequence(format!(
                    "no FASTA records in {}",
                    path.display()
                )))
            }
        };

        let sequence = String::from_utf8_lossy(record.seq());
        let (chromosome, start) = self.anchor_for(record.id());
        check_anchor(&chromosome, start)?;
        let window = SequenceWindow::new(sequence, start, chromosome, self.gene_name.clone());
        if window.is_empty() {
            return Err(DesignError::EmptySequence(format!(
                "record '{}' in {} has no bases",
                record.id(),
                path.display()
            )));
        }

        if let Some(region) = &self.region {
            if region.span() != window.len() as u64 {
                warn!(
                    "Region {}:{}-{} spans {} bp but record '{}' holds {} bp",
                    region.chromosome,
                    region.start,
                    region.end,
                    region.span(),
                    record.id(),
                    window.len()
                );
            }
        }

        info!(
            "Loaded {} bp anchored at {}:{}",
            window.len(),
            window.chromosome,
            window.start_position
        );
        Ok(window)
    }
}
