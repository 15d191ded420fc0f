//! Input checks that run before any sequence is scanned.

use regex::Regex;

use crate::error::{DesignError, Result};

pub const MIN_TOP_N: usize = 1;
pub const MAX_TOP_N: usize = 100;
/// Largest region accepted for guide design, in bp.
pub const MAX_REGION_SPAN: u64 = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub genome_assembly: &'static str,
    pub ensembl_name: &'static str,
}

pub const SUPPORTED_SPECIES: [SpeciesInfo; 2] = [
    SpeciesInfo {
        key: "human",
        name: "Homo sapiens",
        genome_assembly: "GRCh38",
        ensembl_name: "homo_sapiens",
    },
    SpeciesInfo {
        key: "mouse",
        name: "Mus musculus",
        genome_assembly: "GRCm39",
        ensembl_name: "mus_musculus",
    },
];

pub fn validate_species(species: &str) -> Result<SpeciesInfo> {
    let wanted = species.trim().to_lowercase();
    SUPPORTED_SPECIES
        .iter()
        .find(|info| info.key == wanted)
        .copied()
        .ok_or_else(|| DesignError::InvalidSpecies {
            species: species.to_string(),
            supported: SUPPORTED_SPECIES
                .iter()
                .map(|info| info.key)
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Trimmed, upper-cased gene symbol made of letters, digits and hyphens.
pub fn validate_gene_symbol(gene: &str) -> Result<String> {
    let gene = gene.trim().to_uppercase();
    if gene.is_empty() {
        return Err(DesignError::InvalidInput(
            "Gene symbol must be a non-empty string".to_string(),
        ));
    }

    let pattern = Regex::new(r"^[A-Z0-9][-A-Z0-9]*$").map_err(|e| DesignError::Config(e.to_string()))?;
    if !pattern.is_match(&gene) {
        return Err(DesignError::InvalidInput(format!(
            "Invalid gene symbol format: '{}'. Gene symbols should contain only letters, numbers, and hyphens.",
            gene
        )));
    }
    Ok(gene)
}

/// A parsed `chr:start-end` region, 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicRegion {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
}

impl GenomicRegion {
    /// Number of bases covered, both ends included.
    pub fn span(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Parse `chr17:7661779-7687550` or `17:7661779..7687550`.
///
/// A missing `chr` prefix is added.
pub fn parse_genomic_coordinates(region: &str) -> Result<GenomicRegion> {
    let region = region.trim();
    if region.is_empty() {
        return Err(DesignError::InvalidCoordinates(
            "Genomic region must be a non-empty string".to_string(),
        ));
    }

    let pattern = Regex::new(r"^([a-zA-Z0-9]+):(\d+)(?:-|\.\.)(\d+)$")
        .map_err(|e| DesignError::Config(e.to_string()))?;
    let captures = pattern.captures(region).ok_or_else(|| {
        DesignError::InvalidCoordinates(format!(
            "Invalid coordinate format: '{}'. Expected format: 'chr:start-end' (e.g., 'chr17:7661779-7687550')",
            region
        ))
    })?;

    let mut chromosome = captures[1].to_string();
    if !chromosome.to_lowercase().starts_with("chr") {
        chromosome = format!("chr{}", chromosome);
    }

    let parse = |text: &str| {
        text.parse::<u64>().map_err(|_| {
            DesignError::InvalidCoordinates(format!("Coordinate out of range: {}", text))
        })
    };
    let start = parse(&captures[2])?;
    let end = parse(&captures[3])?;

    if start < 1 {
        return Err(DesignError::InvalidCoordinates(format!(
            "Start coordinate must be >= 1, got {}",
            start
        )));
    }
    if end < start {
        return Err(DesignError::InvalidCoordinates(format!(
            "End coordinate ({}) must be >= start coordinate ({})",
            end, start
        )));
    }
    if end - start > MAX_REGION_SPAN {
        return Err(DesignError::InvalidCoordinates(format!(
            "Region too large: {} bp. Maximum region size is 10 Mb for guide design.",
            end - start
        )));
    }

    Ok(GenomicRegion {
        chromosome,
        start,
        end,
    })
}

pub fn validate_top_n(top_n: usize) -> Result<usize> {
    if top_n < MIN_TOP_N {
        return Err(DesignError::InvalidInput(format!(
            "top_n must be >= {}, got {}",
            MIN_TOP_N, top_n
        )));
    }
    if top_n > MAX_TOP_N {
        return Err(DesignError::InvalidInput(format!(
            "top_n must be <= {}, got {}. For more guides, consider multiple design runs.",
            MAX_TOP_N, top_n
        )));
    }
    Ok(top_n)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignTarget {
    Gene(String),
    Region(GenomicRegion),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInputs {
    pub target: DesignTarget,
    pub species: SpeciesInfo,
    pub top_n: usize,
}

/// Exactly one of `gene` and `region` must be given.
pub fn validate_design_inputs(
    gene: Option<&str>,
    region: Option<&str>,
    species: &str,
    top_n: usize,
) -> Result<ValidatedInputs> {
    let target = match (gene, region) {
        (None, None) => {
            return Err(DesignError::InvalidInput(
                "Must specify either a gene or a region".to_string(),
            ))
        }
        (Some(_), Some(_)) => {
            return Err(DesignError::InvalidInput(
                "Cannot specify both a gene and a region. Choose one.".to_string(),
            ))
        }
        (Some(gene), None) => DesignTarget::Gene(validate_gene_symbol(gene)?),
        (None, Some(region)) => DesignTarget::Region(parse_genomic_coordinates(region)?),
    };

    Ok(ValidatedInputs {
        target,
        species: validate_species(species)?,
        top_n: validate_top_n(top_n)?,
    })
}
