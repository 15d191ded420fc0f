// src/export.rs
use std::fs::{self, File};
use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::analysis::ranking::{composite_score, specificity_score, ScoreWeights};
use crate::error::Result;
use crate::helper_functions::round_to;
use crate::models::{Guide, Mismatches, Strand};
use crate::validation::GenomicRegion;

/// CSV columns, in output order.
pub const COLUMNS: [&str; 16] = [
    "rank",
    "guide_sequence",
    "pam_sequence",
    "full_sequence",
    "chromosome",
    "start",
    "end",
    "strand",
    "efficiency_score",
    "off_targets_0mm",
    "off_targets_1mm",
    "off_targets_2mm",
    "off_targets_3mm",
    "gc_content",
    "gene_name",
    "exon",
];

/// One exported row. Field order matches [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuideRecord {
    pub rank: usize,
    pub guide_sequence: String,
    pub pam_sequence: String,
    pub full_sequence: String,
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub efficiency_score: f64,
    pub off_targets_0mm: u32,
    pub off_targets_1mm: u32,
    pub off_targets_2mm: u32,
    pub off_targets_3mm: u32,
    pub gc_content: f64,
    pub gene_name: String,
    pub exon: Option<u32>,
}

impl GuideRecord {
    pub fn from_guide(guide: &Guide, rank: usize) -> Self {
        let counts = &guide.off_targets;
        GuideRecord {
            rank,
            guide_sequence: guide.sequence().to_string(),
            pam_sequence: guide.pam.clone(),
            full_sequence: guide.full_sequence(),
            chromosome: guide.chromosome.clone(),
            start: guide.start,
            end: guide.end,
            strand: guide.strand,
            efficiency_score: round_to(guide.efficiency_score, 1),
            off_targets_0mm: counts[Mismatches::Zero],
            off_targets_1mm: counts[Mismatches::One],
            off_targets_2mm: counts[Mismatches::Two],
            off_targets_3mm: counts[Mismatches::Three],
            gc_content: round_to(guide.gc_content(), 1),
            gene_name: guide.gene_name.clone().unwrap_or_default(),
            exon: guide.exon,
        }
    }
}

/// Ranked guides as export rows; ranks are positions, starting at 1.
pub fn to_records(guides: &[Guide]) -> Vec<GuideRecord> {
    guides
        .iter()
        .enumerate()
        .map(|(i, guide)| GuideRecord::from_guide(guide, i + 1))
        .collect()
}

/// Write a header and one row per guide. The header is written even when
/// `guides` is empty.
pub fn write_records<W: io::Write>(writer: W, guides: &[Guide]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for record in to_records(guides) {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save guides to `path`, creating parent directories as needed.
pub fn write_csv(path: &Path, guides: &[Guide]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    write_records(File::create(path)?, guides)?;
    info!("Wrote {} guides to {}", guides.len(), path.display());
    Ok(())
}

/// `<gene>_guides.csv`, `chr<N>_<start>_<end>_guides.csv` or `guides.csv`.
pub fn format_output_filename(gene: Option<&str>, region: Option<&GenomicRegion>) -> String {
    if let Some(gene) = gene.filter(|g| !g.is_empty()) {
        return format!("{}_guides.csv", gene.to_lowercase());
    }
    match region {
        Some(region) => format!(
            "chr{}_{}_{}_guides.csv",
            region.chromosome.replace("chr", ""),
            region.start,
            region.end
        ),
        None => "guides.csv".to_string(),
    }
}

//──────────────────────────────── terminal ─────────────────────────────────//

/// Multi-line description of a single guide, with specificity and the
/// composite score under `weights`.
pub fn guide_summary(guide: &Guide, rank: usize, weights: &ScoreWeights) -> String {
    let off_targets = Mismatches::ALL
        .iter()
        .map(|&mm| guide.off_targets[mm].to_string())
        .collect::<Vec<_>>()
        .join("/");
    let mut lines = vec![
        format!("Guide #{}", rank),
        format!("  Sequence:      {} ({})", guide.sequence(), guide.pam),
        format!(
            "  Location:      {}:{}-{} ({})",
            guide.chromosome,
            group_thousands(guide.start),
            group_thousands(guide.end),
            guide.strand
        ),
        format!("  Efficiency:    {:.1} / 100", guide.efficiency_score),
        format!("  Specificity:   {:.1} / 100", specificity_score(guide)),
        format!("  Composite:     {:.2}", composite_score(guide, weights)),
        format!("  Off-targets:   {} (0/1/2/3 MM)", off_targets),
        format!("  GC content:    {:.1}%", guide.gc_content()),
    ];
    if let Some(gene) = &guide.gene_name {
        lines.push(format!("  Gene:          {}", gene));
    }
    lines.join("\n")
}

/// One line per guide for the first `top_n` guides, off-targets as 1/2/3 MM.
pub fn summary_table(guides: &[Guide], top_n: usize, weights: &ScoreWeights) -> String {
    let rule = "-".repeat(80);
    let mut lines = vec!["Top Guides:".to_string(), rule.clone()];
    for (i, guide) in guides.iter().take(top_n).enumerate() {
        let counts = &guide.off_targets;
        lines.push(format!(
            "  #{}  {} ({})  Score: {:.1}  Composite: {:.2}  Off-targets: {}/{}/{}",
            i + 1,
            guide.sequence(),
            guide.pam,
            guide.efficiency_score,
            composite_score(guide, weights),
            counts[Mismatches::One],
            counts[Mismatches::Two],
            counts[Mismatches::Three]
        ));
    }
    lines.push(rule);
    lines.join("\n")
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
