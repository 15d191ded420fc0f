//! PAM scanning on both strands and construction of guide candidates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DesignError, Result};
use crate::helper_functions::{is_acgt, reverse_complement};
use crate::models::{Guide, QualityFilter, Strand, DEFAULT_GUIDE_LENGTH, PAM_LENGTH};

/// A three-symbol PAM written in IUPAC notation, e.g. `NGG`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PamRule {
    pattern: [u8; PAM_LENGTH],
}

impl PamRule {
    pub fn new(pattern: &str) -> Result<Self> {
        let upper = pattern.trim().to_ascii_uppercase();
        let bytes = upper.as_bytes();
        if bytes.len() != PAM_LENGTH || !bytes.iter().all(|&b| iupac_bases(b).is_some()) {
            return Err(DesignError::InvalidPam(pattern.to_string()));
        }
        Ok(Self {
            pattern: [bytes[0], bytes[1], bytes[2]],
        })
    }

    /// SpCas9 canonical `NGG`.
    pub fn spcas9() -> Self {
        Self { pattern: *b"NGG" }
    }

    pub fn for_enzyme(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "spcas9" => Some(Self::spcas9()),
            "spcas9-nag" => Some(Self { pattern: *b"NAG" }),
            _ => None,
        }
    }

    pub fn pattern(&self) -> &str {
        // Only ASCII IUPAC codes are ever stored.
        std::str::from_utf8(&self.pattern).unwrap_or("NGG")
    }

    /// True if the three symbols at the start of `window` satisfy the rule.
    pub fn matches(&self, window: &[u8]) -> bool {
        window.len() >= PAM_LENGTH
            && self
                .pattern
                .iter()
                .zip(window)
                .all(|(&code, &base)| iupac_bases(code).is_some_and(|set| set.contains(&base)))
    }
}

impl Default for PamRule {
    fn default() -> Self {
        Self::spcas9()
    }
}

impl TryFrom<String> for PamRule {
    type Error = DesignError;

    /// Accepts an enzyme preset name or a raw IUPAC pattern.
    fn try_from(value: String) -> Result<Self> {
        match PamRule::for_enzyme(value.trim()) {
            Some(rule) => Ok(rule),
            None => PamRule::new(&value),
        }
    }
}

impl From<PamRule> for String {
    fn from(rule: PamRule) -> String {
        rule.pattern().to_string()
    }
}

fn iupac_bases(code: u8) -> Option<&'static [u8]> {
    let bases: &'static [u8] = match code {
        b'A' => b"A",
        b'C' => b"C",
        b'G' => b"G",
        b'T' => b"T",
        b'R' => b"AG",
        b'Y' => b"CT",
        b'S' => b"CG",
        b'W' => b"AT",
        b'K' => b"GT",
        b'M' => b"AC",
        b'B' => b"CGT",
        b'D' => b"AGT",
        b'H' => b"ACT",
        b'V' => b"ACG",
        b'N' => b"ACGT",
        _ => return None,
    };
    Some(bases)
}

/// Scanner parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub guide_length: usize,
    pub pam: PamRule,
    /// `None` keeps every well-formed candidate.
    pub filter: Option<QualityFilter>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            guide_length: DEFAULT_GUIDE_LENGTH,
            pam: PamRule::default(),
            filter: Some(QualityFilter::default()),
        }
    }
}

/// 0-based offsets of every PAM hit in `sequence`, overlapping hits included.
pub fn find_pam_sites(sequence: &[u8], pam: &PamRule) -> Vec<usize> {
    if sequence.len() < PAM_LENGTH {
        return Vec::new();
    }
    (0..=sequence.len() - PAM_LENGTH)
        .filter(|&i| pam.matches(&sequence[i..]))
        .collect()
}

/// Protospacer immediately 5' of a PAM at `pam_position`.
///
/// Returns `None` when there is not enough upstream sequence or the window
/// contains anything other than A, C, G or T.
pub fn extract_guide_window(sequence: &[u8], pam_position: usize, guide_length: usize) -> Option<&[u8]> {
    let start = pam_position.checked_sub(guide_length)?;
    let window = sequence.get(start..pam_position)?;
    if window.len() != guide_length || !is_acgt(window) {
        return None;
    }
    Some(window)
}

/// Scan both strands of `sequence` and return guide candidates.
///
/// `start_position` is the 1-based genomic coordinate of `sequence[0]`.
/// Forward-strand guides come first, each strand in scan order.
pub fn extract_guides(
    sequence: &str,
    chromosome: &str,
    start_position: u64,
    gene_name: Option<&str>,
    options: &ScanOptions,
) -> Vec<Guide> {
    let sequence = sequence.to_ascii_uppercase();
    let seq = sequence.as_bytes();
    let guide_length = options.guide_length;
    let mut guides = Vec::new();
    let mut rejected = 0usize;

    let mut keep = |guide: Guide, guides: &mut Vec<Guide>| {
        let guide = guide.with_gene_name(gene_name.map(str::to_string));
        match &options.filter {
            Some(filter) if !guide.passes_quality_filters(filter) => rejected += 1,
            _ => guides.push(guide),
        }
    };

    for pam_pos in find_pam_sites(seq, &options.pam) {
        let Some(window) = extract_guide_window(seq, pam_pos, guide_length) else {
            continue;
        };
        let offset = pam_pos as u64;
        let guide = Guide::new(
            String::from_utf8_lossy(window),
            String::from_utf8_lossy(&seq[pam_pos..pam_pos + PAM_LENGTH]),
            chromosome,
            start_position + offset - guide_length as u64,
            start_position + offset - 1,
            Strand::Forward,
        );
        keep(guide, &mut guides);
    }

    let rev_comp = reverse_complement(seq);
    for rc_pos in find_pam_sites(&rev_comp, &options.pam) {
        let Some(window) = extract_guide_window(&rev_comp, rc_pos, guide_length) else {
            continue;
        };
        // PAM position translated back onto the forward strand
        let forward_pos = (seq.len() - rc_pos - PAM_LENGTH) as u64;
        let guide = Guide::new(
            String::from_utf8_lossy(window),
            String::from_utf8_lossy(&rev_comp[rc_pos..rc_pos + PAM_LENGTH]),
            chromosome,
            start_position + forward_pos + 4,
            start_position + forward_pos + 3 + guide_length as u64,
            Strand::Reverse,
        );
        keep(guide, &mut guides);
    }

    debug!(
        "Scanned {} bp on {}: {} guides kept, {} rejected by quality filters",
        seq.len(),
        chromosome,
        guides.len(),
        rejected
    );
    guides
}

/// Re-apply a quality filter to an existing batch.
pub fn filter_guides_by_quality(guides: Vec<Guide>, filter: &QualityFilter) -> Vec<Guide> {
    guides
        .into_iter()
        .filter(|guide| guide.passes_quality_filters(filter))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unfiltered() -> ScanOptions {
        ScanOptions {
            filter: None,
            ..ScanOptions::default()
        }
    }

    #[test]
    fn pam_sites_end_in_gg() {
        let sequence = b"ATCGATCGAGGTAGGTCGGATCGATCG";
        let sites = find_pam_sites(sequence, &PamRule::spcas9());
        assert_eq!(sites, vec![8, 12, 16]);
        for pos in sites {
            assert_eq!(&sequence[pos + 1..pos + 3], b"GG");
        }
    }

    #[test]
    fn overlapping_pam_sites_are_all_reported() {
        assert_eq!(find_pam_sites(b"AGGGG", &PamRule::spcas9()), vec![0, 1, 2]);
    }

    #[test]
    fn pam_rule_rejects_malformed_patterns() {
        assert!(PamRule::new("NG").is_err());
        assert!(PamRule::new("NGX").is_err());
        assert_eq!(PamRule::new("nag").unwrap().pattern(), "NAG");
        assert!(PamRule::new("NRG").unwrap().matches(b"TAG"));
        assert!(!PamRule::spcas9().matches(b"NGG"));
    }

    #[test]
    fn enzyme_presets_resolve_by_name() {
        assert_eq!(PamRule::try_from("SpCas9".to_string()).unwrap(), PamRule::spcas9());
        assert_eq!(PamRule::try_from("spcas9-nag".to_string()).unwrap().pattern(), "NAG");
        assert_eq!(PamRule::try_from("NGA".to_string()).unwrap().pattern(), "NGA");
        assert!(PamRule::for_enzyme("cas12a").is_none());
    }

    #[test]
    fn guide_window_requires_full_upstream_flank() {
        let sequence = b"AAAAAAAAAAAAAAAAAAAATGGCCCCCCCCCC";
        assert_eq!(extract_guide_window(sequence, 20, 20), Some(&b"AAAAAAAAAAAAAAAAAAAA"[..]));
        assert_eq!(extract_guide_window(sequence, 19, 20), None);
        assert_eq!(extract_guide_window(b"AAAANAAAAAAAAAAAAAAATGG", 20, 20), None);
    }

    #[test]
    fn single_forward_guide_with_exact_coordinates() {
        let sequence = format!("{}TGG{}", "A".repeat(20), "C".repeat(10));
        let guides = extract_guides(&sequence, "chr1", 1, None, &unfiltered());

        assert_eq!(guides.len(), 1);
        let guide = &guides[0];
        assert_eq!(guide.sequence(), "A".repeat(20));
        assert_eq!(guide.pam, "TGG");
        assert_eq!(guide.start, 1);
        assert_eq!(guide.end, 20);
        assert_eq!(guide.strand, Strand::Forward);
        assert_eq!(guide.chromosome, "chr1");
    }

    #[test]
    fn reverse_strand_guide_uses_complement_window_and_offsets() {
        // Reverse complement is "A"*20 + "TGG" + "C"*10, so the only hit is on '-'.
        let sequence = format!("{}CCA{}", "G".repeat(10), "T".repeat(20));
        let guides = extract_guides(&sequence, "chr2", 100, Some("TEST"), &unfiltered());

        let reverse: Vec<&Guide> = guides.iter().filter(|g| g.strand == Strand::Reverse).collect();
        assert_eq!(reverse.len(), 1);
        let guide = reverse[0];
        assert_eq!(guide.sequence(), "A".repeat(20));
        assert_eq!(guide.pam, "TGG");
        // PAM at 20 on the complement, 33 - 20 - 3 = 10 on the forward strand
        assert_eq!(guide.start, 100 + 10 + 4);
        assert_eq!(guide.end, 100 + 10 + 3 + 20);
        assert_eq!(guide.gene_name.as_deref(), Some("TEST"));
    }

    #[test]
    fn lowercase_input_is_upper_cased() {
        let sequence = format!("{}tgg", "a".repeat(20));
        let guides = extract_guides(&sequence, "chr1", 1, None, &unfiltered());
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].full_sequence(), format!("{}TGG", "A".repeat(20)));
    }

    #[test]
    fn short_or_motif_free_input_yields_nothing() {
        assert!(extract_guides("ACGTAGG", "chr1", 1, None, &unfiltered()).is_empty());
        assert!(extract_guides("", "chr1", 1, None, &unfiltered()).is_empty());
        assert!(extract_guides(&"AC".repeat(30), "chr1", 1, None, &unfiltered()).is_empty());
    }

    #[test]
    fn every_guide_has_guide_length_and_three_symbol_pam() {
        let sequence = "ACGTACGTACGTACGTACGTAGGCCCGGGAAATTTGGGACGTTGACCTGAGGCTAGCCATGGAC";
        let guides = extract_guides(sequence, "chr1", 1, None, &unfiltered());
        assert!(!guides.is_empty());
        for guide in &guides {
            assert_eq!(guide.sequence().len(), 20);
            assert_eq!(guide.pam.len(), 3);
            assert_eq!(guide.full_sequence(), format!("{}{}", guide.sequence(), guide.pam));
            assert_eq!(guide.end - guide.start, 19);
        }
    }

    #[test]
    fn quality_filter_drops_failing_candidates() {
        let sequence = format!("{}TGG{}", "A".repeat(20), "C".repeat(10));
        let guides = extract_guides(&sequence, "chr1", 1, None, &ScanOptions::default());
        assert!(guides.is_empty());

        let kept = filter_guides_by_quality(
            extract_guides(&sequence, "chr1", 1, None, &unfiltered()),
            &QualityFilter::default(),
        );
        assert!(kept.is_empty());
    }

    #[test]
    fn custom_guide_length_shifts_coordinates() {
        let sequence = format!("{}AGG", "ACGT".repeat(5));
        let options = ScanOptions {
            guide_length: 17,
            ..unfiltered()
        };
        let guides = extract_guides(&sequence, "chr1", 50, None, &options);
        let forward: Vec<&Guide> = guides.iter().filter(|g| g.strand == Strand::Forward).collect();
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].sequence(), &sequence[3..20]);
        assert_eq!(forward[0].start, 50 + 20 - 17);
        assert_eq!(forward[0].end, 50 + 20 - 1);
    }
}
