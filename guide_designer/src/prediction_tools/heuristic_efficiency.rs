use tracing::{debug, info};

use crate::helper_functions::{gc_fraction, gc_percent, has_homopolymer, round_to, BASES};
use crate::models::Guide;

/// Rule-based on-target efficiency scoring.
///
/// The additive terms follow published SpCas9 design rules (GC balance,
/// G at PAM-proximal positions, seed composition, poly-T avoidance). It is
/// a stand-in for a trained model: anything implementing
/// [`EfficiencyModel`] can replace it without touching the scanner or the
/// ranker.
pub trait EfficiencyModel {
    /// Score a protospacer (no PAM) on a 0-100 scale.
    fn predict(&self, sequence: &str) -> f64;

    fn predict_batch(&self, guides: &mut [Guide]) {
        for guide in guides.iter_mut() {
            guide.efficiency_score = self.predict(guide.sequence());
        }
        info!("Scored on-target efficiency for {} guides", guides.len());
    }
}

const BASE_SCORE: f64 = 50.0;
const OPTIMAL_GC: f64 = 50.0;
const SEED_LENGTH: usize = 12;
const PAM_PROXIMAL_LENGTH: usize = 8;

/// Per-term contributions of the heuristic, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EfficiencyBreakdown {
    pub gc: f64,
    pub position: f64,
    pub seed: f64,
    pub pam_proximal: f64,
    pub homopolymer: f64,
    pub terminal_g: f64,
}

impl EfficiencyBreakdown {
    pub fn of(sequence: &str) -> Self {
        let seq = sequence.as_bytes();
        let seed = &seq[..seq.len().min(SEED_LENGTH)];
        let pam_proximal = &seq[seq.len().saturating_sub(PAM_PROXIMAL_LENGTH)..];

        EfficiencyBreakdown {
            gc: score_gc_content(gc_percent(seq)),
            position: score_position_preferences(seq),
            seed: score_seed_region(seed),
            pam_proximal: score_pam_proximal(pam_proximal),
            homopolymer: penalize_homopolymers(seq),
            terminal_g: terminal_g_bonus(seq),
        }
    }

    pub fn raw_total(&self) -> f64 {
        BASE_SCORE
            + self.gc
            + self.position
            + self.seed
            + self.pam_proximal
            + self.homopolymer
            + self.terminal_g
    }

    /// Clamped to [0, 100] and rounded to one decimal.
    pub fn score(&self) -> f64 {
        round_to(self.raw_total().clamp(0.0, 100.0), 1)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEfficiency;

impl EfficiencyModel for HeuristicEfficiency {
    fn predict(&self, sequence: &str) -> f64 {
        let breakdown = EfficiencyBreakdown::of(sequence);
        debug!("Efficiency breakdown for {}: {:?}", sequence, breakdown);
        breakdown.score()
    }
}

/// GC content term, peaking at 50%.
///
/// # Arguments
///
/// * `gc_content` - GC percentage (0-100)
///
/// # Returns
///
/// * `10 - deviation` within 10 points of optimal, a half-point penalty per
///   point beyond that
pub fn score_gc_content(gc_content: f64) -> f64 {
    let deviation = (gc_content - OPTIMAL_GC).abs();
    if deviation <= 10.0 {
        10.0 - deviation
    } else {
        -(deviation - 10.0) * 0.5
    }
}

/// G at positions 19 and 20, C at position 1 (1-indexed).
pub fn score_position_preferences(seq: &[u8]) -> f64 {
    let mut score = 0.0;
    if seq.get(18) == Some(&b'G') {
        score += 2.0;
    }
    if seq.get(19) == Some(&b'G') {
        score += 2.0;
    }
    if seq.first() == Some(&b'C') {
        score += 1.0;
    }
    score
}

pub fn score_seed_region(seed: &[u8]) -> f64 {
    if seed.is_empty() {
        return 0.0;
    }
    let ratio = gc_fraction(seed);
    let mut score = if (0.4..=0.6).contains(&ratio) { 3.0 } else { -2.0 };
    if has_homopolymer(seed, b'T', 3) {
        score -= 5.0;
    }
    score
}

pub fn score_pam_proximal(pam_proximal: &[u8]) -> f64 {
    if pam_proximal.is_empty() {
        return 0.0;
    }
    if gc_fraction(pam_proximal) >= 0.5 {
        2.0
    } else {
        -1.0
    }
}

/// Runs of 3, 4 and 5+ cost 2, 5 and 10 more each, for every base.
pub fn penalize_homopolymers(seq: &[u8]) -> f64 {
    let mut penalty = 0.0;
    for &base in &BASES {
        if has_homopolymer(seq, base, 3) {
            penalty -= 2.0;
        }
        if has_homopolymer(seq, base, 4) {
            penalty -= 5.0;
        }
        if has_homopolymer(seq, base, 5) {
            penalty -= 10.0;
        }
    }
    penalty
}

pub fn terminal_g_bonus(seq: &[u8]) -> f64 {
    if seq.get(19) == Some(&b'G') {
        2.0
    } else {
        0.0
    }
}
