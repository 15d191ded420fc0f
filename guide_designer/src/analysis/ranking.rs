use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::helper_functions::round_to;
use crate::models::{Guide, Mismatches};

//───────────────────────────────── scores ──────────────────────────────────//

/// Weights of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub efficiency: f64,
    pub specificity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            efficiency: 0.6,
            specificity: 0.4,
        }
    }
}

/// 100 minus off-target penalties, clamped to [0, 100].
///
/// Perfect-match hits beyond the target site itself cost 100 each, then 20,
/// 5 and 1 per site at 1, 2 and 3 mismatches.
pub fn specificity_score(guide: &Guide) -> f64 {
    let counts = &guide.off_targets;
    let mut score = 100.0;

    let perfect = counts[Mismatches::Zero];
    if perfect > 1 {
        score -= (perfect - 1) as f64 * 100.0;
    }
    score -= counts[Mismatches::One] as f64 * 20.0;
    score -= counts[Mismatches::Two] as f64 * 5.0;
    score -= counts[Mismatches::Three] as f64;

    score.clamp(0.0, 100.0)
}

/// Weighted blend of efficiency and specificity, rounded to two decimals.
pub fn composite_score(guide: &Guide, weights: &ScoreWeights) -> f64 {
    let composite = guide.efficiency_score * weights.efficiency
        + specificity_score(guide) * weights.specificity;
    round_to(composite, 2)
}

//───────────────────────────────── ordering ────────────────────────────────//

/// Default ranking order: efficiency descending, then fewest 0/1/2-mismatch
/// off-targets, then earliest start.
pub fn compare_guides(a: &Guide, b: &Guide) -> Ordering {
    b.efficiency_score
        .total_cmp(&a.efficiency_score)
        .then_with(|| a.off_targets.critical().cmp(&b.off_targets.critical()))
        .then_with(|| a.start.cmp(&b.start))
}

/// Stable sort by [`compare_guides`]; full ties keep their input order.
pub fn rank_guides(mut guides: Vec<Guide>) -> Vec<Guide> {
    guides.sort_by(compare_guides);
    guides
}

/// First `top_n` guides of an already ranked batch.
pub fn select_top_guides(guides: &[Guide], top_n: usize) -> &[Guide] {
    &guides[..top_n.min(guides.len())]
}

/// Keep guides with at most `max_1mm` and `max_2mm` off-targets.
pub fn filter_by_specificity(guides: Vec<Guide>, max_1mm: u32, max_2mm: u32) -> Vec<Guide> {
    let before = guides.len();
    let kept: Vec<Guide> = guides
        .into_iter()
        .filter(|guide| {
            guide.off_targets[Mismatches::One] <= max_1mm
                && guide.off_targets[Mismatches::Two] <= max_2mm
        })
        .collect();
    info!(
        "Specificity filter (1MM <= {}, 2MM <= {}) kept {}/{} guides",
        max_1mm,
        max_2mm,
        kept.len(),
        before
    );
    kept
}
