use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;
use tracing::{debug, info};

use crate::helper_functions::{gc_fraction, has_homopolymer, BASES};
use crate::models::{Guide, Mismatches, OffTargetCounts};

/// Off-target burden per mismatch class.
///
/// Implementations are free to be approximate. The shipped
/// [`ComplexityOffTargetEstimator`] does not look at a genome at all; an
/// index-backed search can replace it behind this trait.
pub trait OffTargetSearch {
    fn search(&mut self, sequence: &str) -> OffTargetCounts;

    fn search_batch(&mut self, guides: &mut [Guide]) {
        for guide in guides.iter_mut() {
            guide.off_targets = self.search(guide.sequence());
        }
        info!("Estimated off-targets for {} guides", guides.len());
    }
}

/// Integer jitter in `-2..=2` added to each bucket midpoint.
pub trait NoiseSource {
    fn jitter(&mut self) -> i32;
}

/// Production noise backed by any `rand` generator.
pub struct RngNoise<R: Rng> {
    rng: R,
}

impl<R: Rng> RngNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngNoise<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl RngNoise<Isaac64Rng> {
    /// Reproducible noise stream for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(Isaac64Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> NoiseSource for RngNoise<R> {
    fn jitter(&mut self) -> i32 {
        self.rng.gen_range(-2..=2)
    }
}

/// Constant jitter for deterministic runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedNoise(pub i32);

impl NoiseSource for FixedNoise {
    fn jitter(&mut self) -> i32 {
        self.0
    }
}

impl<N: NoiseSource + ?Sized> NoiseSource for Box<N> {
    fn jitter(&mut self) -> i32 {
        (**self).jitter()
    }
}

const KMER_SIZE: usize = 4;
/// 4^4 possible tetramers.
const MAX_DISTINCT_KMERS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityTier {
    Low,
    Medium,
    High,
}

impl ComplexityTier {
    pub fn from_complexity(complexity: f64) -> Self {
        if complexity < 0.5 {
            ComplexityTier::Low
        } else if complexity < 0.7 {
            ComplexityTier::Medium
        } else {
            ComplexityTier::High
        }
    }

    /// (min, max) ranges for 1, 2 and 3 mismatches.
    fn ranges(self) -> [(u32, u32); 3] {
        match self {
            ComplexityTier::Low => [(5, 15), (20, 50), (80, 200)],
            ComplexityTier::Medium => [(1, 5), (5, 20), (20, 80)],
            ComplexityTier::High => [(0, 3), (2, 10), (10, 40)],
        }
    }
}

/// Sequence complexity in [0, 1], lower for repetitive or GC-extreme guides.
///
/// Distinct tetramers over the number possible for this length, scaled by
/// 0.8 for GC outside [0.3, 0.7] and by 0.7 for each base with a run of 4+.
pub fn complexity(sequence: &str) -> f64 {
    let seq = sequence.as_bytes();
    if seq.len() < KMER_SIZE {
        return 0.0;
    }

    let kmers: HashSet<&[u8]> = seq.windows(KMER_SIZE).collect();
    let max_kmers = MAX_DISTINCT_KMERS.min(seq.len() - KMER_SIZE + 1);
    let mut score = kmers.len() as f64 / max_kmers as f64;

    let gc = gc_fraction(seq);
    if !(0.3..=0.7).contains(&gc) {
        score *= 0.8;
    }

    for &base in &BASES {
        if has_homopolymer(seq, base, 4) {
            score *= 0.7;
        }
    }
    score
}

/// Hamming distance; sequences of different length count as fully mismatched.
pub fn mismatch_count(a: &str, b: &str) -> usize {
    if a.len() != b.len() {
        return a.len();
    }
    a.bytes().zip(b.bytes()).filter(|(x, y)| x != y).count()
}

/// Composition-based off-target estimate.
///
/// This is a calibrated-noise placeholder, not a genome search: counts are
/// the midpoints of empirical ranges per complexity tier plus injected
/// jitter. With [`FixedNoise`] the output is a pure function of the
/// sequence.
pub struct ComplexityOffTargetEstimator<N: NoiseSource> {
    noise: N,
}

impl<N: NoiseSource> ComplexityOffTargetEstimator<N> {
    pub fn new(noise: N) -> Self {
        Self { noise }
    }

    fn estimate_count(&mut self, min: u32, max: u32) -> u32 {
        let midpoint = (min + max) as f64 / 2.0;
        // Truncate toward zero, then floor at zero
        let estimate = (midpoint + self.noise.jitter() as f64) as i64;
        estimate.max(0) as u32
    }
}

impl<N: NoiseSource> OffTargetSearch for ComplexityOffTargetEstimator<N> {
    fn search(&mut self, sequence: &str) -> OffTargetCounts {
        let complexity = complexity(sequence);
        let tier = ComplexityTier::from_complexity(complexity);
        let [one, two, three] = tier.ranges();

        let mut counts = OffTargetCounts::default();
        counts[Mismatches::Zero] = 1;
        counts[Mismatches::One] = self.estimate_count(one.0, one.1);
        counts[Mismatches::Two] = self.estimate_count(two.0, two.1);
        counts[Mismatches::Three] = self.estimate_count(three.0, three.1);

        debug!(
            "Off-target estimate for {}: complexity {:.3} ({:?}) -> {:?}",
            sequence,
            complexity,
            tier,
            counts.as_array()
        );
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DIVERSE: &str = "GGAAGACTCCAGTGGTAATC";

    #[test]
    fn complexity_of_diverse_guide_is_high() {
        // 17 tetramers, all distinct, GC 50%, no runs.
        assert_relative_eq!(complexity(DIVERSE), 1.0);
        assert_eq!(ComplexityTier::from_complexity(complexity(DIVERSE)), ComplexityTier::High);
    }

    #[test]
    fn complexity_penalizes_repeats_gc_extremes_and_runs() {
        // One distinct tetramer, GC 0 and an A run: 1/17 * 0.8 * 0.7
        assert_relative_eq!(complexity("AAAAAAAAAAAAAAAAAAAA"), 1.0 / 17.0 * 0.8 * 0.7);
        assert_eq!(
            ComplexityTier::from_complexity(complexity("AAAAAAAAAAAAAAAAAAAA")),
            ComplexityTier::Low
        );
        // Runs of A and T each cost a factor of 0.7.
        let two_runs = complexity("AAAACGTCGATCGGCTTTTC");
        let distinct = "AAAACGTCGATCGGCTTTTC".as_bytes().windows(4).collect::<HashSet<_>>().len();
        assert_relative_eq!(two_runs, distinct as f64 / 17.0 * 0.7 * 0.7);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(ComplexityTier::from_complexity(0.49), ComplexityTier::Low);
        assert_eq!(ComplexityTier::from_complexity(0.5), ComplexityTier::Medium);
        assert_eq!(ComplexityTier::from_complexity(0.69), ComplexityTier::Medium);
        assert_eq!(ComplexityTier::from_complexity(0.7), ComplexityTier::High);
    }

    #[test]
    fn fixed_noise_gives_identical_tables() {
        let mut estimator = ComplexityOffTargetEstimator::new(FixedNoise(1));
        let first = estimator.search(DIVERSE);
        let second = estimator.search(DIVERSE);
        assert_eq!(first, second);
        // High tier midpoints 1.5, 6, 25 plus 1
        assert_eq!(first.as_array(), [1, 2, 7, 26]);
    }

    #[test]
    fn midpoints_truncate_and_never_go_negative() {
        let mut estimator = ComplexityOffTargetEstimator::new(FixedNoise(-2));
        assert_eq!(estimator.search(DIVERSE).as_array(), [1, 0, 4, 23]);

        let mut low = ComplexityOffTargetEstimator::new(FixedNoise(0));
        assert_eq!(low.search("AAAAAAAAAAAAAAAAAAAA").as_array(), [1, 10, 35, 140]);
    }

    #[test]
    fn seeded_noise_is_reproducible_and_bounded() {
        let mut a = ComplexityOffTargetEstimator::new(RngNoise::seeded(42));
        let mut b = ComplexityOffTargetEstimator::new(RngNoise::seeded(42));
        for _ in 0..20 {
            let counts = a.search(DIVERSE);
            assert_eq!(counts, b.search(DIVERSE));
            assert_eq!(counts[Mismatches::Zero], 1);
            assert!(counts[Mismatches::One] <= 3);
            assert!((4..=8).contains(&counts[Mismatches::Two]));
            assert!((23..=27).contains(&counts[Mismatches::Three]));
        }
    }

    #[test]
    fn search_batch_populates_every_guide() {
        use crate::models::Strand;
        let mut guides = vec![
            Guide::new(DIVERSE, "TGG", "chr17", 1, 20, Strand::Forward),
            Guide::new("AAAAAAAAAAAAAAAAAAAA", "TGG", "chr1", 1, 20, Strand::Forward),
        ];
        ComplexityOffTargetEstimator::new(FixedNoise(0)).search_batch(&mut guides);
        assert_eq!(guides[0].off_targets.as_array(), [1, 1, 6, 25]);
        assert_eq!(guides[1].off_targets.as_array(), [1, 10, 35, 140]);
    }

    #[test]
    fn mismatch_count_is_hamming_distance() {
        assert_eq!(mismatch_count("ACGT", "ACGT"), 0);
        assert_eq!(mismatch_count("ACGT", "AGGA"), 2);
        assert_eq!(mismatch_count("ACGT", "ACG"), 4);
    }
}
