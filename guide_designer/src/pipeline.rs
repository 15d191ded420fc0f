// src/pipeline.rs
use tracing::{info, warn};

use crate::analysis::ranking::{rank_guides, select_top_guides};
use crate::config::DesignConfig;
use crate::data_handling::SequenceWindow;
use crate::models::Guide;
use crate::motif_scanner::extract_guides;
use crate::prediction_tools::heuristic_efficiency::{EfficiencyModel, HeuristicEfficiency};
use crate::prediction_tools::off_target_estimator::{
    ComplexityOffTargetEstimator, NoiseSource, OffTargetSearch, RngNoise,
};

/// Default off-target search: complexity estimate with boxed noise.
pub type DefaultOffTargets = ComplexityOffTargetEstimator<Box<dyn NoiseSource>>;

/// Scan, score, estimate and rank guides for one sequence window.
pub struct GuideDesigner<E: EfficiencyModel, O: OffTargetSearch> {
    config: DesignConfig,
    efficiency: E,
    off_targets: O,
}

impl GuideDesigner<HeuristicEfficiency, DefaultOffTargets> {
    /// Heuristic scoring with seeded noise if `config.seed` is set, entropy
    /// otherwise.
    pub fn from_config(config: DesignConfig) -> Self {
        let noise: Box<dyn NoiseSource> = match config.seed {
            Some(seed) => Box::new(RngNoise::seeded(seed)),
            None => Box::new(RngNoise::from_entropy()),
        };
        GuideDesigner::new(config, HeuristicEfficiency, ComplexityOffTargetEstimator::new(noise))
    }
}

impl<E: EfficiencyModel, O: OffTargetSearch> GuideDesigner<E, O> {
    pub fn new(config: DesignConfig, efficiency: E, off_targets: O) -> Self {
        Self {
            config,
            efficiency,
            off_targets,
        }
    }

    pub fn config(&self) -> &DesignConfig {
        &self.config
    }

    /// Every candidate that survives the scan, scored and ranked.
    pub fn design_all(&mut self, window: &SequenceWindow) -> Vec<Guide> {
        if window.len() < self.config.min_sequence_length() {
            warn!(
                "Sequence of {} bp on {} is shorter than guide plus PAM ({} bp)",
                window.len(),
                window.chromosome,
                self.config.min_sequence_length()
            );
            return Vec::new();
        }

        let mut guides = extract_guides(
            window.sequence(),
            &window.chromosome,
            window.start_position,
            window.gene_name.as_deref(),
            &self.config.scan_options(),
        );
        info!(
            "Found {} candidate guides in {}:{}-{}",
            guides.len(),
            window.chromosome,
            window.start_position,
            window.end_position()
        );
        if guides.is_empty() {
            return guides;
        }

        self.efficiency.predict_batch(&mut guides);
        self.off_targets.search_batch(&mut guides);
        rank_guides(guides)
    }

    /// The best `top_n` guides, best first.
    pub fn design(&mut self, window: &SequenceWindow) -> Vec<Guide> {
        let ranked = self.design_all(window);
        let top = select_top_guides(&ranked, self.config.top_n).to_vec();
        info!("Selected top {} of {} ranked guides", top.len(), ranked.len());
        top
    }
}

/// One-shot design with the default scorers.
pub fn design_guides(window: &SequenceWindow, config: &DesignConfig) -> Vec<Guide> {
    GuideDesigner::from_config(config.clone()).design(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction_tools::off_target_estimator::FixedNoise;

    fn window(sequence: &str) -> SequenceWindow {
        SequenceWindow::new(sequence, 1, "chr1", None)
    }

    fn fixed_designer(config: DesignConfig) -> GuideDesigner<HeuristicEfficiency, ComplexityOffTargetEstimator<FixedNoise>> {
        GuideDesigner::new(config, HeuristicEfficiency, ComplexityOffTargetEstimator::new(FixedNoise(0)))
    }

    #[test]
    fn short_sequence_yields_nothing() {
        let mut designer = fixed_designer(DesignConfig::default());
        assert!(designer.design(&window("ACGTAGG")).is_empty());
    }

    #[test]
    fn single_site_is_scored_and_estimated() {
        let config = DesignConfig {
            apply_filters: false,
            ..DesignConfig::default()
        };
        let mut designer = fixed_designer(config);
        let guides = designer.design(&window(&format!("{}TGG{}", "A".repeat(20), "C".repeat(10))));
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].sequence(), "A".repeat(20));
        assert_eq!(guides[0].off_targets.as_array(), [1, 10, 35, 140]);
        assert!(guides[0].efficiency_score >= 0.0);
    }

    #[test]
    fn top_n_truncates_ranked_output() {
        let config = DesignConfig {
            apply_filters: false,
            top_n: 2,
            ..DesignConfig::default()
        };
        let sequence = "GGAAGACTCCAGTGGTAATCTGGCAGTCAGTCGATCAATCGGAGGTTACCGATGCATGCAAGTCGG";
        let mut designer = fixed_designer(config);
        let all = designer.design_all(&window(sequence));
        let top = designer.design(&window(sequence));
        assert!(all.len() > 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top, all[..2].to_vec());
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let config = DesignConfig {
            apply_filters: false,
            seed: Some(42),
            top_n: 100,
            ..DesignConfig::default()
        };
        let sequence = "GGAAGACTCCAGTGGTAATCTGGCAGTCAGTCGATCAATCGGAGGTTACCGATGCATGCAAGTCGG";
        let first = design_guides(&window(sequence), &config);
        let second = design_guides(&window(sequence), &config);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
