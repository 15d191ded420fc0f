use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::ranking::ScoreWeights;
use crate::error::{DesignError, Result};
use crate::helper_functions::resolve_path;
use crate::models::{QualityFilter, DEFAULT_GUIDE_LENGTH, PAM_LENGTH};
use crate::motif_scanner::{PamRule, ScanOptions};
use crate::validation::{validate_species, validate_top_n};

/// Run parameters for one design job.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```json
/// { "top_n": 10, "filter": { "min_gc": 35.0 }, "seed": 7 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    pub guide_length: usize,
    pub pam: PamRule,
    pub apply_filters: bool,
    pub filter: QualityFilter,
    pub top_n: usize,
    pub species: String,
    /// Fixed seed for the off-target noise; `None` draws from entropy.
    pub seed: Option<u64>,
    pub weights: ScoreWeights,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            guide_length: DEFAULT_GUIDE_LENGTH,
            pam: PamRule::default(),
            apply_filters: true,
            filter: QualityFilter::default(),
            top_n: 5,
            species: "human".to_string(),
            seed: None,
            weights: ScoreWeights::default(),
        }
    }
}

impl DesignConfig {
    /// Read a JSON config; relative paths resolve against the project root.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let path = resolve_path(path);
        info!("Reading design configuration from {}", path.display());
        let text = fs::read_to_string(&path)?;
        let config: DesignConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        let path = resolve_path(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.guide_length == 0 {
            return Err(DesignError::Config("guide_length must be positive".to_string()));
        }
        let filter = &self.filter;
        if !(0.0..=100.0).contains(&filter.min_gc)
            || !(0.0..=100.0).contains(&filter.max_gc)
            || filter.min_gc > filter.max_gc
        {
            return Err(DesignError::Config(format!(
                "GC bounds must satisfy 0 <= min_gc <= max_gc <= 100, got [{}, {}]",
                filter.min_gc, filter.max_gc
            )));
        }
        if filter.max_homopolymer == 0 || filter.poly_t_run == 0 {
            return Err(DesignError::Config(
                "max_homopolymer and poly_t_run must be positive".to_string(),
            ));
        }
        validate_top_n(self.top_n)?;
        validate_species(&self.species)?;
        Ok(())
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            guide_length: self.guide_length,
            pam: self.pam.clone(),
            filter: self.apply_filters.then_some(self.filter),
        }
    }

    /// Shortest sequence that can hold a guide and its PAM.
    pub fn min_sequence_length(&self) -> usize {
        self.guide_length + PAM_LENGTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: DesignConfig =
            serde_json::from_str(r#"{ "top_n": 10, "filter": { "min_gc": 35.0 }, "pam": "nag" }"#).unwrap();
        assert_eq!(config.top_n, 10);
        assert_eq!(config.filter.min_gc, 35.0);
        assert_eq!(config.filter.max_gc, 60.0);
        assert_eq!(config.pam.pattern(), "NAG");
        assert_eq!(config.guide_length, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_pam_fails_to_deserialize() {
        assert!(serde_json::from_str::<DesignConfig>(r#"{ "pam": "NGGNG" }"#).is_err());
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = DesignConfig::default();
        assert!(config.validate().is_ok());
        config.top_n = 0;
        assert!(config.validate().is_err());

        let mut config = DesignConfig::default();
        config.filter.min_gc = 70.0;
        assert!(config.validate().is_err());

        let mut config = DesignConfig::default();
        config.species = "yeast".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");
        let config = DesignConfig {
            seed: Some(7),
            apply_filters: false,
            ..DesignConfig::default()
        };
        config.write_json_file(&path).unwrap();
        assert_eq!(DesignConfig::from_json_file(&path).unwrap(), config);
    }

    #[test]
    fn scan_options_respect_filter_switch() {
        let config = DesignConfig {
            apply_filters: false,
            ..DesignConfig::default()
        };
        assert!(config.scan_options().filter.is_none());
        assert!(DesignConfig::default().scan_options().filter.is_some());
        assert_eq!(DesignConfig::default().min_sequence_length(), 23);
    }
}
