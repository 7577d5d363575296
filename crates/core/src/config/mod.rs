use std::path::Path;

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    rng::{create_rng, entropy_rng},
    ChartGenerator, DifficultyLevel, DifficultyProfile, NoteChart, Result,
};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Configuration specific to chart generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub num_keys: usize,
    pub difficulty: DifficultyLevel,
    /// Fixed seed for reproducible charts. Left unset, every run draws a
    /// fresh stream from system entropy.
    pub seed: Option<u64>,
    /// Replaces the built-in profile of `difficulty` when present.
    pub profile: Option<DifficultyProfile>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_keys: 4,
            difficulty: DifficultyLevel::default(),
            seed: None,
            profile: None,
        }
    }
}

impl GeneratorConfig {
    /// Builds a validated generator, failing on bad key counts or profiles.
    pub fn build_generator(&self) -> Result<ChartGenerator> {
        match self.profile {
            Some(profile) => ChartGenerator::with_profile(self.num_keys, self.difficulty, profile),
            None => ChartGenerator::new(self.num_keys, self.difficulty),
        }
    }

    /// Generator for re-rolling sections of `chart`. Key count and difficulty
    /// come from the chart; a configured profile override still applies, since
    /// charts do not record the profile they were generated with.
    pub fn generator_for_chart(&self, chart: &NoteChart) -> Result<ChartGenerator> {
        match self.profile {
            Some(profile) => ChartGenerator::with_profile(chart.num_keys, chart.difficulty, profile),
            None => ChartGenerator::for_chart(chart),
        }
    }

    pub fn rng(&self) -> Pcg32 {
        match self.seed {
            Some(seed) => create_rng(seed),
            None => entropy_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChartError, ChartMetadata};

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.generator.num_keys, 4);
        assert_eq!(config.generator.difficulty, DifficultyLevel::Normal);
    }

    #[test]
    fn parses_partial_generator_section() {
        let config =
            AppConfig::from_json_str(r#"{"generator": {"difficulty": "expert", "seed": 9}}"#)
                .unwrap();

        let generator = config.generator.build_generator().unwrap();
        assert_eq!(generator.difficulty(), DifficultyLevel::Expert);
        assert_eq!(generator.num_keys(), 4);
        assert_eq!(config.generator.seed, Some(9));
    }

    #[test]
    fn invalid_settings_fail_fast() {
        let config = GeneratorConfig {
            num_keys: 9,
            ..Default::default()
        };
        assert!(matches!(
            config.build_generator(),
            Err(ChartError::InvalidKeyCount(9))
        ));

        let err = AppConfig::from_json_str(r#"{"generator": {"difficulty": "impossible"}}"#)
            .unwrap_err();
        assert!(matches!(err, ChartError::Json(_)));
    }

    #[test]
    fn custom_profile_overrides_builtin() {
        let mut profile = DifficultyLevel::Hard.profile();
        profile.hold_probability = 0.0;
        let config = GeneratorConfig {
            difficulty: DifficultyLevel::Hard,
            profile: Some(profile),
            ..Default::default()
        };

        let generator = config.build_generator().unwrap();
        assert_eq!(generator.profile().hold_probability, 0.0);
    }

    #[test]
    fn chart_generator_keeps_profile_override() {
        let mut profile = DifficultyLevel::Expert.profile();
        profile.hold_probability = 0.0;
        let config = GeneratorConfig {
            num_keys: 2,
            difficulty: DifficultyLevel::Normal,
            profile: Some(profile),
            ..Default::default()
        };

        let chart = ChartGenerator::new(5, DifficultyLevel::Expert)
            .unwrap()
            .generate(
                &Default::default(),
                ChartMetadata::default(),
                &mut create_rng(1),
            )
            .unwrap();

        let generator = config.generator_for_chart(&chart).unwrap();
        assert_eq!(generator.num_keys(), 5);
        assert_eq!(generator.difficulty(), DifficultyLevel::Expert);
        assert_eq!(generator.profile().hold_probability, 0.0);

        let builtin = GeneratorConfig::default().generator_for_chart(&chart).unwrap();
        assert_eq!(*builtin.profile(), DifficultyLevel::Expert.profile());
    }
}
