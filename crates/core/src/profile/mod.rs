//! Difficulty tiers and the fixed parameter bundle each one resolves to.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ChartError, Result};

/// Named difficulty tier of a chart.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Normal,
    Hard,
    Expert,
    Master,
}

impl DifficultyLevel {
    /// Every level, ordered from easiest to hardest.
    pub const ALL: [DifficultyLevel; 5] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Normal,
        DifficultyLevel::Hard,
        DifficultyLevel::Expert,
        DifficultyLevel::Master,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Normal => "normal",
            DifficultyLevel::Hard => "hard",
            DifficultyLevel::Expert => "expert",
            DifficultyLevel::Master => "master",
        }
    }

    /// Returns the immutable parameter bundle for this level.
    pub fn profile(self) -> DifficultyProfile {
        match self {
            DifficultyLevel::Easy => EASY,
            DifficultyLevel::Normal => NORMAL,
            DifficultyLevel::Hard => HARD,
            DifficultyLevel::Expert => EXPERT,
            DifficultyLevel::Master => MASTER,
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DifficultyLevel {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        DifficultyLevel::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ChartError::UnknownDifficulty(s.to_string()))
    }
}

/// Parameters steering every stage of chart generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Fraction of the loudest onset strength an onset must reach to survive.
    pub onset_threshold: f64,
    /// Smallest gap allowed between two consecutive note times.
    pub min_interval_seconds: f64,
    pub max_simultaneous: usize,
    pub hold_probability: f64,
    /// Drives both chord likelihood and how freely lanes jump around.
    pub pattern_complexity: f64,
    /// Probability that an off-beat onset is skipped.
    pub beat_weight: f64,
    pub use_beats_only: bool,
}

const EASY: DifficultyProfile = DifficultyProfile {
    onset_threshold: 0.6,
    min_interval_seconds: 0.5,
    max_simultaneous: 1,
    hold_probability: 0.0,
    pattern_complexity: 0.2,
    beat_weight: 1.0,
    use_beats_only: true,
};

const NORMAL: DifficultyProfile = DifficultyProfile {
    onset_threshold: 0.4,
    min_interval_seconds: 0.3,
    max_simultaneous: 2,
    hold_probability: 0.1,
    pattern_complexity: 0.4,
    beat_weight: 0.8,
    use_beats_only: false,
};

const HARD: DifficultyProfile = DifficultyProfile {
    onset_threshold: 0.25,
    min_interval_seconds: 0.2,
    max_simultaneous: 2,
    hold_probability: 0.2,
    pattern_complexity: 0.6,
    beat_weight: 0.6,
    use_beats_only: false,
};

const EXPERT: DifficultyProfile = DifficultyProfile {
    onset_threshold: 0.15,
    min_interval_seconds: 0.1,
    max_simultaneous: 3,
    hold_probability: 0.3,
    pattern_complexity: 0.8,
    beat_weight: 0.4,
    use_beats_only: false,
};

const MASTER: DifficultyProfile = DifficultyProfile {
    onset_threshold: 0.1,
    min_interval_seconds: 0.05,
    max_simultaneous: 4,
    hold_probability: 0.4,
    pattern_complexity: 1.0,
    beat_weight: 0.2,
    use_beats_only: false,
};

impl DifficultyProfile {
    /// Checks every field against its documented range.
    pub fn validate(&self) -> Result<()> {
        unit_interval("onset_threshold", self.onset_threshold)?;
        unit_interval("hold_probability", self.hold_probability)?;
        unit_interval("pattern_complexity", self.pattern_complexity)?;
        unit_interval("beat_weight", self.beat_weight)?;

        if !(self.min_interval_seconds.is_finite() && self.min_interval_seconds > 0.0) {
            return Err(ChartError::InvalidProfile {
                field: "min_interval_seconds",
                reason: "must be a positive number of seconds",
            });
        }

        if self.max_simultaneous == 0 {
            return Err(ChartError::InvalidProfile {
                field: "max_simultaneous",
                reason: "must allow at least one note per time",
            });
        }

        Ok(())
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ChartError::InvalidProfile {
            field,
            reason: "must lie within [0, 1]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_are_valid() {
        for level in DifficultyLevel::ALL {
            level.profile().validate().unwrap();
        }
    }

    #[test]
    fn easy_uses_beats_only_without_holds() {
        let easy = DifficultyLevel::Easy.profile();
        assert!(easy.use_beats_only);
        assert_eq!(easy.hold_probability, 0.0);
        assert!(!DifficultyLevel::Master.profile().use_beats_only);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Expert".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::Expert);
        assert_eq!(" master ".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::Master);

        let err = "legendary".parse::<DifficultyLevel>().unwrap_err();
        assert!(format!("{err}").contains("legendary"));
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let mut profile = DifficultyLevel::Hard.profile();
        profile.beat_weight = 1.5;
        assert!(matches!(
            profile.validate(),
            Err(ChartError::InvalidProfile { field: "beat_weight", .. })
        ));

        let mut profile = DifficultyLevel::Hard.profile();
        profile.min_interval_seconds = 0.0;
        assert!(profile.validate().is_err());

        let mut profile = DifficultyLevel::Hard.profile();
        profile.max_simultaneous = 0;
        assert!(profile.validate().is_err());
    }
}
