use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{ChartError, Result};

/// Tempo assumed when the analysis reports a non-positive one.
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// Loudness curve sampled at ascending timestamps, normalised to [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyEnvelope {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl EnergyEnvelope {
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Self {
        Self { times, values }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of usable samples. Trailing entries of the longer sequence are
    /// ignored if the two lengths disagree.
    pub fn len(&self) -> usize {
        self.times.len().min(self.values.len())
    }

    /// Linearly interpolates the envelope at `time`. Times before the first
    /// sample or after the last one take the nearest end value, and an empty
    /// envelope reads as silence.
    pub fn value_at(&self, time: f64) -> f64 {
        let len = self.len();
        if len == 0 {
            return 0.0;
        }

        let times = &self.times[..len];
        let values = &self.values[..len];

        match times.binary_search_by(|probe| probe.partial_cmp(&time).unwrap_or(Ordering::Equal)) {
            Ok(index) => values[index],
            Err(0) => values[0],
            Err(index) if index >= len => values[len - 1],
            Err(index) => {
                let (t0, t1) = (times[index - 1], times[index]);
                let (v0, v1) = (values[index - 1], values[index]);
                let span = t1 - t0;
                if span <= f64::EPSILON {
                    v1
                } else {
                    v0 + (v1 - v0) * (time - t0) / span
                }
            }
        }
    }
}

/// Timing features extracted from one audio file. Produced once by the
/// feature extractor and only ever read by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub tempo_bpm: f64,
    pub duration_seconds: f64,
    #[serde(default)]
    pub beat_times: Vec<f64>,
    #[serde(default)]
    pub onset_times: Vec<f64>,
    #[serde(default)]
    pub energy_envelope: EnergyEnvelope,
}

impl AnalysisInput {
    /// Length of one beat in seconds.
    pub fn beat_duration(&self) -> f64 {
        beat_duration(self.tempo_bpm)
    }

    /// Strength of the signal at an arbitrary time, read off the envelope.
    pub fn energy_at(&self, time: f64) -> f64 {
        self.energy_envelope.value_at(time)
    }

    /// Checks the contract a feature extractor promises: ascending time
    /// sequences, matching envelope lengths and normalised energy values.
    pub fn validate(&self) -> Result<()> {
        if !(self.tempo_bpm.is_finite() && self.tempo_bpm > 0.0) {
            return Err(ChartError::InvalidInput(format!(
                "tempo must be a positive number of beats per minute, got {}",
                self.tempo_bpm
            )));
        }

        if !(self.duration_seconds.is_finite() && self.duration_seconds >= 0.0) {
            return Err(ChartError::InvalidInput(format!(
                "duration must be a non-negative number of seconds, got {}",
                self.duration_seconds
            )));
        }

        ensure_ascending("beat_times", &self.beat_times)?;
        ensure_ascending("onset_times", &self.onset_times)?;
        ensure_ascending("energy_envelope.times", &self.energy_envelope.times)?;

        let envelope = &self.energy_envelope;
        if envelope.times.len() != envelope.values.len() {
            return Err(ChartError::InvalidInput(format!(
                "energy envelope has {} times but {} values",
                envelope.times.len(),
                envelope.values.len()
            )));
        }

        if let Some(value) = envelope
            .values
            .iter()
            .find(|value| !(0.0..=1.0).contains(*value))
        {
            return Err(ChartError::InvalidInput(format!(
                "energy value {value} is outside [0, 1]"
            )));
        }

        Ok(())
    }
}

/// Length of one beat at `tempo_bpm`, falling back to [`DEFAULT_TEMPO_BPM`]
/// for tempos that cannot describe a beat.
pub fn beat_duration(tempo_bpm: f64) -> f64 {
    if tempo_bpm.is_finite() && tempo_bpm > 0.0 {
        60.0 / tempo_bpm
    } else {
        60.0 / DEFAULT_TEMPO_BPM
    }
}

fn ensure_ascending(name: &str, values: &[f64]) -> Result<()> {
    if let Some(value) = values.iter().find(|value| !value.is_finite()) {
        return Err(ChartError::InvalidInput(format!(
            "{name} contains non-finite value {value}"
        )));
    }

    match values.windows(2).position(|pair| pair[1] < pair[0]) {
        Some(index) => Err(ChartError::InvalidInput(format!(
            "{name} is not ascending at index {}",
            index + 1
        ))),
        None => Ok(()),
    }
}
