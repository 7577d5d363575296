//! Full chart generation and windowed regeneration.

use rand::Rng;
use tracing::{debug, info, warn};

use crate::{
    chart::sort_notes,
    filter::{filter_onsets, filter_section},
    holds::{convert_holds, fit_holds_before},
    lanes::assign_lanes,
    scoring::score_difficulty,
    AnalysisInput, ChartError, ChartMetadata, DifficultyLevel, DifficultyProfile, Note, NoteChart,
    Result,
};

pub const MIN_KEYS: usize = 1;
pub const MAX_KEYS: usize = 6;

/// Runs the filter, lane and hold stages for one key count and difficulty.
///
/// The generator holds no chart state between calls. All randomness comes
/// from the stream handed to each call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGenerator {
    num_keys: usize,
    difficulty: DifficultyLevel,
    profile: DifficultyProfile,
}

impl ChartGenerator {
    /// Creates a generator using the built-in profile for `difficulty`.
    /// Key counts outside 1..=6 are rejected.
    pub fn new(num_keys: usize, difficulty: DifficultyLevel) -> Result<Self> {
        Self::with_profile(num_keys, difficulty, difficulty.profile())
    }

    /// Creates a generator with a tuned profile in place of the built-in one.
    pub fn with_profile(
        num_keys: usize,
        difficulty: DifficultyLevel,
        profile: DifficultyProfile,
    ) -> Result<Self> {
        if !(MIN_KEYS..=MAX_KEYS).contains(&num_keys) {
            return Err(ChartError::InvalidKeyCount(num_keys));
        }
        profile.validate()?;

        Ok(Self {
            num_keys,
            difficulty,
            profile,
        })
    }

    /// Entry point for untrusted key counts: clamps into 1..=6 instead of
    /// failing. Only user-facing surfaces should use this.
    pub fn clamped(num_keys: usize, difficulty: DifficultyLevel) -> Self {
        let clamped = num_keys.clamp(MIN_KEYS, MAX_KEYS);
        if clamped != num_keys {
            warn!(requested = num_keys, used = clamped, "clamped key count");
        }

        Self {
            num_keys: clamped,
            difficulty,
            profile: difficulty.profile(),
        }
    }

    /// Generator matching the key count and difficulty a chart was made with,
    /// using the built-in profile. See `GeneratorConfig::generator_for_chart`
    /// for charts generated with a tuned profile.
    pub fn for_chart(chart: &NoteChart) -> Result<Self> {
        Self::new(chart.num_keys, chart.difficulty)
    }

    pub fn num_keys(&self) -> usize {
        self.num_keys
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Builds a complete, scored chart from the analysis.
    ///
    /// Empty beat and onset series or a zero duration produce a valid chart
    /// without notes rated 1.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        input: &AnalysisInput,
        metadata: ChartMetadata,
        rng: &mut R,
    ) -> Result<NoteChart> {
        let notes = if input.duration_seconds > 0.0 {
            self.generate_notes(input, rng)?
        } else {
            Vec::new()
        };
        let difficulty_value = score_difficulty(&notes, input.duration_seconds);

        info!(
            difficulty = %self.difficulty,
            num_keys = self.num_keys,
            notes = notes.len(),
            rating = difficulty_value,
            "generated chart"
        );

        Ok(NoteChart {
            metadata,
            bpm: input.tempo_bpm,
            offset: 0.0,
            duration_seconds: input.duration_seconds,
            num_keys: self.num_keys,
            difficulty: self.difficulty,
            difficulty_value,
            notes,
        })
    }

    /// Re-rolls the notes whose start time lies in `[start, end)` and leaves
    /// every other note untouched.
    ///
    /// Windows that are empty or fall outside the song return the chart
    /// unchanged. The difficulty rating is not recomputed; call
    /// [`NoteChart::rescore`] for that.
    pub fn regenerate_section<R: Rng + ?Sized>(
        &self,
        chart: &NoteChart,
        start: f64,
        end: f64,
        input: &AnalysisInput,
        rng: &mut R,
    ) -> Result<NoteChart> {
        if !window_overlaps_song(start, end, chart.duration_seconds) {
            warn!(
                start,
                end,
                duration = chart.duration_seconds,
                "ignoring regeneration window"
            );
            return Ok(chart.clone());
        }

        let (kept, discarded): (Vec<Note>, Vec<Note>) = chart
            .notes
            .iter()
            .copied()
            .partition(|note| note.time < start || note.time >= end);

        let selected: Vec<f64> = input
            .onset_times
            .iter()
            .copied()
            .filter(|time| (start..end).contains(time) && *time <= chart.duration_seconds)
            .collect();

        let times = filter_section(&selected, input, &self.profile, rng);
        let lanes = assign_lanes(&times, self.num_keys, &self.profile, rng)?;
        let mut fresh = convert_holds(lanes, input.tempo_bpm, &self.profile, rng);
        fit_holds_before(&mut fresh, &kept);

        debug!(
            start,
            end,
            removed = discarded.len(),
            inserted = fresh.len(),
            "regenerated section"
        );

        let mut notes = kept;
        notes.extend(fresh);
        sort_notes(&mut notes);

        Ok(NoteChart {
            notes,
            ..chart.clone()
        })
    }

    fn generate_notes<R: Rng + ?Sized>(
        &self,
        input: &AnalysisInput,
        rng: &mut R,
    ) -> Result<Vec<Note>> {
        let times = filter_onsets(input, &self.profile, rng);
        debug!(candidates = times.len(), "filtered onsets");

        let taps = assign_lanes(&times, self.num_keys, &self.profile, rng)?;
        debug!(notes = taps.len(), "assigned lanes");

        let notes = convert_holds(taps, input.tempo_bpm, &self.profile, rng);
        debug!(
            holds = notes.iter().filter(|note| note.is_hold()).count(),
            "converted holds"
        );

        Ok(notes)
    }
}

/// Generates a chart, clamping `num_keys` into the supported range.
pub fn generate<R: Rng + ?Sized>(
    input: &AnalysisInput,
    num_keys: usize,
    difficulty: DifficultyLevel,
    metadata: ChartMetadata,
    rng: &mut R,
) -> Result<NoteChart> {
    ChartGenerator::clamped(num_keys, difficulty).generate(input, metadata, rng)
}

/// Regenerates `[start, end)` of a chart with the key count and difficulty
/// it was generated with.
pub fn regenerate_section<R: Rng + ?Sized>(
    chart: &NoteChart,
    start: f64,
    end: f64,
    input: &AnalysisInput,
    rng: &mut R,
) -> Result<NoteChart> {
    ChartGenerator::for_chart(chart)?.regenerate_section(chart, start, end, input, rng)
}

fn window_overlaps_song(start: f64, end: f64, duration: f64) -> bool {
    start.is_finite() && end.is_finite() && start < end && end > 0.0 && start < duration
}
