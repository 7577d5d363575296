use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{scoring, DifficultyLevel};

/// A single playable event. A zero duration is a tap, anything longer a hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub time: f64,
    pub lane: usize,
    #[serde(default)]
    pub duration: f64,
}

impl Note {
    pub fn tap(time: f64, lane: usize) -> Self {
        Self {
            time,
            lane,
            duration: 0.0,
        }
    }

    pub fn hold(time: f64, lane: usize, duration: f64) -> Self {
        Self {
            time,
            lane,
            duration,
        }
    }

    pub fn is_hold(&self) -> bool {
        self.duration > 0.0
    }

    pub fn end_time(&self) -> f64 {
        self.time + self.duration
    }

    /// Chart ordering: by time, then by lane.
    pub fn chart_order(&self, other: &Note) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.lane.cmp(&other.lane))
    }
}

/// Sorts notes into chart order in place.
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(Note::chart_order);
}

/// Descriptive fields copied from the generate call onto the chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub title: String,
    pub artist: String,
    pub audio_file: String,
}

impl ChartMetadata {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        audio_file: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            audio_file: audio_file.into(),
        }
    }
}

/// A complete chart for one song at one difficulty. Notes are kept sorted by
/// `(time, lane)`; every mutator restores that order before returning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteChart {
    #[serde(default)]
    pub metadata: ChartMetadata,
    pub bpm: f64,
    #[serde(default)]
    pub offset: f64,
    pub duration_seconds: f64,
    pub num_keys: usize,
    pub difficulty: DifficultyLevel,
    pub difficulty_value: u8,
    pub notes: Vec<Note>,
}

impl NoteChart {
    /// Inserts a note, keeping chart order. Duplicate `(time, lane)` pairs
    /// are accepted since manual edits may produce them.
    pub fn add_note(&mut self, note: Note) {
        let index = self
            .notes
            .partition_point(|existing| existing.chart_order(&note) != Ordering::Greater);
        self.notes.insert(index, note);
    }

    /// Removes the first note at exactly `(time, lane)`, returning it.
    pub fn remove_note(&mut self, time: f64, lane: usize) -> Option<Note> {
        let index = self
            .notes
            .iter()
            .position(|note| note.lane == lane && note.time.total_cmp(&time) == Ordering::Equal)?;
        Some(self.notes.remove(index))
    }

    /// Notes whose start time lies within `[start, end)`.
    pub fn notes_in_range(&self, start: f64, end: f64) -> &[Note] {
        let from = self.notes.partition_point(|note| note.time < start);
        let to = self.notes.partition_point(|note| note.time < end).max(from);
        &self.notes[from..to]
    }

    pub fn hold_count(&self) -> usize {
        self.notes.iter().filter(|note| note.is_hold()).count()
    }

    pub fn notes_per_second(&self) -> f64 {
        if self.duration_seconds > 0.0 {
            self.notes.len() as f64 / self.duration_seconds
        } else {
            0.0
        }
    }

    /// Recomputes `difficulty_value` from the current notes.
    pub fn rescore(&mut self) -> u8 {
        self.difficulty_value = scoring::score_difficulty(&self.notes, self.duration_seconds);
        self.difficulty_value
    }

    /// Re-establishes chart order after direct edits to `notes`.
    pub fn sort(&mut self) {
        sort_notes(&mut self.notes);
    }
}
