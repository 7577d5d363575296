use std::collections::HashSet;

use crate::Note;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

const DENSITY_SCALE: f64 = 1.5;
const HOLD_WEIGHT: f64 = 0.5;
const CHORD_WEIGHT: f64 = 0.5;

/// Rates a finished note set on a 1 to 10 scale.
///
/// Note density sets the base rating, which is then scaled up by the share
/// of hold notes and by the share of notes that land on an already occupied
/// time (compared at millisecond precision).
pub fn score_difficulty(notes: &[Note], duration_seconds: f64) -> u8 {
    if !(duration_seconds.is_finite() && duration_seconds > 0.0) || notes.is_empty() {
        return MIN_RATING;
    }

    let count = notes.len() as f64;
    let nps = count / duration_seconds;
    let base = clamp_rating((nps * DENSITY_SCALE).round());

    let holds = notes.iter().filter(|note| note.is_hold()).count() as f64;
    let hold_factor = 1.0 + holds / count * HOLD_WEIGHT;

    let unique_times: HashSet<i64> = notes
        .iter()
        .map(|note| (note.time * 1000.0).round() as i64)
        .collect();
    let shared = count - unique_times.len() as f64;
    let chord_factor = 1.0 + shared / count * CHORD_WEIGHT;

    clamp_rating((f64::from(base) * hold_factor * chord_factor).round())
}

fn clamp_rating(value: f64) -> u8 {
    value.clamp(f64::from(MIN_RATING), f64::from(MAX_RATING)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taps(count: usize, spacing: f64) -> Vec<Note> {
        (0..count)
            .map(|i| Note::tap(i as f64 * spacing, 0))
            .collect()
    }

    #[test]
    fn degenerate_inputs_rate_one() {
        assert_eq!(score_difficulty(&[], 10.0), 1);
        assert_eq!(score_difficulty(&taps(5, 1.0), 0.0), 1);
        assert_eq!(score_difficulty(&taps(5, 1.0), -3.0), 1);
        assert_eq!(score_difficulty(&taps(5, 1.0), f64::NAN), 1);
        assert_eq!(score_difficulty(&taps(5, 1.0), f64::INFINITY), 1);
    }

    #[test]
    fn density_drives_the_base_rating() {
        // Two notes per second rounds to a base of three.
        assert_eq!(score_difficulty(&taps(20, 0.5), 10.0), 3);
        assert_eq!(score_difficulty(&taps(1, 1.0), 100.0), 1);
        assert_eq!(score_difficulty(&taps(500, 0.01), 5.0), 10);
    }

    #[test]
    fn holds_and_chords_raise_the_rating() {
        let mut notes = taps(20, 0.5);
        for note in notes.iter_mut() {
            note.duration = 0.2;
        }
        // 3 * 1.5 = 4.5, rounded away from zero.
        assert_eq!(score_difficulty(&notes, 10.0), 5);

        let mut chords = taps(10, 1.0);
        chords.extend((0..10).map(|i| Note::tap(i as f64 + 0.0001, 1)));
        // Base 3, half the notes share a millisecond with another: 3 * 1.25.
        assert_eq!(score_difficulty(&chords, 10.0), 4);
    }
}
