//! Upgrades a random subset of tap notes into hold notes.

use std::collections::HashMap;

use rand::Rng;

use crate::{analysis::beat_duration, chart::sort_notes, DifficultyProfile, Note};

/// Gap to the next same-lane note a hold needs before it may end on it.
pub const MIN_HOLD_DURATION: f64 = 0.2;
pub const MAX_HOLD_DURATION: f64 = 2.0;
/// Share of the gap to the next same-lane note a hold may cover.
const HOLD_GAP_RATIO: f64 = 0.8;

/// Sorts `notes` into chart order and turns some of them into holds.
///
/// Each note becomes a hold with the profile's hold probability. A hold ends
/// at 80% of the way to the next note in its lane. Notes with no later
/// same-lane note hold for one to three beats instead. A note whose next
/// same-lane neighbour is closer than [`MIN_HOLD_DURATION`] stays a tap.
/// Durations never exceed [`MAX_HOLD_DURATION`].
pub fn convert_holds<R: Rng + ?Sized>(
    mut notes: Vec<Note>,
    tempo_bpm: f64,
    profile: &DifficultyProfile,
    rng: &mut R,
) -> Vec<Note> {
    sort_notes(&mut notes);
    if profile.hold_probability <= 0.0 {
        return notes;
    }

    let successors = next_same_lane_times(&notes);
    let beat = beat_duration(tempo_bpm);

    for (note, successor) in notes.iter_mut().zip(successors) {
        if rng.gen::<f64>() >= profile.hold_probability {
            continue;
        }

        note.duration = match successor {
            Some(next) if next - note.time > MIN_HOLD_DURATION => {
                ((next - note.time) * HOLD_GAP_RATIO).min(MAX_HOLD_DURATION)
            }
            Some(_) => 0.0,
            None => (beat * rng.gen_range(1..=3) as f64).min(MAX_HOLD_DURATION),
        };
    }

    notes
}

/// Shortens holds in `notes` so each ends before the next note sharing its
/// lane in `neighbours`, keeping the same 80% margin used during conversion.
/// Holds left with nothing to sustain become taps.
pub fn fit_holds_before(notes: &mut [Note], neighbours: &[Note]) {
    for note in notes.iter_mut().filter(|note| note.is_hold()) {
        let next = neighbours
            .iter()
            .filter(|other| other.lane == note.lane && other.time > note.time)
            .map(|other| other.time)
            .reduce(f64::min);

        if let Some(next) = next {
            let limit = (next - note.time) * HOLD_GAP_RATIO;
            if note.duration > limit {
                note.duration = if next - note.time > MIN_HOLD_DURATION {
                    limit
                } else {
                    0.0
                };
            }
        }
    }
}

/// For each note in chart order, the time of the next note in the same lane.
fn next_same_lane_times(sorted: &[Note]) -> Vec<Option<f64>> {
    let mut upcoming: HashMap<usize, f64> = HashMap::new();
    let mut result = vec![None; sorted.len()];

    for (index, note) in sorted.iter().enumerate().rev() {
        result[index] = upcoming.insert(note.lane, note.time);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rng::create_rng, DifficultyLevel};

    fn always_hold() -> DifficultyProfile {
        DifficultyProfile {
            hold_probability: 1.0,
            ..DifficultyLevel::Master.profile()
        }
    }

    #[test]
    fn zero_probability_only_sorts() {
        let notes = vec![Note::tap(1.0, 1), Note::tap(0.5, 2), Note::tap(1.0, 0)];
        let profile = DifficultyLevel::Easy.profile();
        let converted = convert_holds(notes, 120.0, &profile, &mut create_rng(1));

        assert_eq!(
            converted,
            vec![Note::tap(0.5, 2), Note::tap(1.0, 0), Note::tap(1.0, 1)]
        );
    }

    #[test]
    fn holds_stop_short_of_next_same_lane_note() {
        let notes = vec![Note::tap(0.0, 0), Note::tap(1.0, 0), Note::tap(0.5, 1)];
        let converted = convert_holds(notes, 120.0, &always_hold(), &mut create_rng(4));

        assert!((converted[0].duration - 0.8).abs() < 1e-12);
        assert!(converted[0].end_time() <= converted[2].time);
    }

    #[test]
    fn long_gaps_are_capped() {
        let notes = vec![Note::tap(0.0, 0), Note::tap(10.0, 0)];
        let converted = convert_holds(notes, 120.0, &always_hold(), &mut create_rng(4));
        assert_eq!(converted[0].duration, MAX_HOLD_DURATION);
    }

    #[test]
    fn last_note_in_lane_holds_whole_beats() {
        let notes = vec![Note::tap(0.0, 3)];
        let converted = convert_holds(notes, 120.0, &always_hold(), &mut create_rng(6));

        let beats = converted[0].duration / 0.5;
        assert!((beats - beats.round()).abs() < 1e-9);
        assert!((1.0..=3.0).contains(&beats.round()));
    }

    #[test]
    fn crowded_notes_stay_taps() {
        let notes = vec![Note::tap(0.0, 2), Note::tap(0.1, 2)];
        let converted = convert_holds(notes, 120.0, &always_hold(), &mut create_rng(6));
        assert_eq!(converted[0].duration, 0.0);
        assert!(converted[1].duration > 0.0);
    }

    #[test]
    fn fitting_respects_neighbour_lanes() {
        let mut notes = vec![Note::hold(1.0, 0, 1.5), Note::hold(1.0, 1, 1.5)];
        let neighbours = [Note::tap(2.0, 0), Note::tap(1.1, 3)];
        fit_holds_before(&mut notes, &neighbours);

        assert!((notes[0].duration - 0.8).abs() < 1e-12);
        assert_eq!(notes[1].duration, 1.5);
    }
}
