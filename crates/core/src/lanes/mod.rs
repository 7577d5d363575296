//! Maps candidate times onto lanes.
//!
//! A single complexity knob controls both how often chords appear and how far
//! consecutive notes may jump across the keyboard. Low complexity charts
//! favour lanes next to the previous one so patterns flow under the hand.

use std::collections::VecDeque;

use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};

use crate::{DifficultyProfile, Note, Result};

/// Number of previously used lanes remembered across the whole pass.
const LANE_HISTORY: usize = 4;
/// Scales pattern complexity into the chance of emitting a chord.
const CHORD_CHANCE_SCALE: f64 = 0.3;

/// Assigns lanes to every candidate time, producing tap notes in time order.
///
/// `num_keys` must already be validated to be at least one.
pub fn assign_lanes<R: Rng + ?Sized>(
    times: &[f64],
    num_keys: usize,
    profile: &DifficultyProfile,
    rng: &mut R,
) -> Result<Vec<Note>> {
    let mut assigner = LaneAssigner::new(num_keys, profile);
    let mut notes = Vec::with_capacity(times.len());

    for &time in times {
        for lane in assigner.next_lanes(rng)? {
            notes.push(Note::tap(time, lane));
        }
    }

    Ok(notes)
}

/// Lane picking state carried from one candidate time to the next.
#[derive(Debug)]
pub struct LaneAssigner {
    num_keys: usize,
    max_chord: usize,
    complexity: f64,
    recent: VecDeque<usize>,
}

impl LaneAssigner {
    pub fn new(num_keys: usize, profile: &DifficultyProfile) -> Self {
        Self {
            num_keys,
            max_chord: profile.max_simultaneous.min(num_keys).max(1),
            complexity: profile.pattern_complexity,
            recent: VecDeque::with_capacity(LANE_HISTORY),
        }
    }

    /// Lanes used most recently, oldest first.
    pub fn recent_lanes(&self) -> impl Iterator<Item = usize> + '_ {
        self.recent.iter().copied()
    }

    /// Picks the distinct lanes for the next candidate time.
    pub fn next_lanes<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<usize>> {
        let count = self.chord_size(rng);
        let anchor = self
            .recent
            .back()
            .copied()
            .unwrap_or(self.num_keys / 2);

        let mut available: Vec<usize> = (0..self.num_keys).collect();
        let mut chosen = Vec::with_capacity(count);

        while chosen.len() < count && !available.is_empty() {
            let uniform = rng.gen::<f64>() < self.complexity;
            let weights: Vec<f64> = available
                .iter()
                .map(|&lane| {
                    if uniform {
                        1.0
                    } else {
                        1.0 / (1.0 + lane.abs_diff(anchor) as f64)
                    }
                })
                .collect();

            let pick = WeightedIndex::new(&weights)?.sample(rng);
            chosen.push(available.remove(pick));
        }

        for &lane in &chosen {
            if self.recent.len() == LANE_HISTORY {
                self.recent.pop_front();
            }
            self.recent.push_back(lane);
        }

        Ok(chosen)
    }

    fn chord_size<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        if rng.gen::<f64>() < self.complexity * CHORD_CHANCE_SCALE {
            rng.gen_range(1..=self.max_chord)
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{rng::create_rng, DifficultyLevel};

    #[test]
    fn lanes_stay_in_bounds_and_distinct_per_time() {
        let times: Vec<f64> = (0..400).map(|i| i as f64 * 0.1).collect();
        let profile = DifficultyLevel::Master.profile();
        let notes = assign_lanes(&times, 5, &profile, &mut create_rng(11)).unwrap();

        assert!(notes.len() >= times.len());
        assert!(notes.iter().all(|note| note.lane < 5 && note.duration == 0.0));
        assert!(notes.windows(2).all(|pair| pair[0].time <= pair[1].time));

        for &time in &times {
            let lanes: Vec<usize> = notes
                .iter()
                .filter(|note| note.time == time)
                .map(|note| note.lane)
                .collect();
            let unique: HashSet<usize> = lanes.iter().copied().collect();
            assert_eq!(unique.len(), lanes.len());
            assert!(!lanes.is_empty() && lanes.len() <= 4);
        }
    }

    #[test]
    fn single_lane_chart_always_uses_lane_zero() {
        let times = [0.0, 0.5, 1.0];
        let profile = DifficultyLevel::Master.profile();
        let notes = assign_lanes(&times, 1, &profile, &mut create_rng(2)).unwrap();
        assert_eq!(notes.len(), 3);
        assert!(notes.iter().all(|note| note.lane == 0));
    }

    #[test]
    fn single_note_profiles_never_chord() {
        let times: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let profile = DifficultyLevel::Easy.profile();
        let notes = assign_lanes(&times, 6, &profile, &mut create_rng(8)).unwrap();
        assert_eq!(notes.len(), times.len());
    }

    #[test]
    fn history_keeps_last_four_lanes() {
        let profile = DifficultyLevel::Master.profile();
        let mut assigner = LaneAssigner::new(6, &profile);
        let mut rng = create_rng(21);
        let mut used = Vec::new();
        for _ in 0..10 {
            used.extend(assigner.next_lanes(&mut rng).unwrap());
        }

        let recent: Vec<usize> = assigner.recent_lanes().collect();
        assert_eq!(recent, used[used.len() - 4..].to_vec());
    }

    #[test]
    fn low_complexity_prefers_adjacent_lanes() {
        let mut profile = DifficultyLevel::Easy.profile();
        profile.pattern_complexity = 0.0;
        let times: Vec<f64> = (0..2000).map(|i| i as f64).collect();
        let notes = assign_lanes(&times, 6, &profile, &mut create_rng(13)).unwrap();

        let jumps: f64 = notes
            .windows(2)
            .map(|pair| pair[0].lane.abs_diff(pair[1].lane) as f64)
            .sum::<f64>()
            / (notes.len() - 1) as f64;

        // Uniform picks over six lanes average a jump of roughly 1.94.
        assert!(jumps < 1.6, "mean jump was {jumps}");
    }
}
