//! Reduces raw beat and onset series to the candidate times that become notes.

use rand::Rng;

use crate::{analysis::beat_duration, AnalysisInput, DifficultyProfile};

/// Fraction of a beat within which an onset counts as sitting on that beat.
const BEAT_TOLERANCE_FRACTION: f64 = 0.25;

/// Produces strictly increasing candidate note times for a whole song.
///
/// Beats always survive the merge. Off-beat onsets must first clear the
/// profile's strength threshold relative to the loudest onset and then win a
/// `1 - beat_weight` draw; onsets close to a beat are dropped outright rather
/// than snapped onto it. The merged set is finally thinned so consecutive
/// times are at least `min_interval_seconds` apart.
pub fn filter_onsets<R: Rng + ?Sized>(
    input: &AnalysisInput,
    profile: &DifficultyProfile,
    rng: &mut R,
) -> Vec<f64> {
    let mut candidates = if profile.use_beats_only {
        input.beat_times.clone()
    } else {
        let strong = strong_onsets(input, profile.onset_threshold);
        merge_with_beats(
            &strong,
            &input.beat_times,
            beat_tolerance(input.tempo_bpm),
            profile.beat_weight,
            rng,
        )
    };

    candidates.retain(|time| (0.0..=input.duration_seconds).contains(time));
    sort_and_dedup(&mut candidates);
    collapse_min_interval(&candidates, profile.min_interval_seconds)
}

/// Candidate times for regenerating a section from an already selected slice
/// of onsets.
///
/// Only the beats lying between the first and last selected onset take part
/// in the merge, and no strength threshold is applied. Times outside
/// `[0, duration]` are discarded as in [`filter_onsets`]. An empty selection
/// yields no candidates.
pub fn filter_section<R: Rng + ?Sized>(
    onsets: &[f64],
    input: &AnalysisInput,
    profile: &DifficultyProfile,
    rng: &mut R,
) -> Vec<f64> {
    let (Some(first), Some(last)) = (
        onsets.iter().copied().reduce(f64::min),
        onsets.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    let range_beats: Vec<f64> = input
        .beat_times
        .iter()
        .copied()
        .filter(|beat| (first..=last).contains(beat))
        .collect();

    let mut candidates = merge_with_beats(
        onsets,
        &range_beats,
        beat_tolerance(input.tempo_bpm),
        profile.beat_weight,
        rng,
    );
    candidates.retain(|time| (0.0..=input.duration_seconds).contains(time));
    sort_and_dedup(&mut candidates);
    collapse_min_interval(&candidates, profile.min_interval_seconds)
}

/// Greedy left-to-right thinning: the first time is always kept and each
/// later time only if it lands at least `min_interval` after the last kept
/// one.
pub fn collapse_min_interval(sorted_times: &[f64], min_interval: f64) -> Vec<f64> {
    let mut kept: Vec<f64> = Vec::with_capacity(sorted_times.len());
    for &time in sorted_times {
        match kept.last() {
            Some(&last) if time - last < min_interval => {}
            _ => kept.push(time),
        }
    }
    kept
}

/// A quarter of a beat at the given tempo.
pub fn beat_tolerance(tempo_bpm: f64) -> f64 {
    beat_duration(tempo_bpm) * BEAT_TOLERANCE_FRACTION
}

fn strong_onsets(input: &AnalysisInput, threshold: f64) -> Vec<f64> {
    let strengths: Vec<f64> = input
        .onset_times
        .iter()
        .map(|&time| input.energy_at(time))
        .collect();
    let peak = strengths.iter().copied().fold(0.0_f64, f64::max);

    if peak <= 0.0 {
        return input.onset_times.clone();
    }

    let cutoff = threshold * peak;
    input
        .onset_times
        .iter()
        .zip(&strengths)
        .filter(|(_, &strength)| strength >= cutoff)
        .map(|(&time, _)| time)
        .collect()
}

fn merge_with_beats<R: Rng + ?Sized>(
    onsets: &[f64],
    beats: &[f64],
    tolerance: f64,
    beat_weight: f64,
    rng: &mut R,
) -> Vec<f64> {
    let mut merged = beats.to_vec();
    for &onset in onsets {
        if near_any_beat(onset, beats, tolerance) {
            continue;
        }
        if rng.gen::<f64>() >= beat_weight {
            merged.push(onset);
        }
    }
    merged
}

fn near_any_beat(time: f64, sorted_beats: &[f64], tolerance: f64) -> bool {
    let index = sorted_beats.partition_point(|&beat| beat < time);
    let after = sorted_beats.get(index);
    let before = index.checked_sub(1).and_then(|i| sorted_beats.get(i));

    [before, after]
        .into_iter()
        .flatten()
        .any(|&beat| (time - beat).abs() < tolerance)
}

fn sort_and_dedup(times: &mut Vec<f64>) {
    times.sort_by(f64::total_cmp);
    times.dedup();
}
