//! Pseudorandom streams used by every stochastic stage of the pipeline.
//!
//! Generation never touches a hidden global generator. Callers either seed a
//! stream explicitly for reproducible charts or ask for an entropy seeded one
//! for interactive use, and pass it by mutable reference into each call.

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Creates a deterministic PCG32 stream from a 64-bit seed.
pub fn create_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Creates a PCG32 stream seeded from operating system entropy.
pub fn entropy_rng() -> Pcg32 {
    Pcg32::from_entropy()
}

/// Derives an independent seed for regenerating the window `[start, end)`.
///
/// The base seed and the window bounds are hashed with BLAKE3 so that
/// non-overlapping windows regenerated on separate threads draw from
/// unrelated streams while staying reproducible.
pub fn derive_section_seed(base_seed: u64, start: f64, end: f64) -> u64 {
    let mut input = Vec::with_capacity(24);
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(&start.to_bits().to_le_bytes());
    input.extend_from_slice(&end.to_bits().to_le_bytes());

    let hash = blake3::hash(&input);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}
