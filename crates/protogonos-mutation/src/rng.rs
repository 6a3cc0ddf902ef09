// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Deterministic per-genome RNG derivation.
//!
//! Every mutation call site is handed an explicit `StdRng` seeded from
//! a 64-bit integer rather than reaching for a thread-local generator,
//! so a run with the same top-level seed produces bit-identical
//! genomes regardless of worker count or scheduling order.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// SplitMix64, used only to derive independent-looking sub-seeds from
/// a single run seed; not used as a sampling generator itself.
pub fn splitmix64(mut seed: u64) -> u64 {
    seed = seed.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = seed;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive the seed for one genome's mutation/evaluation RNG from the
/// run seed, generation and population index. Stable regardless of
/// worker count: two runs with the same `(run_seed, generation,
/// index)` always derive the same seed.
pub fn seed_for_index(run_seed: u64, generation: u64, index: usize) -> u64 {
    let mixed = run_seed ^ splitmix64(generation) ^ splitmix64(index as u64);
    splitmix64(mixed)
}

pub fn rng_for_index(run_seed: u64, generation: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(seed_for_index(run_seed, generation, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_derivation_is_deterministic() {
        assert_eq!(
            seed_for_index(42, 3, 7),
            seed_for_index(42, 3, 7)
        );
    }

    #[test]
    fn seed_derivation_is_sensitive_to_every_component() {
        let base = seed_for_index(42, 3, 7);
        assert_ne!(base, seed_for_index(43, 3, 7));
        assert_ne!(base, seed_for_index(42, 4, 7));
        assert_ne!(base, seed_for_index(42, 3, 8));
    }
}
