// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tracks every genome variant accepted during one tuning session and
//! resolves `CandidateSelection` into "which of those is the base for
//! the next perturbation attempt".

use protogonos_genome::{CandidateSelection, Genome};
use rand::rngs::StdRng;
use rand::Rng;

const RECENT_WINDOW: usize = 5;

struct Accepted {
    genome: Genome,
    fitness: f64,
}

/// Ordered history of accepted candidates for a single tuning call.
/// Index 0 is always the untouched starting genome.
pub struct CandidateBasesProvider {
    history: Vec<Accepted>,
    best_idx: usize,
    /// First index belonging to the current `TuningDurationPolicy`
    /// generation bucket; advanced externally between policy epochs.
    generation_start: usize,
}

impl CandidateBasesProvider {
    pub fn new(original: Genome, original_fitness: f64) -> Self {
        CandidateBasesProvider {
            history: vec![Accepted {
                genome: original,
                fitness: original_fitness,
            }],
            best_idx: 0,
            generation_start: 0,
        }
    }

    pub fn record_accepted(&mut self, genome: Genome, fitness: f64) {
        self.history.push(Accepted { genome, fitness });
        if fitness > self.history[self.best_idx].fitness {
            self.best_idx = self.history.len() - 1;
        }
    }

    pub fn best(&self) -> (&Genome, f64) {
        (&self.history[self.best_idx].genome, self.history[self.best_idx].fitness)
    }

    /// Begin a new generation bucket for the `lastgen`/`lastgen_random`
    /// policies: candidates accepted from this point on are "this
    /// generation's" candidates until the next call.
    pub fn start_new_generation(&mut self) {
        self.generation_start = self.history.len();
    }

    fn uniform<'a>(&'a self, slice: &'a [Accepted], rng: &mut StdRng) -> &'a Genome {
        if slice.is_empty() {
            // OQ-2: an empty filtered pool falls back to the first
            // (always-present) element of the full unfiltered history.
            return &self.history[0].genome;
        }
        &slice[rng.gen_range(0..slice.len())].genome
    }

    /// Resolve the base genome for the next perturbation attempt.
    pub fn pick(&self, selection: CandidateSelection, rng: &mut StdRng) -> &Genome {
        match selection {
            CandidateSelection::BestSoFar => &self.history[self.best_idx].genome,
            CandidateSelection::Original => &self.history[0].genome,
            CandidateSelection::Current | CandidateSelection::CurrentRandom => {
                &self.history.last().expect("history always has the original entry").genome
            }
            CandidateSelection::All => &self.history.last().unwrap().genome,
            CandidateSelection::AllRandom => self.uniform(&self.history, rng),
            CandidateSelection::Active => &self.history.last().unwrap().genome,
            CandidateSelection::ActiveRandom => self.uniform(&self.history, rng),
            CandidateSelection::Recent => {
                let start = self.history.len().saturating_sub(RECENT_WINDOW);
                &self.history[start..].last().unwrap().genome
            }
            CandidateSelection::RecentRandom => {
                let start = self.history.len().saturating_sub(RECENT_WINDOW);
                self.uniform(&self.history[start..], rng)
            }
            CandidateSelection::Lastgen => {
                let slice = &self.history[self.generation_start.min(self.history.len())..];
                if slice.is_empty() {
                    &self.history[0].genome
                } else {
                    &slice.last().unwrap().genome
                }
            }
            CandidateSelection::LastgenRandom => {
                let slice = &self.history[self.generation_start.min(self.history.len())..];
                self.uniform(slice, rng)
            }
            // Both alias spellings normalize to this one variant: the
            // policy itself is decided per attempt, uniformly among
            // the other concrete strategies.
            CandidateSelection::Dynamic => {
                const OTHERS: [CandidateSelection; 12] = [
                    CandidateSelection::BestSoFar,
                    CandidateSelection::Original,
                    CandidateSelection::All,
                    CandidateSelection::AllRandom,
                    CandidateSelection::Active,
                    CandidateSelection::ActiveRandom,
                    CandidateSelection::Recent,
                    CandidateSelection::RecentRandom,
                    CandidateSelection::Current,
                    CandidateSelection::CurrentRandom,
                    CandidateSelection::Lastgen,
                    CandidateSelection::LastgenRandom,
                ];
                self.pick(OTHERS[rng.gen_range(0..OTHERS.len())], rng)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn empty_recent_window_falls_back_to_original() {
        let provider = CandidateBasesProvider::new(Genome::new("g", 0), 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        let picked = provider.pick(CandidateSelection::RecentRandom, &mut rng);
        assert_eq!(picked.id, "g");
    }

    #[test]
    fn best_so_far_tracks_the_highest_fitness_candidate() {
        let mut provider = CandidateBasesProvider::new(Genome::new("g0", 0), 1.0);
        provider.record_accepted(Genome::new("g1", 1), 5.0);
        provider.record_accepted(Genome::new("g2", 2), 3.0);
        let mut rng = StdRng::seed_from_u64(1);
        let picked = provider.pick(CandidateSelection::BestSoFar, &mut rng);
        assert_eq!(picked.id, "g1");
    }
}
