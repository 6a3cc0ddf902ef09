// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fitness shaping applied after evaluation and before selection.

use protogonos_genome::{Fitness, FitnessPostprocessing, Genome};

/// Pluggable behavioral-distance metric used by `novelty_proportional`.
/// A scape with a richer behavior trace can supply a sharper metric;
/// the default below only looks at structural fingerprint.
pub trait BehaviorDistance: Send + Sync {
    fn distance(&self, a: &Genome, b: &Genome) -> f64;
}

/// Structural-only fallback: `0.0` for genomes sharing a fingerprint,
/// `1.0` otherwise. Good enough to break ties among clones; a scape
/// wanting real behavioral novelty should supply its own metric.
pub struct FingerprintDistance;

impl BehaviorDistance for FingerprintDistance {
    fn distance(&self, a: &Genome, b: &Genome) -> f64 {
        if a.fingerprint() == b.fingerprint() {
            0.0
        } else {
            1.0
        }
    }
}

const SIZE_PENALTY_PER_NEURON: f64 = 0.01;
const NOVELTY_WEIGHT: f64 = 0.25;

/// Rewrite each genome's `meta.fitness` in place according to `mode`.
/// Vector fitness is first reduced to `primary()`; postprocessing only
/// ever produces a scalar back, since size/novelty shaping has no
/// natural per-component meaning.
pub fn postprocess(genomes: &mut [Genome], mode: FitnessPostprocessing, behavior_distance: &dyn BehaviorDistance) {
    match mode {
        FitnessPostprocessing::None => {}
        FitnessPostprocessing::SizeProportional => {
            for genome in genomes.iter_mut() {
                if let Some(fitness) = &genome.meta.fitness {
                    let penalty = SIZE_PENALTY_PER_NEURON * genome.neurons.len() as f64;
                    genome.meta.fitness = Some(Fitness::Scalar(fitness.primary() - penalty));
                }
            }
        }
        FitnessPostprocessing::NoveltyProportional => {
            let bonuses: Vec<f64> = genomes
                .iter()
                .enumerate()
                .map(|(i, g)| {
                    if genomes.len() <= 1 {
                        return 0.0;
                    }
                    let total: f64 = genomes
                        .iter()
                        .enumerate()
                        .filter(|(j, _)| *j != i)
                        .map(|(_, other)| behavior_distance.distance(g, other))
                        .sum();
                    total / (genomes.len() - 1) as f64
                })
                .collect();
            for (genome, bonus) in genomes.iter_mut().zip(bonuses) {
                if let Some(fitness) = &genome.meta.fitness {
                    genome.meta.fitness = Some(Fitness::Scalar(fitness.primary() + NOVELTY_WEIGHT * bonus));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: &str, neuron_count: usize, fitness: f64) -> Genome {
        let mut g = Genome::new(id, 0);
        for i in 0..neuron_count {
            g.neurons.push(protogonos_genome::Neuron::new(format!("n{i}"), 0));
        }
        g.meta.fitness = Some(Fitness::Scalar(fitness));
        g.meta.fingerprint = g.fingerprint();
        g
    }

    #[test]
    fn size_proportional_penalizes_larger_genomes_more() {
        let mut genomes = vec![scored("a", 2, 1.0), scored("b", 20, 1.0)];
        postprocess(&mut genomes, FitnessPostprocessing::SizeProportional, &FingerprintDistance);
        let a = genomes[0].meta.fitness.as_ref().unwrap().primary();
        let b = genomes[1].meta.fitness.as_ref().unwrap().primary();
        assert!(a > b);
    }

    #[test]
    fn novelty_rewards_structural_distinctness() {
        let mut genomes = vec![scored("a", 3, 1.0), scored("b", 3, 1.0), scored("c", 9, 1.0)];
        postprocess(&mut genomes, FitnessPostprocessing::NoveltyProportional, &FingerprintDistance);
        let c = genomes[2].meta.fitness.as_ref().unwrap().primary();
        let a = genomes[0].meta.fitness.as_ref().unwrap().primary();
        assert!(c > a);
    }

    #[test]
    fn none_mode_leaves_fitness_untouched() {
        let mut genomes = vec![scored("a", 2, 3.0)];
        postprocess(&mut genomes, FitnessPostprocessing::None, &FingerprintDistance);
        assert_eq!(genomes[0].meta.fitness.as_ref().unwrap().primary(), 3.0);
    }
}
