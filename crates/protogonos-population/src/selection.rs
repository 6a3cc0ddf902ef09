// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Survivor selection strategies. Every strategy returns a list of
//! population indices (duplicates allowed — a genome can be selected
//! as the basis for more than one child).

use protogonos_genome::{Fitness, Genome, SelectionStrategy, SpeciesMetrics};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

fn fitness_of(genomes: &[Genome], idx: usize) -> f64 {
    genomes[idx].meta.fitness.as_ref().map(Fitness::primary).unwrap_or(f64::NEG_INFINITY)
}

fn sorted_by_fitness_desc(genomes: &[Genome]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..genomes.len()).collect();
    indices.sort_by(|&a, &b| fitness_of(genomes, b).partial_cmp(&fitness_of(genomes, a)).unwrap());
    indices
}

fn tournament_pick(genomes: &[Genome], pool: &[usize], size: usize, rng: &mut StdRng) -> usize {
    let size = size.min(pool.len()).max(1);
    let mut best = pool[rng.gen_range(0..pool.len())];
    for _ in 1..size {
        let candidate = pool[rng.gen_range(0..pool.len())];
        if fitness_of(genomes, candidate) > fitness_of(genomes, best) {
            best = candidate;
        }
    }
    best
}

fn elite(genomes: &[Genome], target: usize) -> Vec<usize> {
    sorted_by_fitness_desc(genomes).into_iter().take(target).collect()
}

fn tournament(genomes: &[Genome], pool: &[usize], target: usize, size: usize, rng: &mut StdRng) -> Vec<usize> {
    (0..target).map(|_| tournament_pick(genomes, pool, size, rng)).collect()
}

fn species_tournament(
    genomes: &[Genome],
    species: &BTreeMap<String, Vec<usize>>,
    target: usize,
    tournament_size: usize,
    rng: &mut StdRng,
) -> Vec<usize> {
    if species.is_empty() {
        return Vec::new();
    }
    let total: usize = species.values().map(Vec::len).sum();
    let mut survivors = Vec::with_capacity(target);
    for indices in species.values() {
        let share = ((target as f64) * (indices.len() as f64) / (total.max(1) as f64)).round() as usize;
        let share = share.max(1).min(target.saturating_sub(survivors.len()).max(1));
        survivors.extend(tournament(genomes, indices, share, tournament_size, rng));
        if survivors.len() >= target {
            break;
        }
    }
    survivors.truncate(target.max(1));
    survivors
}

fn rank_select(genomes: &[Genome], target: usize, rng: &mut StdRng) -> Vec<usize> {
    let ordered = sorted_by_fitness_desc(genomes);
    let n = ordered.len();
    if n == 0 {
        return Vec::new();
    }
    // Rank 0 (best) gets weight n, rank n-1 gets weight 1.
    let weights: Vec<f64> = (0..n).map(|rank| (n - rank) as f64).collect();
    let total: f64 = weights.iter().sum();
    (0..target)
        .map(|_| {
            let mut draw = rng.gen_range(0.0..total);
            for (i, w) in weights.iter().enumerate() {
                if draw < *w {
                    return ordered[i];
                }
                draw -= w;
            }
            *ordered.last().unwrap()
        })
        .collect()
}

fn top3(genomes: &[Genome]) -> Vec<usize> {
    sorted_by_fitness_desc(genomes).into_iter().take(3).collect()
}

fn efficiency(genomes: &[Genome], target: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..genomes.len()).collect();
    indices.sort_by(|&a, &b| {
        let score_a = fitness_of(genomes, a) / genomes[a].neurons.len().max(1) as f64;
        let score_b = fitness_of(genomes, b) / genomes[b].neurons.len().max(1) as f64;
        score_b.partial_cmp(&score_a).unwrap()
    });
    indices.into_iter().take(target).collect()
}

fn random_select(genomes: &[Genome], target: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..genomes.len()).collect();
    indices.shuffle(rng);
    indices.truncate(target.min(indices.len()).max(1));
    indices
}

/// Tracks, per species key, generations since its best fitness last
/// improved. `species_shared_tournament` excludes any species whose
/// count reaches the configured stagnation threshold.
#[derive(Debug, Clone, Default)]
pub struct StagnationTracker {
    best_seen: HashMap<String, f64>,
    generations_stagnant: HashMap<String, u32>,
}

impl StagnationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update bookkeeping for the current generation's species metrics
    /// and return the set of species keys that have been stagnant for
    /// `threshold` or more generations.
    pub fn update(&mut self, metrics: &[SpeciesMetrics], threshold: u32) -> Vec<String> {
        let mut stagnant = Vec::new();
        for m in metrics {
            let improved = match self.best_seen.get(&m.species_key) {
                Some(&prev) => m.best_fitness > prev,
                None => true,
            };
            if improved {
                self.best_seen.insert(m.species_key.clone(), m.best_fitness);
                self.generations_stagnant.insert(m.species_key.clone(), 0);
            } else {
                let counter = self.generations_stagnant.entry(m.species_key.clone()).or_insert(0);
                *counter += 1;
                if *counter >= threshold {
                    stagnant.push(m.species_key.clone());
                }
            }
        }
        stagnant
    }
}

#[allow(clippy::too_many_arguments)]
pub fn select(
    genomes: &[Genome],
    species: &BTreeMap<String, Vec<usize>>,
    species_metrics: &[SpeciesMetrics],
    strategy: SelectionStrategy,
    target: usize,
    tournament_size: usize,
    stagnation: &mut StagnationTracker,
    stagnation_threshold: u32,
    rng: &mut StdRng,
) -> Vec<usize> {
    let target = target.max(1);
    match strategy {
        SelectionStrategy::Elite => elite(genomes, target),
        SelectionStrategy::Tournament => {
            let pool: Vec<usize> = (0..genomes.len()).collect();
            tournament(genomes, &pool, target, tournament_size, rng)
        }
        SelectionStrategy::SpeciesTournament => species_tournament(genomes, species, target, tournament_size, rng),
        SelectionStrategy::SpeciesSharedTournament => {
            let stagnant = stagnation.update(species_metrics, stagnation_threshold);
            let active: BTreeMap<String, Vec<usize>> = species
                .iter()
                .filter(|(key, _)| !stagnant.contains(key))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let active = if active.is_empty() { species.clone() } else { active };
            species_tournament(genomes, &active, target, tournament_size, rng)
        }
        SelectionStrategy::Rank => rank_select(genomes, target, rng),
        SelectionStrategy::Top3 => {
            let champions = top3(genomes);
            if champions.is_empty() {
                return Vec::new();
            }
            (0..target).map(|i| champions[i % champions.len()]).collect()
        }
        SelectionStrategy::Efficiency => efficiency(genomes, target),
        SelectionStrategy::Random => random_select(genomes, target, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn scored(id: &str, fitness: f64) -> Genome {
        let mut g = Genome::new(id, 0);
        g.meta.fitness = Some(Fitness::Scalar(fitness));
        g
    }

    #[test]
    fn elite_picks_highest_fitness_first() {
        let genomes = vec![scored("a", 1.0), scored("b", 5.0), scored("c", 3.0)];
        let picked = elite(&genomes, 2);
        assert_eq!(picked, vec![1, 2]);
    }

    #[test]
    fn top3_never_returns_more_than_three() {
        let genomes: Vec<Genome> = (0..10).map(|i| scored(&format!("g{i}"), i as f64)).collect();
        assert_eq!(top3(&genomes).len(), 3);
    }

    #[test]
    fn stagnation_tracker_flags_unimproved_species() {
        let mut tracker = StagnationTracker::new();
        let metrics = vec![SpeciesMetrics {
            species_key: "s1".into(),
            size: 4,
            mean_fitness: 1.0,
            best_fitness: 1.0,
        }];
        tracker.update(&metrics, 2);
        let stagnant = tracker.update(&metrics, 2);
        assert_eq!(stagnant, vec!["s1".to_string()]);
    }

    #[test]
    fn tournament_always_returns_target_count() {
        let genomes = vec![scored("a", 1.0), scored("b", 2.0), scored("c", 3.0)];
        let pool: Vec<usize> = (0..genomes.len()).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let picked = tournament(&genomes, &pool, 5, 2, &mut rng);
        assert_eq!(picked.len(), 5);
    }
}
