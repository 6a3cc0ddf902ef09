// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! The per-generation pipeline: evaluate, diagnose, speciate,
//! postprocess fitness, select, tune elites, reproduce.

use crate::config::PopulationConfig;
use crate::fitness_postprocess::{postprocess, BehaviorDistance, FingerprintDistance};
use crate::selection::{select, StagnationTracker};
use crate::speciation::{diff_species, fingerprint_diversity, speciate, species_metrics};
use crate::tune_budget::tune_attempts_for_generation;
use protogonos_eval::EvalPool;
use protogonos_genome::{
    Fitness, GenerationDiagnostics, Genome, LineageRecord, ProtoError, ProtoResult, SpeciesGeneration,
    TuningCounters,
};
use protogonos_mutation::{default_catalog, reproduce, rng_for_index, seed_for_index, MutationCatalogEntry};
use protogonos_scape::Scape;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Everything one `run_generation` call produces, handed back to the
/// run controller for persistence and early-stop decisions.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub diagnostics: GenerationDiagnostics,
    pub species_generation: SpeciesGeneration,
    pub lineage: Vec<LineageRecord>,
    pub species_keys: BTreeSet<String>,
    pub goal_reached: bool,
    pub evaluations_this_generation: u64,
}

pub struct PopulationLoop {
    config: PopulationConfig,
    scape: Arc<dyn Scape>,
    eval_pool: EvalPool,
    catalog: Vec<MutationCatalogEntry>,
    behavior_distance: Box<dyn BehaviorDistance>,
    stagnation: StagnationTracker,
}

/// Tuning-session seeds are drawn from an index range disjoint from
/// evaluation's `0..population_size`, so the two never reuse a
/// `splitmix64` stream within the same generation.
fn tuning_seed_index(population_size: usize, survivor_slot: usize) -> usize {
    population_size.saturating_mul(2) + survivor_slot
}

impl PopulationLoop {
    pub fn new(config: PopulationConfig, scape: Arc<dyn Scape>) -> ProtoResult<Self> {
        config.validate()?;
        let eval_pool = EvalPool::new(Arc::clone(&scape), config.worker_count)?;
        Ok(PopulationLoop {
            config,
            scape,
            eval_pool,
            catalog: default_catalog(),
            behavior_distance: Box::new(FingerprintDistance),
            stagnation: StagnationTracker::new(),
        })
    }

    pub fn seed_population(&self, run_seed: u64) -> Vec<Genome> {
        crate::seed::seed_population(
            self.config.population_size,
            &self.scape.sensor_templates(),
            &self.scape.actuator_templates(),
            run_seed,
        )
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Run one generation in place on `population`, replacing its
    /// contents with the next generation's population and returning
    /// this generation's diagnostics. `previous_species_keys` should
    /// be the `species_keys` of the prior call's outcome (empty set
    /// for generation 0).
    pub fn run_generation(
        &mut self,
        population: &mut Vec<Genome>,
        previous_species_keys: &BTreeSet<String>,
        run_seed: u64,
        generation: u64,
        cancel: &AtomicBool,
    ) -> ProtoResult<GenerationOutcome> {
        // 1. Evaluate.
        let outcomes = self.eval_pool.evaluate_generation(population, run_seed, generation, cancel);
        for (genome, outcome) in population.iter_mut().zip(outcomes.iter()) {
            match &outcome.result {
                Ok(fitness) => genome.meta.fitness = Some(fitness.clone()),
                Err(ProtoError::Cancelled) => return Err(ProtoError::Cancelled),
                Err(err) => {
                    tracing::warn!(genome_id = %genome.id, error = %err, "scape evaluation failed; applying sentinel fitness");
                    genome.meta.fitness = Some(Fitness::Scalar(self.config.sentinel_fitness));
                }
            }
            genome.meta.fingerprint = genome.fingerprint();
        }
        let mut evaluations_this_generation = population.len() as u64;

        // 2. Diagnostics (raw, pre-postprocessing fitness).
        let scores: Vec<f64> = population.iter().filter_map(|g| g.meta.fitness.as_ref().map(Fitness::primary)).collect();
        let best_fitness = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min_fitness = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let mean_fitness = if scores.is_empty() { 0.0 } else { scores.iter().sum::<f64>() / scores.len() as f64 };

        let diversity = fingerprint_diversity(population);

        // 3. Speciate.
        let groups = speciate(population, self.config.speciation_mode);
        let species_keys: BTreeSet<String> = groups.keys().cloned().collect();
        let (added, removed) = diff_species(&species_keys, previous_species_keys);
        let metrics = species_metrics(population, &groups);
        let species_generation = SpeciesGeneration {
            generation,
            species: metrics.clone(),
            added,
            removed,
        };

        // 4. Fitness postprocessing.
        postprocess(population, self.config.fitness_postprocessing, self.behavior_distance.as_ref());

        // 5. Selection.
        let mut select_rng = StdRng::seed_from_u64(seed_for_index(run_seed, generation, usize::MAX));
        let target = self.config.survivor_count();
        let survivors = select(
            population,
            &groups,
            &metrics,
            self.config.selection_strategy,
            target,
            self.config.tournament_size,
            &mut self.stagnation,
            self.config.stagnation_generations,
            &mut select_rng,
        );
        let mut unique_survivors: Vec<usize> = survivors.clone();
        unique_survivors.sort_unstable();
        unique_survivors.dedup();

        // 6. Tuning, per distinct elite.
        let mut tuning_counters = TuningCounters::default();
        for (slot, &idx) in unique_survivors.iter().enumerate() {
            let attempts = tune_attempts_for_generation(
                self.config.tune_attempt_policy,
                self.config.tune_base_attempts,
                self.config.tune_min_attempts,
                generation,
                self.config.expected_total_generations,
                &population[idx],
            );
            if attempts == 0 && self.config.tune_base_attempts == 0 {
                continue;
            }
            let tune_seed = seed_for_index(run_seed, generation, tuning_seed_index(population.len(), slot));
            let scape = Arc::clone(&self.scape);
            let genome_id = population[idx].id.clone();
            let report = protogonos_tuner::tune(&population[idx], attempts, tune_seed, self.config.fitness_goal, move |candidate: &Genome| {
                scape
                    .evaluate(candidate, tune_seed)
                    .map_err(|err| protogonos_tuner::scape_failure(genome_id.clone(), err.to_string()))
            })?;
            evaluations_this_generation += report.counters.evaluations;
            tuning_counters.merge(&report.counters);
            population[idx] = report.genome;
            population[idx].meta.fitness = Some(report.fitness);
            population[idx].meta.fingerprint = population[idx].fingerprint();
        }

        let tuned_best = population
            .iter()
            .filter_map(|g| g.meta.fitness.as_ref().map(Fitness::primary))
            .fold(f64::NEG_INFINITY, f64::max);
        let best_fitness = best_fitness.max(tuned_best);

        let goal_reached = self.config.fitness_goal.map(|goal| best_fitness >= goal).unwrap_or(false);

        // 7. Reproduction: survivors carry over verbatim, the rest of
        // the next population is mutated children of a cyclic pick
        // over survivors.
        let mut next_population: Vec<Genome> = Vec::with_capacity(self.config.population_size);
        let mut lineage = Vec::new();
        for &idx in &survivors {
            let mut carried = population[idx].clone();
            carried.meta.champion = true;
            next_population.push(carried);
        }
        next_population.truncate(self.config.population_size);

        let mut child_index = 0usize;
        while next_population.len() < self.config.population_size {
            if survivors.is_empty() {
                break;
            }
            let parent_idx = survivors[child_index % survivors.len()];
            let parent = &population[parent_idx];
            let mut rng = rng_for_index(run_seed, generation, population.len() + child_index);
            let child_id = format!("g{generation}_{child_index}");
            let (child, record) = reproduce(
                parent,
                child_id,
                self.config.topological_count_policy,
                &self.config.topological_count_params,
                &self.catalog,
                &self.config.mutation_context,
                &mut rng,
            );
            lineage.push(record);
            next_population.push(child);
            child_index += 1;
        }

        *population = next_population;

        let diagnostics = GenerationDiagnostics {
            generation,
            best_fitness: if best_fitness.is_finite() { best_fitness } else { 0.0 },
            mean_fitness,
            min_fitness: if min_fitness.is_finite() { min_fitness } else { 0.0 },
            species_count: groups.len(),
            fingerprint_diversity: diversity,
            tuning: tuning_counters,
        };

        Ok(GenerationOutcome {
            diagnostics,
            species_generation,
            lineage,
            species_keys,
            goal_reached,
            evaluations_this_generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protogonos_genome::{FitnessPostprocessing, SelectionStrategy, SpeciationMode};
    use protogonos_scape::XorScape;

    fn config() -> PopulationConfig {
        PopulationConfig {
            population_size: 8,
            worker_count: 2,
            elite_count: 2,
            survival_percentage: 0.0,
            speciation_mode: SpeciationMode::Topology,
            fitness_postprocessing: FitnessPostprocessing::None,
            selection_strategy: SelectionStrategy::Elite,
            ..PopulationConfig::default()
        }
    }

    #[test]
    fn one_generation_preserves_population_size() {
        let mut loop_ = PopulationLoop::new(config(), Arc::new(XorScape)).unwrap();
        let mut population = loop_.seed_population(42);
        let cancel = AtomicBool::new(false);
        let outcome = loop_.run_generation(&mut population, &BTreeSet::new(), 42, 0, &cancel).unwrap();
        assert_eq!(population.len(), 8);
        assert_eq!(outcome.diagnostics.generation, 0);
    }

    #[test]
    fn two_generations_never_decrease_best_fitness_below_first() {
        let mut loop_ = PopulationLoop::new(config(), Arc::new(XorScape)).unwrap();
        let mut population = loop_.seed_population(42);
        let cancel = AtomicBool::new(false);
        let first = loop_.run_generation(&mut population, &BTreeSet::new(), 42, 0, &cancel).unwrap();
        let second = loop_
            .run_generation(&mut population, &first.species_keys, 42, 1, &cancel)
            .unwrap();
        assert!(second.diagnostics.best_fitness.is_finite());
        assert_eq!(population.len(), 8);
    }

    #[test]
    fn deterministic_across_repeated_runs() {
        let mut loop_a = PopulationLoop::new(config(), Arc::new(XorScape)).unwrap();
        let mut pop_a = loop_a.seed_population(7);
        let cancel = AtomicBool::new(false);
        let outcome_a = loop_a.run_generation(&mut pop_a, &BTreeSet::new(), 7, 0, &cancel).unwrap();

        let mut loop_b = PopulationLoop::new(config(), Arc::new(XorScape)).unwrap();
        let mut pop_b = loop_b.seed_population(7);
        let outcome_b = loop_b.run_generation(&mut pop_b, &BTreeSet::new(), 7, 0, &cancel).unwrap();

        assert_eq!(outcome_a.diagnostics.best_fitness, outcome_b.diagnostics.best_fitness);
        for (a, b) in pop_a.iter().zip(pop_b.iter()) {
            assert_eq!(a.fingerprint(), b.fingerprint());
        }
    }
}
