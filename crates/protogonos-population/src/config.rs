// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

use protogonos_genome::{
    FitnessPostprocessing, ProtoError, ProtoResult, SelectionStrategy, SpeciationMode,
    TopologicalCountPolicy, TuneAttemptPolicy,
};
use protogonos_mutation::{MutationContext, TopologicalCountParams};

/// Everything a `PopulationLoop` needs that isn't a per-run seed or
/// the scape itself. Validated once at construction, not per
/// generation.
#[derive(Debug, Clone)]
pub struct PopulationConfig {
    pub population_size: usize,
    pub worker_count: usize,

    /// Non-zero exactly when `survival_percentage == 0.0`; the two
    /// survivor-sizing policies are mutually exclusive.
    pub elite_count: usize,
    pub survival_percentage: f64,

    pub tournament_size: usize,
    /// Generations a species may go without a best-fitness
    /// improvement before `species_shared_tournament` excludes it.
    pub stagnation_generations: u32,

    pub speciation_mode: SpeciationMode,
    pub fitness_postprocessing: FitnessPostprocessing,
    pub selection_strategy: SelectionStrategy,

    pub tune_attempt_policy: TuneAttemptPolicy,
    pub tune_base_attempts: u32,
    pub tune_min_attempts: u32,
    pub expected_total_generations: u64,

    pub topological_count_policy: TopologicalCountPolicy,
    pub topological_count_params: TopologicalCountParams,
    pub mutation_context: MutationContext,

    /// Fitness assigned to a genome whose scape evaluation failed;
    /// the configured minimum admissible value, never a run-fatal
    /// error on its own.
    pub sentinel_fitness: f64,

    pub fitness_goal: Option<f64>,
    pub evaluations_limit: Option<u64>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig {
            population_size: 50,
            worker_count: 4,
            elite_count: 2,
            survival_percentage: 0.0,
            tournament_size: 3,
            stagnation_generations: 15,
            speciation_mode: SpeciationMode::Topology,
            fitness_postprocessing: FitnessPostprocessing::None,
            selection_strategy: SelectionStrategy::Elite,
            tune_attempt_policy: TuneAttemptPolicy::Fixed,
            tune_base_attempts: 0,
            tune_min_attempts: 0,
            expected_total_generations: 1,
            topological_count_policy: TopologicalCountPolicy::Const,
            topological_count_params: TopologicalCountParams::default(),
            mutation_context: MutationContext::default(),
            sentinel_fitness: f64::NEG_INFINITY,
            fitness_goal: None,
            evaluations_limit: None,
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> ProtoResult<()> {
        if self.population_size == 0 {
            return Err(ProtoError::Validation("population_size must be > 0".into()));
        }
        if self.worker_count == 0 {
            return Err(ProtoError::Validation("worker_count must be > 0".into()));
        }
        if self.elite_count > 0 && self.survival_percentage > 0.0 {
            return Err(ProtoError::Validation(
                "elite_count and survival_percentage are mutually exclusive".into(),
            ));
        }
        if self.elite_count == 0 && self.survival_percentage <= 0.0 {
            return Err(ProtoError::Validation(
                "exactly one of elite_count or survival_percentage must be set".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.survival_percentage) {
            return Err(ProtoError::Validation(
                "survival_percentage must be within [0, 1]".into(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(ProtoError::Validation("tournament_size must be > 0".into()));
        }
        Ok(())
    }

    /// Target survivor count for one generation given the current
    /// population size.
    pub fn survivor_count(&self) -> usize {
        if self.elite_count > 0 {
            self.elite_count
        } else {
            ((self.population_size as f64) * self.survival_percentage)
                .ceil()
                .max(1.0) as usize
        }
    }
}
