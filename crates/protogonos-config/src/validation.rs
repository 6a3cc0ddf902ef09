// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Normalizes a [`RunConfig`] into the typed configs the core crates
//! consume, turning an unknown enum tag into one validation error
//! instead of a silent fallback.

use crate::types::RunConfig;
use protogonos_genome::{
    FitnessPostprocessing, ProtoError, SelectionStrategy, SpeciationMode, TopologicalCountPolicy,
    TuneAttemptPolicy,
};
use protogonos_mutation::{MutationContext, MutationOptions, SubstrateCatalog, TopologicalCountParams};
use protogonos_population::PopulationConfig;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError(pub String);

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConfigValidationError {}

impl From<ProtoError> for ConfigValidationError {
    fn from(err: ProtoError) -> Self {
        ConfigValidationError(err.to_string())
    }
}

/// Validate a loaded `RunConfig` and build the typed `PopulationConfig`
/// the population loop actually runs with.
pub fn validate_config(config: &RunConfig) -> Result<PopulationConfig, ConfigValidationError> {
    if config.run.scape.trim().is_empty() {
        return Err(ConfigValidationError("run.scape must not be empty".into()));
    }

    let population = PopulationConfig {
        population_size: config.population.population_size,
        worker_count: config.population.worker_count,
        elite_count: config.population.elite_count,
        survival_percentage: config.population.survival_percentage,
        tournament_size: config.population.tournament_size,
        stagnation_generations: config.population.stagnation_generations,
        speciation_mode: SpeciationMode::normalize(&config.population.speciation_mode)?,
        fitness_postprocessing: FitnessPostprocessing::normalize(&config.population.fitness_postprocessing)?,
        selection_strategy: SelectionStrategy::normalize(&config.population.selection_strategy)?,
        tune_attempt_policy: TuneAttemptPolicy::normalize(&config.tuning.tune_attempt_policy)?,
        tune_base_attempts: config.tuning.tune_base_attempts,
        tune_min_attempts: config.tuning.tune_min_attempts,
        expected_total_generations: config.run.max_generations.unwrap_or(1),
        topological_count_policy: TopologicalCountPolicy::normalize(&config.tuning.topological_count_policy)?,
        topological_count_params: TopologicalCountParams {
            multiplier: config.tuning.topological_count_multiplier,
            power: config.tuning.topological_count_power,
            max: config.tuning.topological_count_max,
        },
        mutation_context: MutationContext {
            options: MutationOptions {
                feed_forward_only: config.tuning.feed_forward_only,
                perturbation_scale: config.tuning.perturbation_scale,
            },
            substrate: SubstrateCatalog::default(),
        },
        sentinel_fitness: config.population.sentinel_fitness,
        fitness_goal: config.run.fitness_goal,
        evaluations_limit: config.run.evaluations_limit,
    };

    population.validate()?;
    Ok(population)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = RunConfig::default();
        let population = validate_config(&config).unwrap();
        assert_eq!(population.population_size, config.population.population_size);
    }

    #[test]
    fn unknown_enum_tag_is_a_validation_error() {
        let mut config = RunConfig::default();
        config.population.selection_strategy = "not_a_real_strategy".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn empty_scape_name_is_rejected() {
        let mut config = RunConfig::default();
        config.run.scape = String::new();
        assert!(validate_config(&config).is_err());
    }
}
