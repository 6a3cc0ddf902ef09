// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions. Every section maps to a table in
//! `protogonos.toml`. Closed-enum fields (speciation mode, selection
//! strategy, ...) are stored as raw strings here and normalized into
//! their typed form by [`RunConfig::to_population_config`], so a typo
//! in a config file surfaces as one `ProtoError::Validation` at load
//! time rather than a silent fallback.

use protogonos_mutation::{MutationContext, TopologicalCountParams};
use protogonos_observability::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for one evolution run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    pub run: RunSection,
    pub population: PopulationSection,
    pub tuning: TuningSection,
    pub logging: LoggingConfig,
    pub store: StoreSection,
}

/// Run-level lifecycle settings: what scape to evaluate against, how
/// long to run, and where to stop.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunSection {
    pub scape: String,
    pub seed: u64,
    pub max_generations: Option<u64>,
    pub evaluations_limit: Option<u64>,
    pub fitness_goal: Option<f64>,
    pub start_paused: bool,
    pub auto_continue_after: Option<u64>,
}

impl Default for RunSection {
    fn default() -> Self {
        RunSection {
            scape: "xor".to_string(),
            seed: 42,
            max_generations: Some(100),
            evaluations_limit: None,
            fitness_goal: None,
            start_paused: false,
            auto_continue_after: None,
        }
    }
}

/// Population-loop settings, layered onto `protogonos_population::PopulationConfig`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PopulationSection {
    pub population_size: usize,
    pub worker_count: usize,
    pub elite_count: usize,
    pub survival_percentage: f64,
    pub tournament_size: usize,
    pub stagnation_generations: u32,
    pub speciation_mode: String,
    pub fitness_postprocessing: String,
    pub selection_strategy: String,
    pub sentinel_fitness: f64,
}

impl Default for PopulationSection {
    fn default() -> Self {
        let defaults = protogonos_population::PopulationConfig::default();
        PopulationSection {
            population_size: defaults.population_size,
            worker_count: defaults.worker_count,
            elite_count: defaults.elite_count,
            survival_percentage: defaults.survival_percentage,
            tournament_size: defaults.tournament_size,
            stagnation_generations: defaults.stagnation_generations,
            speciation_mode: defaults.speciation_mode.canonical().to_string(),
            fitness_postprocessing: defaults.fitness_postprocessing.canonical().to_string(),
            selection_strategy: defaults.selection_strategy.canonical().to_string(),
            sentinel_fitness: defaults.sentinel_fitness,
        }
    }
}

/// Exoself tuning-budget settings and the topological mutation-count policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TuningSection {
    pub tune_attempt_policy: String,
    pub tune_base_attempts: u32,
    pub tune_min_attempts: u32,
    pub topological_count_policy: String,
    pub topological_count_multiplier: f64,
    pub topological_count_power: f64,
    pub topological_count_max: u32,
    pub feed_forward_only: bool,
    pub perturbation_scale: f64,
}

impl Default for TuningSection {
    fn default() -> Self {
        let defaults = protogonos_population::PopulationConfig::default();
        let params = TopologicalCountParams::default();
        let options = MutationContext::default().options;
        TuningSection {
            tune_attempt_policy: defaults.tune_attempt_policy.canonical().to_string(),
            tune_base_attempts: defaults.tune_base_attempts,
            tune_min_attempts: defaults.tune_min_attempts,
            topological_count_policy: defaults.topological_count_policy.canonical().to_string(),
            topological_count_multiplier: params.multiplier,
            topological_count_power: params.power,
            topological_count_max: params.max,
            feed_forward_only: options.feed_forward_only,
            perturbation_scale: options.perturbation_scale,
        }
    }
}

/// Where run artifacts (fitness history, lineage, snapshots, ...) are written.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSection {
    pub run_root: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            run_root: PathBuf::from("./runs"),
        }
    }
}
