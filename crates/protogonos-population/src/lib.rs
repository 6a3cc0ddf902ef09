// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! # protogonos-population
//!
//! The generation loop: evaluate a population against a scape,
//! speciate it, reshape fitness, select survivors, tune elites in
//! place, and reproduce the rest of the next generation. This crate
//! owns everything inside one generation; run-level lifecycle (pause,
//! stop, continuation, goal/evaluation-limit bookkeeping across many
//! generations) belongs to `protogonos-control`.

pub mod config;
pub mod engine;
pub mod fitness_postprocess;
pub mod seed;
pub mod selection;
pub mod speciation;
pub mod tune_budget;

pub use config::PopulationConfig;
pub use engine::{GenerationOutcome, PopulationLoop};
pub use fitness_postprocess::{BehaviorDistance, FingerprintDistance};
pub use selection::StagnationTracker;
