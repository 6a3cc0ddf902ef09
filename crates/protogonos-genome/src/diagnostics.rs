// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tuning counters accumulated during a generation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TuningCounters {
    pub invocations: u64,
    pub attempts: u64,
    pub evaluations: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub goal_hits: u64,
}

impl TuningCounters {
    pub fn accept_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempts as f64
        }
    }

    pub fn evaluations_per_attempt(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.evaluations as f64 / self.attempts as f64
        }
    }

    pub fn merge(&mut self, other: &TuningCounters) {
        self.invocations += other.invocations;
        self.attempts += other.attempts;
        self.evaluations += other.evaluations;
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.goal_hits += other.goal_hits;
    }
}

/// Per-generation population diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationDiagnostics {
    pub generation: u64,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub min_fitness: f64,
    pub species_count: usize,
    pub fingerprint_diversity: f64,
    pub tuning: TuningCounters,
}

/// Species-level fitness/size summary for one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesMetrics {
    pub species_key: String,
    pub size: usize,
    pub mean_fitness: f64,
    pub best_fitness: f64,
}

/// One generation's worth of species history; generations are
/// strictly increasing across a run's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesGeneration {
    pub generation: u64,
    pub species: Vec<SpeciesMetrics>,
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}
