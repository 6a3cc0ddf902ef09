// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

use protogonos_genome::{Fitness, Genome, TuningCounters};

/// Outcome of one `tune()` call: the best genome found, its fitness,
/// and the attempt/accept/reject bookkeeping for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct TuneReport {
    pub genome: Genome,
    pub fitness: Fitness,
    pub counters: TuningCounters,
    pub goal_reached: bool,
}
