// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One mutation applied to a genome, recorded on the genome itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvoHistoryEvent {
    pub mutation_name: String,
    pub affected_ids: Vec<String>,
}

/// Append-only per-run lineage entry: one per reproduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageRecord {
    pub genome_id: String,
    pub parent_id: Option<String>,
    pub generation: u64,
    pub operation: String,
    pub events: Vec<EvoHistoryEvent>,
    pub fingerprint: String,
    pub summary: GenomeSummary,
}

/// Totals and activation/aggregator histograms for a genome.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenomeSummary {
    pub neuron_count: usize,
    pub synapse_count: usize,
    pub enabled_synapse_count: usize,
    pub sensor_count: usize,
    pub actuator_count: usize,
    pub activation_histogram: BTreeMap<String, usize>,
    pub aggregator_histogram: BTreeMap<String, usize>,
}
