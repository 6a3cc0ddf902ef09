// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// A directed, weighted edge between two neurons. Self-loops permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synapse {
    pub id: String,
    pub from_neuron_id: String,
    pub to_neuron_id: String,
    pub weight: f64,
    pub enabled: bool,
    pub plasticity_parameters: Vec<f64>,
}

impl Synapse {
    pub fn new(
        id: impl Into<String>,
        from_neuron_id: impl Into<String>,
        to_neuron_id: impl Into<String>,
        weight: f64,
    ) -> Self {
        Synapse {
            id: id.into(),
            from_neuron_id: from_neuron_id.into(),
            to_neuron_id: to_neuron_id.into(),
            weight,
            enabled: true,
            plasticity_parameters: Vec::new(),
        }
    }
}

/// A sensor or actuator vector endpoint wired into the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoUnit {
    pub id: String,
    pub generation: u64,
    /// Vector length.
    pub vl: usize,
    /// For a sensor: fanout neuron ids it drives. For an actuator:
    /// fanin neuron ids driving it.
    pub linked_neuron_ids: Vec<String>,
    pub pre_processor: crate::catalog::ProcessorTag,
    pub post_processor: crate::catalog::ProcessorTag,
    pub format: String,
    /// Scape-bound parameters (opaque key/value configuration the
    /// scape adapter interprets).
    pub scape_parameters: std::collections::BTreeMap<String, serde_json::Value>,
}

impl IoUnit {
    pub fn new(id: impl Into<String>, generation: u64, vl: usize) -> Self {
        IoUnit {
            id: id.into(),
            generation,
            vl,
            linked_neuron_ids: Vec::new(),
            pre_processor: crate::catalog::ProcessorTag::None,
            post_processor: crate::catalog::ProcessorTag::None,
            format: "float".to_string(),
            scape_parameters: std::collections::BTreeMap::new(),
        }
    }
}

/// neuron id -> actuator id, used by age-aware target selection in
/// the tuner's `current`/`current_random` candidate-selection modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeuronActuatorLink {
    pub neuron_id: String,
    pub actuator_id: String,
}
