// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::error::ProtoError;
use crate::lineage::{EvoHistoryEvent, GenomeSummary};
use crate::neuron::Neuron;
use crate::substrate::{PlasticityConfig, SubstrateConfig, TuningMeta};
use crate::synapse::{IoUnit, NeuronActuatorLink, Synapse};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// Scalar or vector fitness; a scape may return either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fitness {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Fitness {
    /// A single representative scalar, used by diagnostics and
    /// selection strategies that need a total order. Vector fitness
    /// is reduced by summation; this is a representation detail, not
    /// the dominance rule used by the tuner (see `protogonos-tuner`).
    pub fn primary(&self) -> f64 {
        match self {
            Fitness::Scalar(s) => *s,
            Fitness::Vector(v) => v.iter().sum(),
        }
    }
}

/// Evolutionary bookkeeping carried alongside a genome's structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeMeta {
    pub fitness: Option<Fitness>,
    pub parent_ids: Vec<String>,
    pub offspring_ids: Vec<String>,
    pub champion: bool,
    pub history: Vec<EvoHistoryEvent>,
    pub fingerprint: String,
    pub evolvability: f64,
    pub robustness: f64,
    pub brittleness: f64,
}

impl Default for GenomeMeta {
    fn default() -> Self {
        GenomeMeta {
            fitness: None,
            parent_ids: Vec::new(),
            offspring_ids: Vec::new(),
            champion: false,
            history: Vec::new(),
            fingerprint: String::new(),
            evolvability: 0.0,
            robustness: 0.0,
            brittleness: 0.0,
        }
    }
}

/// The evolving artifact: a directed neural graph plus evolutionary
/// and tuning metadata.
///
/// Ids are plain strings and all collections are flat vectors/maps —
/// no owning pointer graph — so `Clone` alone already gives the
/// deep-copy isolation required of a cloned genome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub id: String,
    pub generation: u64,
    pub neurons: Vec<Neuron>,
    pub synapses: Vec<Synapse>,
    pub sensor_ids: Vec<String>,
    pub actuator_ids: Vec<String>,
    pub sensors: BTreeMap<String, IoUnit>,
    pub actuators: BTreeMap<String, IoUnit>,
    pub neuron_actuator_links: Vec<NeuronActuatorLink>,
    pub substrate: Option<SubstrateConfig>,
    pub plasticity: Option<PlasticityConfig>,
    pub actuator_tunables: BTreeMap<String, f64>,
    pub tuning_meta: TuningMeta,
    /// Input/output neuron ids defined by the scape; never removed by
    /// any mutation operator.
    pub protected_neuron_ids: BTreeSet<String>,
    pub meta: GenomeMeta,
}

impl Genome {
    pub fn new(id: impl Into<String>, generation: u64) -> Self {
        Genome {
            id: id.into(),
            generation,
            neurons: Vec::new(),
            synapses: Vec::new(),
            sensor_ids: Vec::new(),
            actuator_ids: Vec::new(),
            sensors: BTreeMap::new(),
            actuators: BTreeMap::new(),
            neuron_actuator_links: Vec::new(),
            substrate: None,
            plasticity: None,
            actuator_tunables: BTreeMap::new(),
            tuning_meta: TuningMeta::default(),
            protected_neuron_ids: BTreeSet::new(),
            meta: GenomeMeta::default(),
        }
    }

    pub fn neuron(&self, id: &str) -> Option<&Neuron> {
        self.neurons.iter().find(|n| n.id == id)
    }

    pub fn neuron_mut(&mut self, id: &str) -> Option<&mut Neuron> {
        self.neurons.iter_mut().find(|n| n.id == id)
    }

    pub fn has_neuron(&self, id: &str) -> bool {
        self.neurons.iter().any(|n| n.id == id)
    }

    pub fn is_protected(&self, neuron_id: &str) -> bool {
        self.protected_neuron_ids.contains(neuron_id)
    }

    /// Stable hash of structural attributes, ignoring weights and bias
    /// *values*. Topology and activation/aggregator/plasticity tags
    /// change it; pure numeric perturbation does not.
    pub fn fingerprint(&self) -> String {
        let mut neuron_lines: Vec<String> = self
            .neurons
            .iter()
            .map(|n| {
                format!(
                    "{}|{}|{}|{}|{}",
                    n.id,
                    n.activation_function.canonical(),
                    n.aggregator_function.canonical(),
                    n.bias.is_some(),
                    n.recurrent,
                )
            })
            .collect();
        neuron_lines.sort();

        let mut synapse_lines: Vec<String> = self
            .synapses
            .iter()
            .map(|s| format!("{}->{}|{}", s.from_neuron_id, s.to_neuron_id, s.enabled))
            .collect();
        synapse_lines.sort();

        let mut sensor_lines: Vec<String> = self
            .sensors
            .values()
            .map(|s| format!("{}:{}:{:?}", s.id, s.vl, s.linked_neuron_ids))
            .collect();
        sensor_lines.sort();

        let mut actuator_lines: Vec<String> = self
            .actuators
            .values()
            .map(|a| format!("{}:{}:{:?}", a.id, a.vl, a.linked_neuron_ids))
            .collect();
        actuator_lines.sort();

        let canonical = format!(
            "N[{}]S[{}]SE[{}]AC[{}]",
            neuron_lines.join(";"),
            synapse_lines.join(";"),
            sensor_lines.join(";"),
            actuator_lines.join(";"),
        );

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let digest = hasher.finalize();
        format!("{:x}", digest)[..16].to_string()
    }

    /// Totals and activation/aggregator histograms.
    pub fn summary(&self) -> GenomeSummary {
        let mut activation_histogram = BTreeMap::new();
        let mut aggregator_histogram = BTreeMap::new();
        for n in &self.neurons {
            *activation_histogram
                .entry(n.activation_function.canonical().to_string())
                .or_insert(0) += 1;
            *aggregator_histogram
                .entry(n.aggregator_function.canonical().to_string())
                .or_insert(0) += 1;
        }
        GenomeSummary {
            neuron_count: self.neurons.len(),
            synapse_count: self.synapses.len(),
            enabled_synapse_count: self.synapses.iter().filter(|s| s.enabled).count(),
            sensor_count: self.sensors.len(),
            actuator_count: self.actuators.len(),
            activation_histogram,
            aggregator_histogram,
        }
    }

    /// Check every structural invariant. Returns the first violation
    /// found; a correct genome is never invalid mid-run (mutation
    /// operators must not produce genomes that fail this).
    pub fn validate(&self) -> Result<(), ProtoError> {
        let neuron_ids: BTreeSet<&str> = self.neurons.iter().map(|n| n.id.as_str()).collect();

        for s in &self.synapses {
            if !neuron_ids.contains(s.from_neuron_id.as_str()) {
                return Err(ProtoError::Validation(format!(
                    "synapse {} references missing from-neuron {}",
                    s.id, s.from_neuron_id
                )));
            }
            if !neuron_ids.contains(s.to_neuron_id.as_str()) {
                return Err(ProtoError::Validation(format!(
                    "synapse {} references missing to-neuron {}",
                    s.id, s.to_neuron_id
                )));
            }
        }

        for sensor in self.sensors.values() {
            for nid in &sensor.linked_neuron_ids {
                if !neuron_ids.contains(nid.as_str()) {
                    return Err(ProtoError::Validation(format!(
                        "sensor {} fanout references missing neuron {}",
                        sensor.id, nid
                    )));
                }
            }
        }

        for actuator in self.actuators.values() {
            for nid in &actuator.linked_neuron_ids {
                if !neuron_ids.contains(nid.as_str()) {
                    return Err(ProtoError::Validation(format!(
                        "actuator {} fanin references missing neuron {}",
                        actuator.id, nid
                    )));
                }
            }
        }

        for link in &self.neuron_actuator_links {
            if !neuron_ids.contains(link.neuron_id.as_str()) {
                return Err(ProtoError::Validation(format!(
                    "neuron-actuator link references missing neuron {}",
                    link.neuron_id
                )));
            }
            if !self.actuators.contains_key(&link.actuator_id) {
                return Err(ProtoError::Validation(format!(
                    "neuron-actuator link references missing actuator {}",
                    link.actuator_id
                )));
            }
        }

        for protected in &self.protected_neuron_ids {
            if !neuron_ids.contains(protected.as_str()) {
                return Err(ProtoError::Validation(format!(
                    "protected neuron id {protected} is not present in genome"
                )));
            }
        }

        self.tuning_meta.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActivationFunction;

    fn sample_genome() -> Genome {
        let mut g = Genome::new("g1", 0);
        g.neurons.push(Neuron::new("n1", 0));
        g.neurons.push(Neuron::new("n2", 0));
        g.synapses.push(Synapse::new("s1", "n1", "n2", 0.5));
        g.protected_neuron_ids.insert("n1".into());
        g.protected_neuron_ids.insert("n2".into());
        g
    }

    #[test]
    fn clone_isolation() {
        let original = sample_genome();
        let mut cloned = original.clone();
        cloned.neurons[0].bias = Some(3.0);
        cloned.synapses[0].weight = 99.0;
        cloned.neurons.push(Neuron::new("n3", 0));

        assert_eq!(original.neurons[0].bias, None);
        assert_eq!(original.synapses[0].weight, 0.5);
        assert_eq!(original.neurons.len(), 2);
    }

    #[test]
    fn validate_rejects_dangling_synapse() {
        let mut g = sample_genome();
        g.synapses.push(Synapse::new("s2", "n1", "ghost", 1.0));
        assert!(g.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_genome() {
        assert!(sample_genome().validate().is_ok());
    }

    #[test]
    fn fingerprint_stable_under_weight_perturbation() {
        let g1 = sample_genome();
        let mut g2 = g1.clone();
        g2.synapses[0].weight = 42.0;
        g2.neurons[0].bias = g1.neurons[0].bias; // bias presence unchanged
        assert_eq!(g1.fingerprint(), g2.fingerprint());
    }

    #[test]
    fn fingerprint_changes_on_topology_change() {
        let g1 = sample_genome();
        let mut g2 = g1.clone();
        g2.neurons[0].activation_function = ActivationFunction::Relu;
        assert_ne!(g1.fingerprint(), g2.fingerprint());
    }

    #[test]
    fn summary_counts_are_accurate() {
        let g = sample_genome();
        let s = g.summary();
        assert_eq!(s.neuron_count, 2);
        assert_eq!(s.synapse_count, 1);
        assert_eq!(s.enabled_synapse_count, 1);
    }
}
