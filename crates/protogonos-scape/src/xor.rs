// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! A minimal two-input, one-output XOR environment. Small enough to
//! run every generation in tests without a real simulator dependency,
//! while still exercising the full evaluate/tune/reproduce pipeline.

use crate::Scape;
use protogonos_genome::{AggregatorFunction, Fitness, Genome, IoUnit, ProtoResult};
use std::collections::{BTreeMap, VecDeque};

const CASES: [([f64; 2], f64); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

fn apply_activation(af: protogonos_genome::ActivationFunction, x: f64) -> f64 {
    use protogonos_genome::ActivationFunction::*;
    match af {
        Identity => x,
        Tanh => x.tanh(),
        Sigmoid => 1.0 / (1.0 + (-x).exp()),
        Cos => x.cos(),
        Gaussian => (-x * x).exp(),
        Relu => x.max(0.0),
        Sin => x.sin(),
        Absolute => x.abs(),
    }
}

/// Topologically order neuron ids by enabled-synapse dependency. Falls
/// back to declaration order if the graph is cyclic (a feed-forward
/// violation this scape doesn't try to repair).
fn topo_order(genome: &Genome) -> Vec<String> {
    let mut indegree: BTreeMap<&str, usize> = genome.neurons.iter().map(|n| (n.id.as_str(), 0)).collect();
    for s in genome.synapses.iter().filter(|s| s.enabled) {
        if let Some(d) = indegree.get_mut(s.to_neuron_id.as_str()) {
            *d += 1;
        }
    }
    let mut queue: VecDeque<&str> = indegree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order = Vec::with_capacity(genome.neurons.len());
    let mut remaining = indegree.clone();
    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        for s in genome.synapses.iter().filter(|s| s.enabled && s.from_neuron_id == id) {
            if let Some(d) = remaining.get_mut(s.to_neuron_id.as_str()) {
                *d -= 1;
                if *d == 0 {
                    queue.push_back(s.to_neuron_id.as_str());
                }
            }
        }
    }
    if order.len() != genome.neurons.len() {
        return genome.neurons.iter().map(|n| n.id.clone()).collect();
    }
    order
}

fn run(genome: &Genome, inputs: [f64; 2]) -> f64 {
    let mut values: BTreeMap<String, f64> = BTreeMap::new();
    let mut input_neurons: BTreeMap<&str, ()> = BTreeMap::new();
    for sensor in genome.sensors.values() {
        for (i, nid) in sensor.linked_neuron_ids.iter().enumerate() {
            let v = inputs.get(i).copied().unwrap_or(0.0);
            *values.entry(nid.clone()).or_insert(0.0) += v;
            input_neurons.insert(nid.as_str(), ());
        }
    }

    for nid in topo_order(genome) {
        if input_neurons.contains_key(nid.as_str()) {
            continue;
        }
        let neuron = match genome.neuron(&nid) {
            Some(n) => n,
            None => continue,
        };
        let incoming: Vec<(f64, f64)> = genome
            .synapses
            .iter()
            .filter(|s| s.enabled && s.to_neuron_id == nid)
            .map(|s| (values.get(&s.from_neuron_id).copied().unwrap_or(0.0), s.weight))
            .collect();
        let aggregated = match neuron.aggregator_function {
            AggregatorFunction::DotProduct => incoming.iter().map(|(v, w)| v * w).sum(),
            AggregatorFunction::Product => incoming.iter().map(|(v, w)| v * w).fold(1.0, |a, b| a * b),
            AggregatorFunction::Min => incoming
                .iter()
                .map(|(v, w)| v * w)
                .fold(f64::INFINITY, f64::min),
            AggregatorFunction::Max => incoming
                .iter()
                .map(|(v, w)| v * w)
                .fold(f64::NEG_INFINITY, f64::max),
            AggregatorFunction::Average => {
                if incoming.is_empty() {
                    0.0
                } else {
                    incoming.iter().map(|(v, w)| v * w).sum::<f64>() / incoming.len() as f64
                }
            }
        };
        let aggregated = if incoming.is_empty() { 0.0 } else { aggregated } + neuron.bias.unwrap_or(0.0);
        values.insert(nid, apply_activation(neuron.activation_function, aggregated));
    }

    for actuator in genome.actuators.values() {
        if actuator.linked_neuron_ids.is_empty() {
            continue;
        }
        let sum: f64 = actuator
            .linked_neuron_ids
            .iter()
            .map(|id| values.get(id).copied().unwrap_or(0.0))
            .sum();
        return sum / actuator.linked_neuron_ids.len() as f64;
    }
    0.0
}

/// Feed-forward, two-input-one-output XOR environment. Fitness is
/// `1 - mean squared error` across the four truth-table rows, bounded
/// to `(-inf, 1.0]` with `1.0` a perfect solution, so higher is always
/// better.
pub struct XorScape;

impl Scape for XorScape {
    fn name(&self) -> &str {
        "xor"
    }

    fn sensor_templates(&self) -> Vec<IoUnit> {
        vec![IoUnit::new("sensor", 0, 2)]
    }

    fn actuator_templates(&self) -> Vec<IoUnit> {
        vec![IoUnit::new("actuator", 0, 1)]
    }

    fn evaluate(&self, genome: &Genome, _seed: u64) -> ProtoResult<Fitness> {
        let mut sse = 0.0;
        for (inputs, expected) in CASES {
            let output = run(genome, inputs);
            sse += (output - expected).powi(2);
        }
        Ok(Fitness::Scalar(1.0 - sse / CASES.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protogonos_genome::{IoUnit, Neuron, Synapse};

    fn hand_wired_solution() -> Genome {
        // Not an exact XOR solver, just exercises the full pipeline:
        // two sensor-driven inputs feeding one output through a
        // hidden neuron.
        let mut g = Genome::new("hand-wired", 0);
        g.neurons.push(Neuron::new("in1", 0));
        g.neurons.push(Neuron::new("in2", 0));
        let mut hidden = Neuron::new("hidden", 0);
        hidden.activation_function = protogonos_genome::ActivationFunction::Tanh;
        g.neurons.push(hidden);
        g.neurons.push(Neuron::new("out", 0));

        g.synapses.push(Synapse::new("s1", "in1", "hidden", 1.0));
        g.synapses.push(Synapse::new("s2", "in2", "hidden", 1.0));
        g.synapses.push(Synapse::new("s3", "hidden", "out", 1.0));

        let mut sensor = IoUnit::new("sensor", 0, 2);
        sensor.linked_neuron_ids = vec!["in1".into(), "in2".into()];
        g.sensor_ids.push(sensor.id.clone());
        g.sensors.insert(sensor.id.clone(), sensor);

        let mut actuator = IoUnit::new("actuator", 0, 1);
        actuator.linked_neuron_ids = vec!["out".into()];
        g.actuator_ids.push(actuator.id.clone());
        g.actuators.insert(actuator.id.clone(), actuator);

        for id in ["in1", "in2", "hidden", "out"] {
            g.protected_neuron_ids.insert(id.to_string());
        }
        g
    }

    #[test]
    fn evaluate_returns_a_bounded_scalar_fitness() {
        let g = hand_wired_solution();
        let fitness = XorScape.evaluate(&g, 0).unwrap();
        match fitness {
            Fitness::Scalar(score) => assert!(score <= 1.0),
            Fitness::Vector(_) => panic!("expected scalar fitness"),
        }
    }

    #[test]
    fn evaluation_is_deterministic() {
        let g = hand_wired_solution();
        let a = XorScape.evaluate(&g, 1).unwrap();
        let b = XorScape.evaluate(&g, 1).unwrap();
        assert_eq!(a, b);
    }
}
