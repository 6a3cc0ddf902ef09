// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Builds the generation-0 population generically from a scape's
//! sensor/actuator templates: one neuron per vector slot, fully
//! connected sensor-neurons to actuator-neurons with small random
//! weights. Scapes that need a richer starting topology can bypass
//! this and hand `PopulationLoop` an already-built population.

use protogonos_genome::{ActivationFunction, Genome, Neuron, Synapse};
use protogonos_mutation::rng_for_index;
use rand::rngs::StdRng;
use rand::Rng;

fn seed_genome(id: impl Into<String>, sensor_templates: &[protogonos_genome::IoUnit], actuator_templates: &[protogonos_genome::IoUnit], rng: &mut StdRng) -> Genome {
    let mut genome = Genome::new(id, 0);
    let mut input_ids = Vec::new();
    for sensor in sensor_templates {
        let mut sensor = sensor.clone();
        let mut linked = Vec::with_capacity(sensor.vl.max(1));
        for slot in 0..sensor.vl.max(1) {
            let neuron_id = format!("{}_in{}", sensor.id, slot);
            genome.neurons.push(Neuron::new(neuron_id.clone(), 0));
            genome.protected_neuron_ids.insert(neuron_id.clone());
            input_ids.push(neuron_id.clone());
            linked.push(neuron_id);
        }
        sensor.linked_neuron_ids = linked;
        genome.sensor_ids.push(sensor.id.clone());
        genome.sensors.insert(sensor.id.clone(), sensor);
    }

    let mut output_ids = Vec::new();
    for actuator in actuator_templates {
        let mut actuator = actuator.clone();
        let mut linked = Vec::with_capacity(actuator.vl.max(1));
        for slot in 0..actuator.vl.max(1) {
            let neuron_id = format!("{}_out{}", actuator.id, slot);
            let mut neuron = Neuron::new(neuron_id.clone(), 0);
            neuron.activation_function = ActivationFunction::Tanh;
            genome.neurons.push(neuron);
            genome.protected_neuron_ids.insert(neuron_id.clone());
            output_ids.push(neuron_id.clone());
            linked.push(neuron_id);
        }
        actuator.linked_neuron_ids = linked;
        genome.actuator_ids.push(actuator.id.clone());
        genome.actuators.insert(actuator.id.clone(), actuator);
    }

    for (si, in_id) in input_ids.iter().enumerate() {
        for (oi, out_id) in output_ids.iter().enumerate() {
            let weight = rng.gen_range(-1.0..1.0);
            genome
                .synapses
                .push(Synapse::new(format!("s{si}_{oi}"), in_id.clone(), out_id.clone(), weight));
        }
    }

    genome.meta.fingerprint = genome.fingerprint();
    genome
}

/// Build `count` independently-seeded genome-0 individuals. Each
/// genome's wiring RNG is derived from `(run_seed, generation=0,
/// index)`, so two runs sharing a seed produce an identical seed
/// population regardless of population size chosen for unrelated
/// experiments (each index is independent).
pub fn seed_population(
    count: usize,
    sensor_templates: &[protogonos_genome::IoUnit],
    actuator_templates: &[protogonos_genome::IoUnit],
    run_seed: u64,
) -> Vec<Genome> {
    (0..count)
        .map(|index| {
            let mut rng = rng_for_index(run_seed, 0, index);
            seed_genome(format!("g{index}"), sensor_templates, actuator_templates, &mut rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use protogonos_genome::IoUnit;

    #[test]
    fn seeded_population_is_fully_valid() {
        let sensors = vec![IoUnit::new("sensor", 0, 2)];
        let actuators = vec![IoUnit::new("actuator", 0, 1)];
        let population = seed_population(5, &sensors, &actuators, 42);
        assert_eq!(population.len(), 5);
        for genome in &population {
            assert!(genome.validate().is_ok());
            assert_eq!(genome.neurons.len(), 3);
            assert_eq!(genome.synapses.len(), 2);
        }
    }

    #[test]
    fn same_seed_reproduces_identical_population() {
        let sensors = vec![IoUnit::new("sensor", 0, 2)];
        let actuators = vec![IoUnit::new("actuator", 0, 1)];
        let a = seed_population(4, &sensors, &actuators, 7);
        let b = seed_population(4, &sensors, &actuators, 7);
        for (ga, gb) in a.iter().zip(b.iter()) {
            assert_eq!(ga.fingerprint(), gb.fingerprint());
            assert_eq!(
                ga.synapses.iter().map(|s| s.weight).collect::<Vec<_>>(),
                gb.synapses.iter().map(|s| s.weight).collect::<Vec<_>>()
            );
        }
    }
}
