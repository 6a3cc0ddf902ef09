// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! The mutation operator catalog.
//!
//! Every operator has the same shape: given a genome, a seeded RNG
//! and shared context, either change exactly one thing and describe
//! it in an `EvoHistoryEvent`, or report a `NoOp` with a human-
//! readable reason. Operators never panic on an empty/degenerate
//! genome; "nothing eligible" is a normal outcome, not an error.

use crate::context::{MutationContext, MutationOutcome};
use protogonos_genome::{
    AggregatorFunction, ActivationFunction, CandidateSelection, EvoHistoryEvent, Genome,
    HeredityType, Neuron, NeuronActuatorLink, PlasticityRule, Synapse,
};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::BTreeSet;

const ACTIVATIONS: [ActivationFunction; 8] = [
    ActivationFunction::Identity,
    ActivationFunction::Tanh,
    ActivationFunction::Sigmoid,
    ActivationFunction::Cos,
    ActivationFunction::Gaussian,
    ActivationFunction::Relu,
    ActivationFunction::Sin,
    ActivationFunction::Absolute,
];

const AGGREGATORS: [AggregatorFunction; 5] = [
    AggregatorFunction::DotProduct,
    AggregatorFunction::Product,
    AggregatorFunction::Min,
    AggregatorFunction::Max,
    AggregatorFunction::Average,
];

const PLASTICITY_RULES: [PlasticityRule; 5] = [
    PlasticityRule::None,
    PlasticityRule::Hebbian,
    PlasticityRule::OjasRule,
    PlasticityRule::NeuromodulatedHebbian,
    PlasticityRule::SelfModulation,
];

const CANDIDATE_SELECTIONS: [CandidateSelection; 13] = [
    CandidateSelection::BestSoFar,
    CandidateSelection::Original,
    CandidateSelection::Dynamic,
    CandidateSelection::All,
    CandidateSelection::AllRandom,
    CandidateSelection::Active,
    CandidateSelection::ActiveRandom,
    CandidateSelection::Recent,
    CandidateSelection::RecentRandom,
    CandidateSelection::Current,
    CandidateSelection::CurrentRandom,
    CandidateSelection::Lastgen,
    CandidateSelection::LastgenRandom,
];

fn gaussian_sample(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn fresh_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

fn applied(name: &str, affected_ids: Vec<String>) -> MutationOutcome {
    MutationOutcome::Applied(EvoHistoryEvent {
        mutation_name: name.to_string(),
        affected_ids,
    })
}

/// Does adding an edge `from -> to` close a directed cycle, i.e. can
/// `to` already reach `from`.
fn creates_cycle(genome: &Genome, from: &str, to: &str) -> bool {
    let mut stack = vec![to.to_string()];
    let mut seen = BTreeSet::new();
    while let Some(current) = stack.pop() {
        if current == from {
            return true;
        }
        if !seen.insert(current.clone()) {
            continue;
        }
        for s in &genome.synapses {
            if s.from_neuron_id == current {
                stack.push(s.to_neuron_id.clone());
            }
        }
    }
    false
}

pub fn perturb_weights(genome: &mut Genome, rng: &mut StdRng, ctx: &MutationContext) -> MutationOutcome {
    if genome.synapses.is_empty() {
        return MutationOutcome::NoOp("no synapses to perturb");
    }
    let mut affected = Vec::with_capacity(genome.synapses.len());
    for s in genome.synapses.iter_mut() {
        s.weight += gaussian_sample(rng) * ctx.options.perturbation_scale;
        affected.push(s.id.clone());
    }
    applied("perturb_weights", affected)
}

pub fn add_bias(genome: &mut Genome, rng: &mut StdRng, ctx: &MutationContext) -> MutationOutcome {
    let candidates: Vec<usize> = genome
        .neurons
        .iter()
        .enumerate()
        .filter(|(_, n)| n.bias.is_none() && !genome.protected_neuron_ids.contains(&n.id))
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return MutationOutcome::NoOp("no eligible non-protected neuron without a bias");
    }
    let idx = candidates[rng.gen_range(0..candidates.len())];
    genome.neurons[idx].bias = Some(gaussian_sample(rng) * ctx.options.perturbation_scale);
    applied("add_bias", vec![genome.neurons[idx].id.clone()])
}

pub fn remove_bias(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    let candidates: Vec<usize> = genome
        .neurons
        .iter()
        .enumerate()
        .filter(|(_, n)| n.bias.is_some() && !genome.protected_neuron_ids.contains(&n.id))
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return MutationOutcome::NoOp("no eligible non-protected neuron carries a bias");
    }
    let idx = candidates[rng.gen_range(0..candidates.len())];
    genome.neurons[idx].bias = None;
    applied("remove_bias", vec![genome.neurons[idx].id.clone()])
}

pub fn mutate_af(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    if genome.neurons.is_empty() {
        return MutationOutcome::NoOp("genome has no neurons");
    }
    let idx = rng.gen_range(0..genome.neurons.len());
    let current = genome.neurons[idx].activation_function;
    let choices: Vec<_> = ACTIVATIONS.iter().copied().filter(|a| *a != current).collect();
    genome.neurons[idx].activation_function = choices[rng.gen_range(0..choices.len())];
    applied("mutate_af", vec![genome.neurons[idx].id.clone()])
}

pub fn mutate_aggrf(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    if genome.neurons.is_empty() {
        return MutationOutcome::NoOp("genome has no neurons");
    }
    let idx = rng.gen_range(0..genome.neurons.len());
    let current = genome.neurons[idx].aggregator_function;
    let choices: Vec<_> = AGGREGATORS.iter().copied().filter(|a| *a != current).collect();
    genome.neurons[idx].aggregator_function = choices[rng.gen_range(0..choices.len())];
    applied("mutate_aggrf", vec![genome.neurons[idx].id.clone()])
}

pub fn add_inlink(genome: &mut Genome, rng: &mut StdRng, ctx: &MutationContext) -> MutationOutcome {
    if genome.neurons.len() < 2 {
        return MutationOutcome::NoOp("need at least two neurons");
    }
    let non_protected: Vec<String> = genome
        .neurons
        .iter()
        .filter(|n| !genome.protected_neuron_ids.contains(&n.id))
        .map(|n| n.id.clone())
        .collect();
    if non_protected.is_empty() {
        return MutationOutcome::NoOp("no non-protected neuron to link into");
    }
    let to_id = non_protected[rng.gen_range(0..non_protected.len())].clone();
    let from_id = genome.neurons[rng.gen_range(0..genome.neurons.len())].id.clone();
    if from_id == to_id {
        return MutationOutcome::NoOp("chosen source and target coincide");
    }
    if genome
        .synapses
        .iter()
        .any(|s| s.from_neuron_id == from_id && s.to_neuron_id == to_id)
    {
        return MutationOutcome::NoOp("synapse already exists");
    }
    if ctx.options.feed_forward_only && creates_cycle(genome, &from_id, &to_id) {
        return MutationOutcome::NoOp("would create a cycle under feed-forward-only");
    }
    let syn_id = fresh_id("syn");
    let weight = gaussian_sample(rng) * ctx.options.perturbation_scale;
    genome.synapses.push(Synapse::new(syn_id.clone(), from_id, to_id, weight));
    applied("add_inlink", vec![syn_id])
}

pub fn add_outlink(genome: &mut Genome, rng: &mut StdRng, ctx: &MutationContext) -> MutationOutcome {
    if genome.neurons.len() < 2 {
        return MutationOutcome::NoOp("need at least two neurons");
    }
    let non_protected: Vec<String> = genome
        .neurons
        .iter()
        .filter(|n| !genome.protected_neuron_ids.contains(&n.id))
        .map(|n| n.id.clone())
        .collect();
    if non_protected.is_empty() {
        return MutationOutcome::NoOp("no non-protected neuron to link out of");
    }
    let from_id = non_protected[rng.gen_range(0..non_protected.len())].clone();
    let to_id = genome.neurons[rng.gen_range(0..genome.neurons.len())].id.clone();
    if from_id == to_id {
        return MutationOutcome::NoOp("chosen source and target coincide");
    }
    if genome
        .synapses
        .iter()
        .any(|s| s.from_neuron_id == from_id && s.to_neuron_id == to_id)
    {
        return MutationOutcome::NoOp("synapse already exists");
    }
    if ctx.options.feed_forward_only && creates_cycle(genome, &from_id, &to_id) {
        return MutationOutcome::NoOp("would create a cycle under feed-forward-only");
    }
    let syn_id = fresh_id("syn");
    let weight = gaussian_sample(rng) * ctx.options.perturbation_scale;
    genome.synapses.push(Synapse::new(syn_id.clone(), from_id, to_id, weight));
    applied("add_outlink", vec![syn_id])
}

pub fn remove_inlink(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    let targets: BTreeSet<String> = genome.synapses.iter().map(|s| s.to_neuron_id.clone()).collect();
    if targets.is_empty() {
        return MutationOutcome::NoOp("no neuron has an incoming link");
    }
    let targets: Vec<String> = targets.into_iter().collect();
    let target = targets[rng.gen_range(0..targets.len())].clone();
    let candidates: Vec<usize> = genome
        .synapses
        .iter()
        .enumerate()
        .filter(|(_, s)| s.to_neuron_id == target)
        .map(|(i, _)| i)
        .collect();
    let idx = candidates[rng.gen_range(0..candidates.len())];
    let removed = genome.synapses.remove(idx);
    applied("remove_inlink", vec![removed.id])
}

pub fn remove_outlink(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    let sources: BTreeSet<String> = genome.synapses.iter().map(|s| s.from_neuron_id.clone()).collect();
    if sources.is_empty() {
        return MutationOutcome::NoOp("no neuron has an outgoing link");
    }
    let sources: Vec<String> = sources.into_iter().collect();
    let source = sources[rng.gen_range(0..sources.len())].clone();
    let candidates: Vec<usize> = genome
        .synapses
        .iter()
        .enumerate()
        .filter(|(_, s)| s.from_neuron_id == source)
        .map(|(i, _)| i)
        .collect();
    let idx = candidates[rng.gen_range(0..candidates.len())];
    let removed = genome.synapses.remove(idx);
    applied("remove_outlink", vec![removed.id])
}

pub fn cutlink_from_neuron_to_neuron(
    genome: &mut Genome,
    rng: &mut StdRng,
    _ctx: &MutationContext,
) -> MutationOutcome {
    if genome.synapses.is_empty() {
        return MutationOutcome::NoOp("no synapses to cut");
    }
    let idx = rng.gen_range(0..genome.synapses.len());
    let removed = genome.synapses.remove(idx);
    applied("cutlink_from_neuron_to_neuron", vec![removed.id])
}

fn splice_neuron_into(genome: &mut Genome, rng: &mut StdRng, idx: usize, name: &str) -> MutationOutcome {
    let original = genome.synapses.remove(idx);
    let new_id = fresh_id("n");
    let mut new_neuron = Neuron::new(new_id.clone(), genome.generation);
    new_neuron.activation_function = ACTIVATIONS[rng.gen_range(0..ACTIVATIONS.len())];
    genome.neurons.push(new_neuron);
    let syn_in_id = fresh_id("syn");
    let syn_out_id = fresh_id("syn");
    genome.synapses.push(Synapse::new(
        syn_in_id.clone(),
        original.from_neuron_id.clone(),
        new_id.clone(),
        1.0,
    ));
    genome.synapses.push(Synapse::new(
        syn_out_id.clone(),
        new_id.clone(),
        original.to_neuron_id.clone(),
        original.weight,
    ));
    applied(name, vec![new_id, syn_in_id, syn_out_id])
}

pub fn add_neuron(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    if genome.synapses.is_empty() {
        return MutationOutcome::NoOp("no synapse to splice a neuron into");
    }
    let idx = rng.gen_range(0..genome.synapses.len());
    splice_neuron_into(genome, rng, idx, "add_neuron")
}

pub fn add_insplice(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    let sensor_targets: BTreeSet<String> = genome
        .sensors
        .values()
        .flat_map(|s| s.linked_neuron_ids.iter().cloned())
        .collect();
    let candidates: Vec<usize> = genome
        .synapses
        .iter()
        .enumerate()
        .filter(|(_, s)| sensor_targets.contains(&s.from_neuron_id))
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return MutationOutcome::NoOp("no edge originates at a sensor-driven neuron");
    }
    let idx = candidates[rng.gen_range(0..candidates.len())];
    splice_neuron_into(genome, rng, idx, "add_insplice")
}

pub fn add_outsplice(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    let actuator_sources: BTreeSet<String> = genome
        .actuators
        .values()
        .flat_map(|a| a.linked_neuron_ids.iter().cloned())
        .collect();
    let candidates: Vec<usize> = genome
        .synapses
        .iter()
        .enumerate()
        .filter(|(_, s)| actuator_sources.contains(&s.to_neuron_id))
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return MutationOutcome::NoOp("no edge terminates at an actuator-driving neuron");
    }
    let idx = candidates[rng.gen_range(0..candidates.len())];
    splice_neuron_into(genome, rng, idx, "add_outsplice")
}

pub fn remove_neuron(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    let candidates: Vec<String> = genome
        .neurons
        .iter()
        .filter(|n| !genome.protected_neuron_ids.contains(&n.id))
        .map(|n| n.id.clone())
        .collect();
    if candidates.is_empty() {
        return MutationOutcome::NoOp("no non-protected neuron to remove");
    }
    let target = candidates[rng.gen_range(0..candidates.len())].clone();
    genome.neurons.retain(|n| n.id != target);
    genome.synapses.retain(|s| s.from_neuron_id != target && s.to_neuron_id != target);
    genome.neuron_actuator_links.retain(|l| l.neuron_id != target);
    for sensor in genome.sensors.values_mut() {
        sensor.linked_neuron_ids.retain(|id| id != &target);
    }
    for actuator in genome.actuators.values_mut() {
        actuator.linked_neuron_ids.retain(|id| id != &target);
    }
    applied("remove_neuron", vec![target])
}

pub fn mutate_pf(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    if genome.neurons.is_empty() {
        return MutationOutcome::NoOp("genome has no neurons");
    }
    let idx = rng.gen_range(0..genome.neurons.len());
    let current = genome.neurons[idx].plasticity_function;
    let choices: Vec<Option<PlasticityRule>> = PLASTICITY_RULES
        .iter()
        .copied()
        .map(Some)
        .filter(|c| *c != current)
        .collect();
    genome.neurons[idx].plasticity_function = choices[rng.gen_range(0..choices.len())];
    applied("mutate_pf", vec![genome.neurons[idx].id.clone()])
}

pub fn mutate_plasticity_parameters(
    genome: &mut Genome,
    rng: &mut StdRng,
    ctx: &MutationContext,
) -> MutationOutcome {
    let Some(plasticity) = genome.plasticity.as_mut() else {
        return MutationOutcome::NoOp("genome has no substrate-level plasticity configuration");
    };
    let delta = gaussian_sample(rng) * ctx.options.perturbation_scale;
    if plasticity.shape_parameters.is_empty() {
        plasticity.shape_parameters.push(delta);
    } else {
        let idx = rng.gen_range(0..plasticity.shape_parameters.len());
        plasticity.shape_parameters[idx] += delta;
    }
    applied("mutate_plasticity_parameters", vec!["substrate_plasticity".into()])
}

pub fn add_sensor(genome: &mut Genome, rng: &mut StdRng, ctx: &MutationContext) -> MutationOutcome {
    let available: Vec<_> = ctx
        .substrate
        .available_sensors
        .iter()
        .filter(|s| !genome.sensors.contains_key(&s.id))
        .collect();
    if available.is_empty() {
        return MutationOutcome::NoOp("no unused sensor template available");
    }
    let template = available[rng.gen_range(0..available.len())].clone();
    let id = template.id.clone();
    genome.sensor_ids.push(id.clone());
    genome.sensors.insert(id.clone(), template);
    applied("add_sensor", vec![id])
}

pub fn remove_sensor(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    if genome.sensor_ids.is_empty() {
        return MutationOutcome::NoOp("genome has no sensors");
    }
    let idx = rng.gen_range(0..genome.sensor_ids.len());
    let id = genome.sensor_ids.remove(idx);
    genome.sensors.remove(&id);
    applied("remove_sensor", vec![id])
}

pub fn add_actuator(genome: &mut Genome, rng: &mut StdRng, ctx: &MutationContext) -> MutationOutcome {
    let available: Vec<_> = ctx
        .substrate
        .available_actuators
        .iter()
        .filter(|a| !genome.actuators.contains_key(&a.id))
        .collect();
    if available.is_empty() {
        return MutationOutcome::NoOp("no unused actuator template available");
    }
    let template = available[rng.gen_range(0..available.len())].clone();
    let id = template.id.clone();
    genome.actuator_ids.push(id.clone());
    genome.actuators.insert(id.clone(), template);
    applied("add_actuator", vec![id])
}

pub fn remove_actuator(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    if genome.actuator_ids.is_empty() {
        return MutationOutcome::NoOp("genome has no actuators");
    }
    let idx = rng.gen_range(0..genome.actuator_ids.len());
    let id = genome.actuator_ids.remove(idx);
    genome.actuators.remove(&id);
    genome.neuron_actuator_links.retain(|l| l.actuator_id != id);
    applied("remove_actuator", vec![id])
}

pub fn add_sensor_link(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    if genome.sensor_ids.is_empty() || genome.neurons.is_empty() {
        return MutationOutcome::NoOp("no sensor or neuron available");
    }
    let sensor_id = genome.sensor_ids[rng.gen_range(0..genome.sensor_ids.len())].clone();
    let linked = genome
        .sensors
        .get(&sensor_id)
        .map(|s| s.linked_neuron_ids.clone())
        .unwrap_or_default();
    let candidates: Vec<String> = genome
        .neurons
        .iter()
        .map(|n| n.id.clone())
        .filter(|id| !linked.contains(id))
        .collect();
    if candidates.is_empty() {
        return MutationOutcome::NoOp("sensor already fans out to every neuron");
    }
    let neuron_id = candidates[rng.gen_range(0..candidates.len())].clone();
    if let Some(sensor) = genome.sensors.get_mut(&sensor_id) {
        sensor.linked_neuron_ids.push(neuron_id.clone());
    }
    applied("add_sensor_link", vec![sensor_id, neuron_id])
}

pub fn remove_sensor_link(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    let candidates: Vec<String> = genome
        .sensors
        .iter()
        .filter(|(_, s)| !s.linked_neuron_ids.is_empty())
        .map(|(id, _)| id.clone())
        .collect();
    if candidates.is_empty() {
        return MutationOutcome::NoOp("no sensor has a fanout link to remove");
    }
    let sensor_id = candidates[rng.gen_range(0..candidates.len())].clone();
    let removed_neuron = {
        let sensor = genome.sensors.get_mut(&sensor_id).unwrap();
        let idx = rng.gen_range(0..sensor.linked_neuron_ids.len());
        sensor.linked_neuron_ids.remove(idx)
    };
    applied("remove_sensor_link", vec![sensor_id, removed_neuron])
}

pub fn add_actuator_link(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    if genome.actuator_ids.is_empty() || genome.neurons.is_empty() {
        return MutationOutcome::NoOp("no actuator or neuron available");
    }
    let actuator_id = genome.actuator_ids[rng.gen_range(0..genome.actuator_ids.len())].clone();
    let linked = genome
        .actuators
        .get(&actuator_id)
        .map(|a| a.linked_neuron_ids.clone())
        .unwrap_or_default();
    let candidates: Vec<String> = genome
        .neurons
        .iter()
        .map(|n| n.id.clone())
        .filter(|id| !linked.contains(id))
        .collect();
    if candidates.is_empty() {
        return MutationOutcome::NoOp("actuator already receives from every neuron");
    }
    let neuron_id = candidates[rng.gen_range(0..candidates.len())].clone();
    if let Some(actuator) = genome.actuators.get_mut(&actuator_id) {
        actuator.linked_neuron_ids.push(neuron_id.clone());
    }
    genome.neuron_actuator_links.push(NeuronActuatorLink {
        neuron_id: neuron_id.clone(),
        actuator_id: actuator_id.clone(),
    });
    applied("add_actuator_link", vec![actuator_id, neuron_id])
}

pub fn remove_actuator_link(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    if genome.neuron_actuator_links.is_empty() {
        return MutationOutcome::NoOp("no actuator fanin link to remove");
    }
    let idx = rng.gen_range(0..genome.neuron_actuator_links.len());
    let link = genome.neuron_actuator_links.remove(idx);
    if let Some(actuator) = genome.actuators.get_mut(&link.actuator_id) {
        actuator.linked_neuron_ids.retain(|id| id != &link.neuron_id);
    }
    applied("remove_actuator_link", vec![link.actuator_id, link.neuron_id])
}

pub fn add_cpp(genome: &mut Genome, rng: &mut StdRng, ctx: &MutationContext) -> MutationOutcome {
    let Some(substrate) = genome.substrate.as_mut() else {
        return MutationOutcome::NoOp("genome has no substrate configuration");
    };
    let available: Vec<String> = ctx
        .substrate
        .available_cpp_ids
        .iter()
        .filter(|id| !substrate.cpp_ids.contains(id))
        .cloned()
        .collect();
    if available.is_empty() {
        return MutationOutcome::NoOp("no unused cpp endpoint available");
    }
    let id = available[rng.gen_range(0..available.len())].clone();
    substrate.cpp_ids.push(id.clone());
    applied("add_cpp", vec![id])
}

pub fn remove_cpp(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    let Some(substrate) = genome.substrate.as_mut() else {
        return MutationOutcome::NoOp("genome has no substrate configuration");
    };
    if substrate.cpp_ids.is_empty() {
        return MutationOutcome::NoOp("substrate has no cpp endpoints");
    }
    let idx = rng.gen_range(0..substrate.cpp_ids.len());
    let id = substrate.cpp_ids.remove(idx);
    applied("remove_cpp", vec![id])
}

pub fn add_cep(genome: &mut Genome, rng: &mut StdRng, ctx: &MutationContext) -> MutationOutcome {
    let Some(substrate) = genome.substrate.as_mut() else {
        return MutationOutcome::NoOp("genome has no substrate configuration");
    };
    let available: Vec<String> = ctx
        .substrate
        .available_cep_ids
        .iter()
        .filter(|id| !substrate.cep_ids.contains(id))
        .cloned()
        .collect();
    if available.is_empty() {
        return MutationOutcome::NoOp("no unused cep endpoint available");
    }
    let id = available[rng.gen_range(0..available.len())].clone();
    substrate.cep_ids.push(id.clone());
    applied("add_cep", vec![id])
}

pub fn remove_cep(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    let Some(substrate) = genome.substrate.as_mut() else {
        return MutationOutcome::NoOp("genome has no substrate configuration");
    };
    if substrate.cep_ids.is_empty() {
        return MutationOutcome::NoOp("substrate has no cep endpoints");
    }
    let idx = rng.gen_range(0..substrate.cep_ids.len());
    let id = substrate.cep_ids.remove(idx);
    applied("remove_cep", vec![id])
}

pub fn mutate_tuning_selection(genome: &mut Genome, rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    let current = genome.tuning_meta.candidate_selection;
    let choices: Vec<_> = CANDIDATE_SELECTIONS.iter().copied().filter(|c| *c != current).collect();
    genome.tuning_meta.candidate_selection = choices[rng.gen_range(0..choices.len())];
    applied("mutate_tuning_selection", vec!["tuning_meta".into()])
}

pub fn mutate_annealing(genome: &mut Genome, rng: &mut StdRng, ctx: &MutationContext) -> MutationOutcome {
    let delta = gaussian_sample(rng) * 0.1 * ctx.options.perturbation_scale;
    genome.tuning_meta.annealing_factor = (genome.tuning_meta.annealing_factor + delta).max(0.0);
    applied("mutate_annealing", vec!["tuning_meta".into()])
}

pub fn mutate_heredity_type(genome: &mut Genome, _rng: &mut StdRng, _ctx: &MutationContext) -> MutationOutcome {
    genome.tuning_meta.heredity_type = match genome.tuning_meta.heredity_type {
        HeredityType::Darwinian => HeredityType::Lamarckian,
        HeredityType::Lamarckian => HeredityType::Darwinian,
    };
    applied("mutate_heredity_type", vec!["tuning_meta".into()])
}

pub fn mutate_tot_topological_mutations(
    genome: &mut Genome,
    rng: &mut StdRng,
    _ctx: &MutationContext,
) -> MutationOutcome {
    let delta: i64 = if rng.gen_bool(0.5) { 1 } else { -1 };
    let current = genome.tuning_meta.tot_topological_mutations as i64;
    genome.tuning_meta.tot_topological_mutations = (current + delta).max(1) as u32;
    applied("mutate_tot_topological_mutations", vec!["tuning_meta".into()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use protogonos_genome::Genome as GenomeT;
    use rand::SeedableRng;

    fn wired_genome() -> GenomeT {
        let mut g = GenomeT::new("g1", 0);
        g.neurons.push(Neuron::new("n1", 0));
        g.neurons.push(Neuron::new("n2", 0));
        g.synapses.push(Synapse::new("s1", "n1", "n2", 0.5));
        g.protected_neuron_ids.insert("n1".into());
        g.protected_neuron_ids.insert("n2".into());
        g
    }

    #[test]
    fn perturb_weights_touches_every_synapse() {
        let mut g = wired_genome();
        let mut rng = StdRng::seed_from_u64(1);
        let ctx = MutationContext::default();
        let before = g.synapses[0].weight;
        let outcome = perturb_weights(&mut g, &mut rng, &ctx);
        assert!(outcome.is_applied());
        assert_ne!(g.synapses[0].weight, before);
    }

    #[test]
    fn add_neuron_splices_and_preserves_endpoints() {
        let mut g = wired_genome();
        let mut rng = StdRng::seed_from_u64(2);
        let ctx = MutationContext::default();
        add_neuron(&mut g, &mut rng, &ctx);
        assert_eq!(g.neurons.len(), 3);
        assert_eq!(g.synapses.len(), 2);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn remove_neuron_never_touches_protected_ids() {
        let mut g = wired_genome();
        let mut rng = StdRng::seed_from_u64(3);
        let ctx = MutationContext::default();
        let outcome = remove_neuron(&mut g, &mut rng, &ctx);
        assert!(matches!(outcome, MutationOutcome::NoOp(_)));
        assert_eq!(g.neurons.len(), 2);
    }

    #[test]
    fn add_inlink_respects_feed_forward_only() {
        let mut g = wired_genome();
        g.protected_neuron_ids.clear();
        let mut rng = StdRng::seed_from_u64(4);
        let ctx = MutationContext {
            options: crate::context::MutationOptions {
                feed_forward_only: true,
                ..Default::default()
            },
            ..Default::default()
        };
        // n2 -> n1 would close a cycle given the existing n1 -> n2 edge.
        for _ in 0..50 {
            let before = g.synapses.len();
            add_inlink(&mut g, &mut rng, &ctx);
            for s in &g.synapses {
                assert!(!creates_cycle(&g, &s.to_neuron_id, &s.from_neuron_id) || s.from_neuron_id == s.to_neuron_id);
            }
            let _ = before;
        }
    }

    #[test]
    fn mutate_af_always_changes_the_function() {
        let mut g = wired_genome();
        let mut rng = StdRng::seed_from_u64(5);
        let ctx = MutationContext::default();
        let before: Vec<_> = g.neurons.iter().map(|n| n.activation_function).collect();
        mutate_af(&mut g, &mut rng, &ctx);
        let after: Vec<_> = g.neurons.iter().map(|n| n.activation_function).collect();
        assert_ne!(before, after);
    }
}
