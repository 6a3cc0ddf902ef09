// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Weighted operator selection and the reproduction entry point.

use crate::context::{MutationContext, MutationOutcome as Outcome};
use crate::operators;
use crate::topological_count::{topological_mutation_count, TopologicalCountParams};
use protogonos_genome::{EvoHistoryEvent, Genome, LineageRecord, TopologicalCountPolicy};
use rand::rngs::StdRng;
use rand::Rng;

/// One entry in the weighted mutation catalog.
#[derive(Clone, Copy)]
pub struct MutationCatalogEntry {
    pub name: &'static str,
    pub weight: f64,
    pub apply: fn(&mut Genome, &mut StdRng, &MutationContext) -> Outcome,
}

/// The full operator catalog with uniform weight. Callers wanting a
/// biased catalog can clone this and adjust individual weights.
pub fn default_catalog() -> Vec<MutationCatalogEntry> {
    macro_rules! entry {
        ($name:literal, $f:path) => {
            MutationCatalogEntry {
                name: $name,
                weight: 1.0,
                apply: $f,
            }
        };
    }
    vec![
        entry!("perturb_weights", operators::perturb_weights),
        entry!("add_bias", operators::add_bias),
        entry!("remove_bias", operators::remove_bias),
        entry!("mutate_af", operators::mutate_af),
        entry!("mutate_aggrf", operators::mutate_aggrf),
        entry!("add_inlink", operators::add_inlink),
        entry!("add_outlink", operators::add_outlink),
        entry!("remove_inlink", operators::remove_inlink),
        entry!("remove_outlink", operators::remove_outlink),
        entry!("cutlink_from_neuron_to_neuron", operators::cutlink_from_neuron_to_neuron),
        entry!("add_neuron", operators::add_neuron),
        entry!("add_insplice", operators::add_insplice),
        entry!("add_outsplice", operators::add_outsplice),
        entry!("remove_neuron", operators::remove_neuron),
        entry!("mutate_pf", operators::mutate_pf),
        entry!("mutate_plasticity_parameters", operators::mutate_plasticity_parameters),
        entry!("add_sensor", operators::add_sensor),
        entry!("remove_sensor", operators::remove_sensor),
        entry!("add_actuator", operators::add_actuator),
        entry!("remove_actuator", operators::remove_actuator),
        entry!("add_sensor_link", operators::add_sensor_link),
        entry!("remove_sensor_link", operators::remove_sensor_link),
        entry!("add_actuator_link", operators::add_actuator_link),
        entry!("remove_actuator_link", operators::remove_actuator_link),
        entry!("add_cpp", operators::add_cpp),
        entry!("remove_cpp", operators::remove_cpp),
        entry!("add_cep", operators::add_cep),
        entry!("remove_cep", operators::remove_cep),
        entry!("mutate_tuning_selection", operators::mutate_tuning_selection),
        entry!("mutate_annealing", operators::mutate_annealing),
        entry!("mutate_heredity_type", operators::mutate_heredity_type),
        entry!("mutate_tot_topological_mutations", operators::mutate_tot_topological_mutations),
    ]
}

fn pick_weighted<'a>(catalog: &'a [MutationCatalogEntry], rng: &mut StdRng) -> &'a MutationCatalogEntry {
    let total: f64 = catalog.iter().map(|e| e.weight.max(0.0)).sum();
    if total <= 0.0 {
        return &catalog[rng.gen_range(0..catalog.len())];
    }
    let mut draw = rng.gen_range(0.0..total);
    for entry in catalog {
        let w = entry.weight.max(0.0);
        if draw < w {
            return entry;
        }
        draw -= w;
    }
    catalog.last().expect("catalog must be non-empty")
}

/// Applies `count` topological mutations to `genome` in place,
/// retrying a fresh weighted draw whenever an operator reports a
/// no-op, up to a bounded number of attempts so a genome offering no
/// eligible mutation at all (e.g. a single protected neuron, no
/// synapses) cannot spin forever.
pub fn apply_topological_mutations(
    genome: &mut Genome,
    count: u32,
    catalog: &[MutationCatalogEntry],
    ctx: &MutationContext,
    rng: &mut StdRng,
) -> Vec<EvoHistoryEvent> {
    let mut events = Vec::new();
    let max_attempts = (count as usize).saturating_mul(8).max(16);
    let mut applied = 0u32;
    let mut attempts = 0usize;
    while applied < count && attempts < max_attempts {
        attempts += 1;
        let entry = pick_weighted(catalog, rng);
        match (entry.apply)(genome, rng, ctx) {
            Outcome::Applied(event) => {
                events.push(event);
                applied += 1;
            }
            Outcome::NoOp(_) => continue,
        }
    }
    events
}

/// Clone `parent` into a new generation, apply the topological
/// mutation budget resolved from `policy`, and produce the
/// accompanying lineage record.
pub fn reproduce(
    parent: &Genome,
    child_id: impl Into<String>,
    policy: TopologicalCountPolicy,
    params: &TopologicalCountParams,
    catalog: &[MutationCatalogEntry],
    ctx: &MutationContext,
    rng: &mut StdRng,
) -> (Genome, LineageRecord) {
    let mut child = parent.clone();
    child.id = child_id.into();
    child.generation = parent.generation + 1;
    child.meta.parent_ids = vec![parent.id.clone()];
    child.meta.offspring_ids.clear();
    child.meta.champion = false;
    child.meta.fitness = None;

    let count = topological_mutation_count(
        policy,
        params,
        child.tuning_meta.tot_topological_mutations,
        child.neurons.len(),
        child.synapses.iter().filter(|s| s.enabled).count(),
    );
    let events = apply_topological_mutations(&mut child, count, catalog, ctx, rng);
    child.meta.history.extend(events.iter().cloned());
    child.meta.fingerprint = child.fingerprint();

    let record = LineageRecord {
        genome_id: child.id.clone(),
        parent_id: Some(parent.id.clone()),
        generation: child.generation,
        operation: "reproduce".to_string(),
        events,
        fingerprint: child.meta.fingerprint.clone(),
        summary: child.summary(),
    };
    (child, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use protogonos_genome::{Neuron, Synapse};
    use rand::SeedableRng;

    fn wired_genome() -> Genome {
        let mut g = Genome::new("parent", 0);
        g.neurons.push(Neuron::new("n1", 0));
        g.neurons.push(Neuron::new("n2", 0));
        g.neurons.push(Neuron::new("n3", 0));
        g.synapses.push(Synapse::new("s1", "n1", "n2", 0.5));
        g.synapses.push(Synapse::new("s2", "n2", "n3", -0.3));
        g.protected_neuron_ids.insert("n1".into());
        g.protected_neuron_ids.insert("n3".into());
        g
    }

    #[test]
    fn reproduce_bumps_generation_and_records_lineage() {
        let parent = wired_genome();
        let catalog = default_catalog();
        let ctx = MutationContext::default();
        let mut rng = StdRng::seed_from_u64(7);
        let params = TopologicalCountParams::default();
        let (child, record) = reproduce(
            &parent,
            "child-1",
            TopologicalCountPolicy::Const,
            &params,
            &catalog,
            &ctx,
            &mut rng,
        );
        assert_eq!(child.generation, 1);
        assert_eq!(record.parent_id, Some("parent".to_string()));
        assert_eq!(record.generation, 1);
        assert!(child.validate().is_ok());
        assert!(!record.events.is_empty());
    }

    #[test]
    fn reproduce_is_deterministic_for_a_fixed_seed() {
        let parent = wired_genome();
        let catalog = default_catalog();
        let ctx = MutationContext::default();
        let params = TopologicalCountParams::default();

        let mut rng_a = StdRng::seed_from_u64(99);
        let (child_a, _) = reproduce(&parent, "a", TopologicalCountPolicy::Const, &params, &catalog, &ctx, &mut rng_a);

        let mut rng_b = StdRng::seed_from_u64(99);
        let (child_b, _) = reproduce(&parent, "a", TopologicalCountPolicy::Const, &params, &catalog, &ctx, &mut rng_b);

        assert_eq!(child_a.fingerprint(), child_b.fingerprint());
    }
}
