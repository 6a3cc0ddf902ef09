// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Groups a generation's genomes into species and tracks which
//! species keys were born or died relative to the previous
//! generation.

use protogonos_genome::{Fitness, Genome, SpeciationMode};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// A fingerprint-like hash that, unlike `Genome::fingerprint`, also
/// folds in weight values — two genomes with identical topology but
/// different weights land in different `Fingerprint`-mode species,
/// where `Topology`-mode groups them together.
fn exact_fingerprint(genome: &Genome) -> String {
    let mut weight_lines: Vec<String> = genome
        .synapses
        .iter()
        .map(|s| format!("{}:{:.12}", s.id, s.weight))
        .collect();
    weight_lines.sort();
    let mut bias_lines: Vec<String> = genome
        .neurons
        .iter()
        .filter_map(|n| n.bias.map(|b| format!("{}:{:.12}", n.id, b)))
        .collect();
    bias_lines.sort();

    let mut hasher = Sha256::new();
    hasher.update(genome.fingerprint().as_bytes());
    hasher.update(weight_lines.join(";").as_bytes());
    hasher.update(bias_lines.join(";").as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}

fn species_key(genome: &Genome, mode: SpeciationMode) -> String {
    match mode {
        SpeciationMode::Topology => genome.fingerprint(),
        SpeciationMode::TotN => genome.neurons.len().to_string(),
        SpeciationMode::Fingerprint => exact_fingerprint(genome),
    }
}

/// Species key -> population indices, in first-occurrence order.
pub fn speciate(genomes: &[Genome], mode: SpeciationMode) -> BTreeMap<String, Vec<usize>> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, genome) in genomes.iter().enumerate() {
        groups.entry(species_key(genome, mode)).or_default().push(idx);
    }
    groups
}

pub fn species_metrics(
    genomes: &[Genome],
    groups: &BTreeMap<String, Vec<usize>>,
) -> Vec<protogonos_genome::SpeciesMetrics> {
    groups
        .iter()
        .map(|(key, indices)| {
            let scores: Vec<f64> = indices
                .iter()
                .filter_map(|&i| genomes[i].meta.fitness.as_ref().map(Fitness::primary))
                .collect();
            let best_fitness = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let mean_fitness = if scores.is_empty() {
                0.0
            } else {
                scores.iter().sum::<f64>() / scores.len() as f64
            };
            protogonos_genome::SpeciesMetrics {
                species_key: key.clone(),
                size: indices.len(),
                mean_fitness,
                best_fitness: if best_fitness.is_finite() { best_fitness } else { 0.0 },
            }
        })
        .collect()
}

/// `(added, removed)` species keys relative to `previous`.
pub fn diff_species(current: &BTreeSet<String>, previous: &BTreeSet<String>) -> (BTreeSet<String>, BTreeSet<String>) {
    let added = current.difference(previous).cloned().collect();
    let removed = previous.difference(current).cloned().collect();
    (added, removed)
}

/// Fraction of genomes with a unique structural fingerprint; `1.0`
/// means every genome is structurally distinct, `1/N` means they are
/// all structurally identical.
pub fn fingerprint_diversity(genomes: &[Genome]) -> f64 {
    if genomes.is_empty() {
        return 0.0;
    }
    let unique: BTreeSet<&str> = genomes.iter().map(|g| g.meta.fingerprint.as_str()).collect();
    unique.len() as f64 / genomes.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use protogonos_genome::Neuron;

    fn genome_with_neurons(id: &str, n: usize) -> Genome {
        let mut g = Genome::new(id, 0);
        for i in 0..n {
            g.neurons.push(Neuron::new(format!("n{i}"), 0));
        }
        g.meta.fingerprint = g.fingerprint();
        g
    }

    #[test]
    fn tot_n_groups_by_neuron_count() {
        let genomes = vec![
            genome_with_neurons("a", 3),
            genome_with_neurons("b", 3),
            genome_with_neurons("c", 5),
        ];
        let groups = speciate(&genomes, SpeciationMode::TotN);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get("3").unwrap().len(), 2);
    }

    #[test]
    fn diff_reports_new_and_vanished_species() {
        let previous: BTreeSet<String> = ["a".to_string(), "b".to_string()].into_iter().collect();
        let current: BTreeSet<String> = ["b".to_string(), "c".to_string()].into_iter().collect();
        let (added, removed) = diff_species(&current, &previous);
        assert_eq!(added, ["c".to_string()].into_iter().collect());
        assert_eq!(removed, ["a".to_string()].into_iter().collect());
    }

    #[test]
    fn identical_topology_has_zero_diversity() {
        let genomes = vec![genome_with_neurons("a", 2), genome_with_neurons("b", 2)];
        assert_eq!(fingerprint_diversity(&genomes), 0.5);
    }
}
