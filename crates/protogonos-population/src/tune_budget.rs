// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Resolves how many tuning attempts a generation spends on each
//! elite, per `TuneAttemptPolicy`.

use protogonos_genome::{Genome, TuneAttemptPolicy};

#[allow(clippy::too_many_arguments)]
pub fn tune_attempts_for_generation(
    policy: TuneAttemptPolicy,
    base_attempts: u32,
    min_attempts: u32,
    generation: u64,
    expected_total_generations: u64,
    genome: &Genome,
) -> u32 {
    match policy {
        TuneAttemptPolicy::Fixed => base_attempts,
        TuneAttemptPolicy::LinearDecay => {
            let total = expected_total_generations.max(1) as f64;
            let progress = (generation as f64 / total).min(1.0);
            let span = base_attempts.saturating_sub(min_attempts) as f64;
            let decayed = base_attempts as f64 - span * progress;
            decayed.round().max(min_attempts as f64) as u32
        }
        TuneAttemptPolicy::TopologyScaled => {
            let neurons = genome.neurons.len().max(1) as f64;
            let synapses = genome.synapses.iter().filter(|s| s.enabled).count().max(1) as f64;
            let scale = (neurons * synapses).sqrt().max(1.0);
            ((base_attempts as f64) * scale.ln().max(1.0)).round().max(min_attempts as f64) as u32
        }
        TuneAttemptPolicy::NsizeProportional => {
            let neurons = genome.neurons.len() as f64;
            (base_attempts as f64 * neurons).round().max(min_attempts as f64) as u32
        }
        TuneAttemptPolicy::WsizeProportional => {
            let synapses = genome.synapses.iter().filter(|s| s.enabled).count() as f64;
            (base_attempts as f64 * synapses).round().max(min_attempts as f64) as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_policy_ignores_generation_and_genome() {
        let g = Genome::new("g", 0);
        assert_eq!(tune_attempts_for_generation(TuneAttemptPolicy::Fixed, 7, 1, 50, 100, &g), 7);
    }

    #[test]
    fn linear_decay_reaches_minimum_at_final_generation() {
        let g = Genome::new("g", 0);
        let at_end = tune_attempts_for_generation(TuneAttemptPolicy::LinearDecay, 20, 5, 100, 100, &g);
        assert_eq!(at_end, 5);
        let at_start = tune_attempts_for_generation(TuneAttemptPolicy::LinearDecay, 20, 5, 0, 100, &g);
        assert_eq!(at_start, 20);
    }

    #[test]
    fn nsize_proportional_scales_with_neuron_count() {
        let mut g = Genome::new("g", 0);
        for i in 0..4 {
            g.neurons.push(protogonos_genome::Neuron::new(format!("n{i}"), 0));
        }
        let attempts = tune_attempts_for_generation(TuneAttemptPolicy::NsizeProportional, 2, 0, 0, 10, &g);
        assert_eq!(attempts, 8);
    }
}
