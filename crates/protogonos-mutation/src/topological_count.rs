// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! How many topological mutations a single reproduction applies.

use protogonos_genome::TopologicalCountPolicy;

/// Tunable knobs behind each policy. A given policy only reads the
/// fields it needs; the rest are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologicalCountParams {
    pub multiplier: f64,
    pub power: f64,
    pub max: u32,
}

impl Default for TopologicalCountParams {
    fn default() -> Self {
        TopologicalCountParams {
            multiplier: 0.5,
            power: 0.5,
            max: 10,
        }
    }
}

/// Resolve the number of topological mutation operators a single
/// reproduction call should apply this generation.
///
/// `Const` ignores graph size and always returns the genome's
/// `tot_topological_mutations` baseline. The linear and exponential
/// policies scale with neuron or enabled-synapse count and are
/// clamped to `[1, params.max]` so a reproduction never applies zero
/// topological changes nor runs away on a large graph.
pub fn topological_mutation_count(
    policy: TopologicalCountPolicy,
    params: &TopologicalCountParams,
    tot_topological_mutations: u32,
    neuron_count: usize,
    enabled_synapse_count: usize,
) -> u32 {
    let raw = match policy {
        TopologicalCountPolicy::Const => tot_topological_mutations as f64,
        TopologicalCountPolicy::NcountLinear => params.multiplier * neuron_count as f64,
        TopologicalCountPolicy::NcountExponential => (neuron_count as f64).powf(params.power),
        TopologicalCountPolicy::WcountLinear => params.multiplier * enabled_synapse_count as f64,
    };
    (raw.ceil() as i64).clamp(1, params.max as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_policy_uses_baseline_directly() {
        let params = TopologicalCountParams::default();
        assert_eq!(
            topological_mutation_count(TopologicalCountPolicy::Const, &params, 3, 50, 80),
            3
        );
    }

    #[test]
    fn linear_policy_scales_with_neuron_count_and_clamps() {
        let params = TopologicalCountParams {
            multiplier: 1.0,
            ..TopologicalCountParams::default()
        };
        assert_eq!(
            topological_mutation_count(TopologicalCountPolicy::NcountLinear, &params, 1, 4, 0),
            4
        );
        assert_eq!(
            topological_mutation_count(TopologicalCountPolicy::NcountLinear, &params, 1, 500, 0),
            params.max
        );
    }

    #[test]
    fn result_is_never_zero() {
        let params = TopologicalCountParams::default();
        assert_eq!(
            topological_mutation_count(TopologicalCountPolicy::NcountLinear, &params, 1, 0, 0),
            1
        );
    }
}
