// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

use protogonos_genome::{EvoHistoryEvent, IoUnit};

/// Knobs shared by every mutation operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationOptions {
    /// When set, link-adding operators reject any edge that would
    /// close a directed cycle.
    pub feed_forward_only: bool,
    /// Scale applied to the per-weight Gaussian perturbation used by
    /// `perturb_weights`, `mutate_plasticity_parameters` and bias
    /// perturbation.
    pub perturbation_scale: f64,
}

impl Default for MutationOptions {
    fn default() -> Self {
        MutationOptions {
            feed_forward_only: false,
            perturbation_scale: 1.0,
        }
    }
}

/// What a scape is willing to offer the mutation engine when an
/// operator wants to add or remove a sensor, actuator, CPP or CEP
/// endpoint. An empty catalog makes the corresponding operators
/// permanent no-ops, which is a valid configuration for scapes with a
/// fixed, already-wired interface.
#[derive(Debug, Clone, Default)]
pub struct SubstrateCatalog {
    pub available_sensors: Vec<IoUnit>,
    pub available_actuators: Vec<IoUnit>,
    pub available_cpp_ids: Vec<String>,
    pub available_cep_ids: Vec<String>,
}

/// Bundles the options and catalog an operator needs, so the operator
/// function signature stays fixed as the catalog of operators grows.
#[derive(Debug, Clone, Default)]
pub struct MutationContext {
    pub options: MutationOptions,
    pub substrate: SubstrateCatalog,
}

/// Result of attempting to apply one mutation operator.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The operator changed the genome; carries the history event to
    /// append and include in the reproduction's lineage record.
    Applied(EvoHistoryEvent),
    /// The operator found nothing eligible to act on and left the
    /// genome untouched. Not an error: e.g. `RemoveBias` on a genome
    /// where no neuron currently has a bias.
    NoOp(&'static str),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied(_))
    }
}
