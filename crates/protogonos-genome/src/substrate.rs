// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::catalog::{CandidateSelection, HeredityType, TuningDurationPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Substrate-encoding configuration (CPPN-style CPP/CEP endpoints),
/// optional on a genome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstrateConfig {
    pub cpp_ids: Vec<String>,
    pub cep_ids: Vec<String>,
    pub parameters: BTreeMap<String, f64>,
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        SubstrateConfig {
            cpp_ids: Vec::new(),
            cep_ids: Vec::new(),
            parameters: BTreeMap::new(),
        }
    }
}

/// Genome-level plasticity configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlasticityConfig {
    pub rule: crate::catalog::PlasticityRule,
    pub rate: f64,
    pub shape_parameters: Vec<f64>,
}

impl Default for PlasticityConfig {
    fn default() -> Self {
        PlasticityConfig {
            rule: crate::catalog::PlasticityRule::None,
            rate: 0.0,
            shape_parameters: Vec::new(),
        }
    }
}

/// Exoself tuning-meta embedded on a genome.
///
/// Validity requires `steps>0, step_size>0, perturbation_range>=0,
/// annealing_factor>=0, min_improvement>=0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningMeta {
    pub candidate_selection: CandidateSelection,
    pub annealing_factor: f64,
    pub perturbation_range: f64,
    pub duration_policy: TuningDurationPolicy,
    pub heredity_type: HeredityType,
    pub steps: u32,
    pub step_size: f64,
    pub min_improvement: f64,
    /// Per-genome override/baseline for the topological-mutation-count
    /// policy; perturbed in place by the tuning-meta mutation operator.
    pub tot_topological_mutations: u32,
}

impl Default for TuningMeta {
    fn default() -> Self {
        TuningMeta {
            candidate_selection: CandidateSelection::BestSoFar,
            annealing_factor: 0.5,
            perturbation_range: 1.0,
            duration_policy: TuningDurationPolicy::Fixed,
            heredity_type: HeredityType::Darwinian,
            steps: 1,
            step_size: 1.0,
            min_improvement: 0.0,
            tot_topological_mutations: 1,
        }
    }
}

impl TuningMeta {
    pub fn validate(&self) -> Result<(), crate::error::ProtoError> {
        if self.steps == 0 {
            return Err(crate::error::ProtoError::Validation(
                "tuning_meta.steps must be > 0".into(),
            ));
        }
        if self.step_size <= 0.0 {
            return Err(crate::error::ProtoError::Validation(
                "tuning_meta.step_size must be > 0".into(),
            ));
        }
        if self.perturbation_range < 0.0 {
            return Err(crate::error::ProtoError::Validation(
                "tuning_meta.perturbation_range must be >= 0".into(),
            ));
        }
        if self.annealing_factor < 0.0 {
            return Err(crate::error::ProtoError::Validation(
                "tuning_meta.annealing_factor must be >= 0".into(),
            ));
        }
        if self.min_improvement < 0.0 {
            return Err(crate::error::ProtoError::Validation(
                "tuning_meta.min_improvement must be >= 0".into(),
            ));
        }
        Ok(())
    }
}
