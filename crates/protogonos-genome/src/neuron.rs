// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::catalog::{AggregatorFunction, ActivationFunction, PlasticityRule, ProcessorTag};
use serde::{Deserialize, Serialize};

/// A single node in the genome's directed neural graph.
///
/// Identified by a string id, not a pointer, so genomes can be cloned
/// by copying flat vectors and maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub id: String,
    pub generation: u64,
    pub activation_function: ActivationFunction,
    pub aggregator_function: AggregatorFunction,
    pub bias: Option<f64>,
    /// Per-element plasticity-bias parameter vector; absent means "no
    /// plasticity applied to bias".
    pub plasticity_bias_parameters: Vec<f64>,
    pub pre_processor: ProcessorTag,
    pub post_processor: ProcessorTag,
    pub plasticity_function: Option<PlasticityRule>,
    pub recurrent: bool,
}

impl Neuron {
    pub fn new(id: impl Into<String>, generation: u64) -> Self {
        Neuron {
            id: id.into(),
            generation,
            activation_function: ActivationFunction::Tanh,
            aggregator_function: AggregatorFunction::DotProduct,
            bias: None,
            plasticity_bias_parameters: Vec::new(),
            pre_processor: ProcessorTag::None,
            post_processor: ProcessorTag::None,
            plasticity_function: None,
            recurrent: false,
        }
    }
}
