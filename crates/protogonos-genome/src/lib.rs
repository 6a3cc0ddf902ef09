// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! # protogonos-genome
//!
//! The typed graph genome at the center of Protogonos: neurons,
//! synapses, sensors/actuators, substrate and plasticity
//! configuration, tuning metadata, and the lineage/diagnostics
//! records the rest of the workspace persists and reports on.
//!
//! This crate has no evolutionary *logic* (no mutation, no selection)
//! — it only defines the data model and the structural operations
//! (clone, fingerprint, summary, validate) the rest of the workspace
//! builds on. The catalog module centralizes every closed enum used
//! anywhere in the workspace so aliases expand in exactly one place.

pub mod catalog;
pub mod diagnostics;
pub mod error;
pub mod genome;
pub mod lineage;
pub mod neuron;
pub mod snapshot;
pub mod substrate;
pub mod synapse;

pub use catalog::{
    ActivationFunction, AggregatorFunction, CandidateSelection, FitnessPostprocessing,
    HeredityType, PlasticityRule, ProcessorTag, SelectionStrategy, SpeciationMode,
    TopologicalCountPolicy, TuneAttemptPolicy, TuningDurationPolicy,
};
pub use diagnostics::{GenerationDiagnostics, SpeciesGeneration, SpeciesMetrics, TuningCounters};
pub use error::{ErrorKind, ProtoError, ProtoResult};
pub use genome::{Fitness, Genome, GenomeMeta};
pub use lineage::{EvoHistoryEvent, GenomeSummary, LineageRecord};
pub use neuron::Neuron;
pub use snapshot::{PopulationSnapshot, CODEC_VERSION, SCHEMA_VERSION};
pub use substrate::{PlasticityConfig, SubstrateConfig, TuningMeta};
pub use synapse::{IoUnit, NeuronActuatorLink, Synapse};
