// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! # protogonos-mutation
//!
//! The topology and parameter mutation engine: a weighted catalog of
//! operators over `protogonos_genome::Genome`, the policy that decides
//! how many of them a single reproduction applies, and the
//! deterministic per-genome RNG derivation the rest of the workspace
//! reuses for reproducible runs.

pub mod context;
pub mod engine;
pub mod operators;
pub mod rng;
pub mod topological_count;

pub use context::{MutationContext, MutationOptions, MutationOutcome, SubstrateCatalog};
pub use engine::{apply_topological_mutations, default_catalog, reproduce, MutationCatalogEntry};
pub use rng::{rng_for_index, seed_for_index, splitmix64};
pub use topological_count::{topological_mutation_count, TopologicalCountParams};
