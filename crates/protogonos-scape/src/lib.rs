// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! # protogonos-scape
//!
//! The `Scape` trait is the evaluation contract every environment
//! implements: given a genome and a seed, produce a fitness. This
//! crate also ships `XorScape`, a minimal feed-forward simulator used
//! by the workspace's own tests and the CLI's demo run.

pub mod xor;

use protogonos_genome::{Fitness, Genome, IoUnit, ProtoResult};

/// An evaluation environment. Implementations must be safe to call
/// concurrently across genomes — the evaluation pool hands out shared
/// references across worker threads.
pub trait Scape: Send + Sync {
    fn name(&self) -> &str;

    /// Sensor/actuator templates this scape can wire a genome to.
    /// Mutation operators that add a sensor or actuator draw from
    /// these; a scape with a single fixed interface can return empty
    /// vectors once the starting genome is already fully wired.
    fn sensor_templates(&self) -> Vec<IoUnit> {
        Vec::new()
    }

    fn actuator_templates(&self) -> Vec<IoUnit> {
        Vec::new()
    }

    /// Score one genome. `seed` is derived deterministically by the
    /// caller (run seed, generation, population index) so repeated
    /// evaluations of the same genome under the same seed must return
    /// the same fitness.
    fn evaluate(&self, genome: &Genome, seed: u64) -> ProtoResult<Fitness>;
}

pub use xor::XorScape;
