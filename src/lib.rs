// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! # protogonos
//!
//! Umbrella crate for the protogonos neuroevolution workspace: a
//! typed genome model, a weighted mutation catalog, a stochastic
//! hill-climbing tuner ("exoself"), a parallel evaluation pool, a
//! speciation/selection population loop, and a run controller with
//! pause/continue/stop/goal-reached lifecycle commands.
//!
//! This crate re-exports the public surface of each workspace member
//! so a consumer can depend on `protogonos` alone instead of naming
//! every crate. The `protogonos-cli` binary and each member crate's
//! own tests exercise the pieces individually; this crate's
//! `tests/` directory covers the end-to-end scenarios that span all
//! of them in one run.
//!
//! ```no_run
//! use protogonos::genome::Genome;
//! use protogonos::population::PopulationLoop;
//! use protogonos::scape::XorScape;
//! use std::sync::Arc;
//!
//! let config = protogonos::population::PopulationConfig::default();
//! let population_loop = PopulationLoop::new(config, Arc::new(XorScape))?;
//! let _seed_population = population_loop.seed_population(42);
//! # Ok::<(), protogonos::genome::ProtoError>(())
//! ```

pub use protogonos_genome as genome;
pub use protogonos_mutation as mutation;
pub use protogonos_tuner as tuner;
pub use protogonos_eval as eval;
pub use protogonos_population as population;
pub use protogonos_control as control;
pub use protogonos_store as store;
pub use protogonos_scape as scape;

/// Crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
