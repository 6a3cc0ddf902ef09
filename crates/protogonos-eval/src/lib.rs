// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! # protogonos-eval
//!
//! A bounded, deterministic parallel evaluation pool. A population
//! generation's genomes are scored against a shared `Scape` across a
//! fixed-size worker pool; the derived per-genome seed (and therefore
//! the resulting fitness) never depends on how many workers ran it or
//! in what order they finished.

pub mod pool;

pub use pool::{apply_outcomes, EvalOutcome, EvalPool};
