// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! # protogonos-tuner
//!
//! The exoself: a stochastic hill-climbing local search over a single
//! genome's numeric parameters (biases and synapse weights only, no
//! topology change). `tune()` is the sole entry point — pure with
//! respect to its input genome, so population-level code can run many
//! tuning sessions concurrently with no shared state.

pub mod candidates;
pub mod engine;
pub mod report;

pub use candidates::CandidateBasesProvider;
pub use engine::{scape_failure, tune};
pub use report::TuneReport;
