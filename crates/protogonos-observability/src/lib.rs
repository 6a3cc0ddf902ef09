// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! # protogonos-observability
//!
//! Shared logging initialization and per-crate debug flags for the
//! protogonos workspace. Every binary and long-running evaluation
//! calls [`init_logging_default`] (or [`init_logging`] for a custom
//! log file) once at startup, then relies on `tracing` macros
//! everywhere else.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known protogonos crate names for debug flags.
pub const KNOWN_CRATES: &[&str] = &[
    "protogonos-genome",
    "protogonos-mutation",
    "protogonos-tuner",
    "protogonos-eval",
    "protogonos-population",
    "protogonos-control",
    "protogonos-store",
];
