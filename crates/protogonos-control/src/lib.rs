// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! # protogonos-control
//!
//! Run-level lifecycle on top of `protogonos-population`'s
//! single-generation pipeline: a control channel carrying
//! Pause/Continue/Stop/GoalReached/PrintTrace, a registry so commands
//! against an unknown run id fail instead of vanishing, and the
//! `RunController` orchestrator that drains that channel between
//! generations, tracks goal and evaluation-limit bookkeeping across
//! the whole run, and propagates cancellation.
//!
//! Persistence (writing diagnostics/lineage/snapshots to disk) and
//! resolving a continuation id to a population are `protogonos-store`'s
//! job; this crate only exposes the hooks (`on_generation`, explicit
//! `initial_population`/`initial_generation`) a caller needs to wire
//! those in.

pub mod command;
pub mod controller;
pub mod registry;

pub use command::{control_channel, ControlCommand, ControlHandle, ControlSendError};
pub use controller::{RunController, RunOutcome, StopReason, TraceSnapshot};
pub use registry::ControlRegistry;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
