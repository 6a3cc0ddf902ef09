// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! `protogonos` — the run-lifecycle CLI: start/run an evolution loop,
//! inspect a run's artifacts, and manage run-level state.

mod cli;
mod commands;
mod scape_registry;

use clap::Parser;
use cli::Cli;
use protogonos_observability::CrateDebugFlags;

fn main() {
    let debug_flags = CrateDebugFlags::from_args(std::env::args());
    let _logging_guard = protogonos_observability::init_logging_default(&debug_flags);
    let cli = Cli::parse();
    if let Err(err) = commands::dispatch(cli) {
        eprintln!("error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
        std::process::exit(1);
    }
}
