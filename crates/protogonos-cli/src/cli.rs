// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Argument parsing. One `Commands` variant per CLI subcommand; the
//! heavy lifting lives in [`crate::commands`].

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "protogonos", about = "Neuroevolution run controller", version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default `protogonos.toml` to the given path (or the
    /// current directory).
    Init {
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Load a `protogonos.toml`, run it to completion in the
    /// foreground, and persist every artifact incrementally. Reads
    /// control commands (`pause`, `continue`, `stop`, `goal-reached`,
    /// `print-trace`, `quit`) as lines from stdin while the run is in
    /// progress.
    Start {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        run_id: Option<String>,
        /// `section.field=value` overrides, may be repeated.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
        /// Resume from another run's saved population snapshot. The
        /// new run's generation numbering starts at that snapshot's
        /// recorded generation.
        #[arg(long = "continue-from")]
        continue_from: Option<String>,
    },

    /// Run against the built-in `xor` scape without a config file; a
    /// quick smoke-test / scripting path that never blocks on stdin.
    Run {
        #[arg(long, default_value = "xor")]
        scape: String,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long = "population-size", default_value_t = 8)]
        population_size: usize,
        #[arg(long = "worker-count", default_value_t = 2)]
        worker_count: usize,
        #[arg(long = "max-generations", default_value_t = 10)]
        max_generations: u64,
        #[arg(long = "run-root")]
        run_root: Option<PathBuf>,
        #[arg(long = "run-id")]
        run_id: Option<String>,
        #[arg(long = "continue-from")]
        continue_from: Option<String>,
    },

    /// List every run recorded in `benchmarks/run_index.json`, newest first.
    Runs {
        #[arg(long = "run-root")]
        run_root: Option<PathBuf>,
    },

    /// Bundle a run's config, diagnostics, lineage, fitness history,
    /// species history and top genomes into one JSON file.
    Export {
        #[arg(long = "run-id")]
        run_id: String,
        #[arg(long = "run-root")]
        run_root: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },

    /// Print a run's lineage records.
    Lineage {
        #[arg(long = "run-id")]
        run_id: String,
        #[arg(long = "run-root")]
        run_root: Option<PathBuf>,
    },

    /// Print a run's best-fitness-by-generation history.
    FitnessHistory {
        #[arg(long = "run-id")]
        run_id: String,
        #[arg(long = "run-root")]
        run_root: Option<PathBuf>,
    },

    /// Print a run's per-generation diagnostics.
    Diagnostics {
        #[arg(long = "run-id")]
        run_id: String,
        #[arg(long = "run-root")]
        run_root: Option<PathBuf>,
    },

    /// Print a run's species history.
    SpeciesHistory {
        #[arg(long = "run-id")]
        run_id: String,
        #[arg(long = "run-root")]
        run_root: Option<PathBuf>,
    },

    /// Diff the species present at two recorded generations.
    SpeciesDiff {
        #[arg(long = "run-id")]
        run_id: String,
        #[arg(long = "run-root")]
        run_root: Option<PathBuf>,
        #[arg(long)]
        from: u64,
        #[arg(long)]
        to: u64,
    },

    /// Print a run's top genomes by fitness.
    TopGenomes {
        #[arg(long = "run-id")]
        run_id: String,
        #[arg(long = "run-root")]
        run_root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print a run's scape summary.
    ScapeSummary {
        #[arg(long = "run-id")]
        run_id: String,
        #[arg(long = "run-root")]
        run_root: Option<PathBuf>,
    },

    /// Pause a run in progress.
    Pause {
        #[arg(long = "run-id")]
        run_id: String,
    },

    /// Resume a paused run.
    Continue {
        #[arg(long = "run-id")]
        run_id: String,
    },

    /// Request a run stop after its current generation finishes.
    Stop {
        #[arg(long = "run-id")]
        run_id: String,
    },

    /// Signal that the fitness goal has been reached externally.
    GoalReached {
        #[arg(long = "run-id")]
        run_id: String,
    },

    /// Request a trace snapshot from a run in progress.
    PrintTrace {
        #[arg(long = "run-id")]
        run_id: String,
    },

    /// Delete a run's population snapshot and genomes, keeping its
    /// diagnostics/lineage/fitness history intact.
    DeletePopulation {
        #[arg(long = "run-id")]
        run_id: String,
        #[arg(long = "run-root")]
        run_root: Option<PathBuf>,
    },
}
