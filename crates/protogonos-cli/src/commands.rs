// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Subcommand implementations. Each function owns one `Commands`
//! variant's behavior; `dispatch` only routes.

use crate::cli::{Cli, Commands};
use crate::scape_registry::resolve_scape;
use anyhow::{anyhow, bail, Context, Result};
use protogonos_config::{validate_config, RunConfig};
use protogonos_control::{control_channel, RunController, StopReason};
use protogonos_genome::GenerationDiagnostics;
use protogonos_population::PopulationLoop;
use protogonos_store::{now_utc_rfc3339, FileStore, RunIndexEntry, ScapeSummaryRecord};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_RUN_ROOT: &str = "./runs";
const TOP_GENOMES_LIMIT: usize = 10;

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path } => init(path),
        Commands::Start { config, run_id, overrides, continue_from } => start(config, run_id, overrides, continue_from, true),
        Commands::Run { scape, seed, population_size, worker_count, max_generations, run_root, run_id, continue_from } => {
            run_ad_hoc(scape, seed, population_size, worker_count, max_generations, run_root, run_id, continue_from)
        }
        Commands::Runs { run_root } => runs(run_root),
        Commands::Export { run_id, run_root, out } => export(run_id, run_root, out),
        Commands::Lineage { run_id, run_root } => print_json(store_for(run_root).read_lineage(&run_id)?),
        Commands::FitnessHistory { run_id, run_root } => print_json(store_for(run_root).read_fitness_history(&run_id)?),
        Commands::Diagnostics { run_id, run_root } => print_json(store_for(run_root).read_generation_diagnostics(&run_id)?),
        Commands::SpeciesHistory { run_id, run_root } => print_json(store_for(run_root).read_species_history(&run_id)?),
        Commands::SpeciesDiff { run_id, run_root, from, to } => species_diff(run_id, run_root, from, to),
        Commands::TopGenomes { run_id, run_root, limit } => top_genomes(run_id, run_root, limit),
        Commands::ScapeSummary { run_id, run_root } => print_json(store_for(run_root).read_scape_summary(&run_id)?),
        Commands::Pause { run_id } => contract_only("pause", &run_id),
        Commands::Continue { run_id } => contract_only("continue", &run_id),
        Commands::Stop { run_id } => contract_only("stop", &run_id),
        Commands::GoalReached { run_id } => contract_only("goal-reached", &run_id),
        Commands::PrintTrace { run_id } => contract_only("print-trace", &run_id),
        Commands::DeletePopulation { run_id, run_root } => store_for(run_root).delete_population(&run_id).map_err(Into::into),
    }
}

fn store_for(run_root: Option<PathBuf>) -> FileStore {
    FileStore::new(run_root.unwrap_or_else(|| PathBuf::from(DEFAULT_RUN_ROOT)))
}

fn print_json<T: serde::Serialize>(value: T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// `pause`/`continue`/`stop`/`goal-reached`/`print-trace` address a
/// control channel that only exists inside the process running
/// `start`. This workspace ships no daemon or socket to reach that
/// channel from a second process, so these subcommands honor the
/// contract (they parse and validate their arguments) without
/// pretending to reach a process that isn't there; use `start`'s
/// stdin commands on the same run instead.
fn contract_only(command: &str, run_id: &str) -> Result<()> {
    bail!("'{command}' targets run '{run_id}', but no out-of-process control channel is available; send '{command}' on the stdin of the 'start' invocation running that run instead")
}

fn init(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from("protogonos.toml"));
    if path.exists() {
        bail!("refusing to overwrite existing file at {}", path.display());
    }
    let config = RunConfig::default();
    let rendered = toml::to_string_pretty(&config).context("serializing default config")?;
    std::fs::write(&path, rendered).with_context(|| format!("writing {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn start(config_path: Option<PathBuf>, run_id: Option<String>, overrides: Vec<String>, continue_from: Option<String>, interactive: bool) -> Result<()> {
    let override_map = parse_overrides(&overrides)?;
    let config = protogonos_config::load_config(config_path.as_deref(), Some(&override_map)).context("loading config")?;

    let run_id = run_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let store = FileStore::new(config.store.run_root.clone());
    execute(run_id, config, store, continue_from, interactive)
}

#[allow(clippy::too_many_arguments)]
fn run_ad_hoc(
    scape: String,
    seed: u64,
    population_size: usize,
    worker_count: usize,
    max_generations: u64,
    run_root: Option<PathBuf>,
    run_id: Option<String>,
    continue_from: Option<String>,
) -> Result<()> {
    let mut config = RunConfig::default();
    config.run.scape = scape;
    config.run.seed = seed;
    config.run.max_generations = Some(max_generations);
    config.population.population_size = population_size;
    config.population.worker_count = worker_count;
    if let Some(root) = &run_root {
        config.store.run_root = root.clone();
    }

    let run_id = run_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let store = FileStore::new(config.store.run_root.clone());
    execute(run_id, config, store, continue_from, false)
}

fn parse_overrides(raw: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for entry in raw {
        let (key, value) = entry.split_once('=').ok_or_else(|| anyhow!("--set expects KEY=VALUE, got '{entry}'"))?;
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}

fn execute(run_id: String, config: RunConfig, store: FileStore, continue_from: Option<String>, interactive: bool) -> Result<()> {
    let population_config = validate_config(&config).map_err(|e| anyhow!(e.to_string()))?;
    let scape = resolve_scape(&config.run.scape)?;
    let population_loop = PopulationLoop::new(population_config, scape).map_err(|e| anyhow!(e.to_string()))?;

    let (initial_population, initial_generation) = match &continue_from {
        Some(source_run_id) => {
            let (snapshot, genomes) = store.load_population_snapshot(source_run_id).map_err(|e| anyhow!(e.to_string()))?;
            (Some(genomes), snapshot.generation)
        }
        None => (None, 0),
    };

    let (handle, receiver) = control_channel();
    if config.run.start_paused {
        handle.pause().ok();
    }
    if let Some(seconds) = config.run.auto_continue_after {
        handle.schedule_continue_after(Duration::from_secs(seconds));
    }

    let mut controller = RunController::new(run_id.clone(), population_loop, config.run.seed, config.run.max_generations, config.run.evaluations_limit, receiver);

    let stdin_handle = handle.clone();
    let stdin_thread = if interactive {
        Some(std::thread::spawn(move || read_stdin_commands(&stdin_handle)))
    } else {
        None
    };

    let run_store = store.clone();
    let run_id_for_callback = run_id.clone();
    let outcome = controller.run(initial_population, initial_generation, move |generation_outcome| {
        if let Err(err) = persist_generation(&run_store, &run_id_for_callback, generation_outcome) {
            tracing::error!(run_id = %run_id_for_callback, error = %err, "failed to persist generation artifacts");
        }
    });

    drop(handle);
    if let Some(thread) = stdin_thread {
        let _ = thread.join();
    }

    let outcome = outcome.map_err(|e| anyhow!(e.to_string()))?;

    store.save_population_snapshot(
        &run_id,
        &protogonos_genome::PopulationSnapshot::new(run_id.clone(), outcome.final_generation, outcome.final_population.iter().map(|g| g.id.clone()).collect())
            .map_err(|e| anyhow!(e.to_string()))?,
        &outcome.final_population,
    )
    .context("saving final population snapshot")?;
    store.write_top_genomes(&run_id, &outcome.final_population, TOP_GENOMES_LIMIT).context("writing top genomes")?;
    store
        .write_scape_summary(
            &run_id,
            &ScapeSummaryRecord {
                name: config.run.scape.clone(),
                sensor_template_count: 0,
                actuator_template_count: 0,
            },
        )
        .context("writing scape summary")?;
    let fitness_history = store.read_fitness_history(&run_id).unwrap_or_default();
    store.write_benchmark_series(&run_id, &fitness_history).context("writing benchmark series")?;
    store
        .write_benchmark_summary(
            &run_id,
            &serde_json::json!({
                "run_id": run_id,
                "final_generation": outcome.final_generation,
                "best_fitness": outcome.best_fitness,
                "stop_reason": format!("{:?}", outcome.stop_reason),
            }),
        )
        .context("writing benchmark summary")?;
    store.write_config(&run_id, &config).context("writing config.json")?;
    store
        .upsert_run_index(RunIndexEntry {
            run_id: run_id.clone(),
            created_at_utc: now_utc_rfc3339(),
            scape: config.run.scape.clone(),
            final_generation: outcome.final_generation,
            best_fitness: outcome.best_fitness,
        })
        .context("updating run index")?;

    println!(
        "run '{run_id}' stopped: {:?} (generation {}, best fitness {})",
        outcome.stop_reason, outcome.final_generation, outcome.best_fitness
    );
    if outcome.stop_reason == StopReason::Cancelled {
        std::process::exit(1);
    }
    Ok(())
}

fn persist_generation(store: &FileStore, run_id: &str, outcome: &protogonos_population::GenerationOutcome) -> protogonos_genome::ProtoResult<()> {
    store.append_generation_diagnostics(run_id, &outcome.diagnostics)?;
    store.append_species_generation(run_id, &outcome.species_generation)?;
    store.append_lineage(run_id, &outcome.lineage)?;
    store.append_fitness_point(run_id, diagnostics_best_fitness(&outcome.diagnostics))
}

fn diagnostics_best_fitness(diagnostics: &GenerationDiagnostics) -> f64 {
    diagnostics.best_fitness
}

fn read_stdin_commands(handle: &protogonos_control::ControlHandle) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match line.trim() {
            "pause" => {
                let _ = handle.pause();
            }
            "continue" => {
                let _ = handle.continue_run();
            }
            "stop" => {
                let _ = handle.stop();
                break;
            }
            "goal-reached" => {
                let _ = handle.goal_reached();
                break;
            }
            "print-trace" => {
                let _ = handle.print_trace();
            }
            "quit" => break,
            "" => continue,
            other => eprintln!("unrecognized control command '{other}'"),
        }
    }
}

fn runs(run_root: Option<PathBuf>) -> Result<()> {
    let entries = store_for(run_root).read_run_index()?;
    print_json(entries)
}

fn export(run_id: String, run_root: Option<PathBuf>, out: PathBuf) -> Result<()> {
    let store = store_for(run_root);
    let bundle = serde_json::json!({
        "config": store.read_config::<RunConfig>(&run_id).ok(),
        "diagnostics": store.read_generation_diagnostics(&run_id)?,
        "lineage": store.read_lineage(&run_id)?,
        "fitness_history": store.read_fitness_history(&run_id)?,
        "species_history": store.read_species_history(&run_id)?,
        "top_genomes": store.read_top_genomes(&run_id)?,
    });
    std::fs::write(&out, serde_json::to_string_pretty(&bundle)?).with_context(|| format!("writing {}", out.display()))?;
    println!("exported run '{run_id}' to {}", out.display());
    Ok(())
}

fn species_diff(run_id: String, run_root: Option<PathBuf>, from: u64, to: u64) -> Result<()> {
    let history = store_for(run_root).read_species_history(&run_id)?;
    let at = |generation: u64| history.iter().find(|g| g.generation == generation).ok_or_else(|| anyhow!("no species history recorded for generation {generation}"));
    let from_gen = at(from)?;
    let to_gen = at(to)?;
    let from_keys: std::collections::BTreeSet<_> = from_gen.species.iter().map(|s| s.species_key.clone()).collect();
    let to_keys: std::collections::BTreeSet<_> = to_gen.species.iter().map(|s| s.species_key.clone()).collect();
    let added: Vec<_> = to_keys.difference(&from_keys).cloned().collect();
    let removed: Vec<_> = from_keys.difference(&to_keys).cloned().collect();
    print_json(serde_json::json!({ "from": from, "to": to, "added": added, "removed": removed }))
}

fn top_genomes(run_id: String, run_root: Option<PathBuf>, limit: Option<usize>) -> Result<()> {
    let mut entries = store_for(run_root).read_top_genomes(&run_id)?;
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    print_json(entries)
}
