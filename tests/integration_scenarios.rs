// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end scenarios spanning genome, population, control and
//! store together, the way a real run exercises them.

use protogonos_control::{control_channel, RunController};
use protogonos_genome::{PopulationSnapshot, SelectionStrategy};
use protogonos_population::{PopulationConfig, PopulationLoop};
use protogonos_scape::XorScape;
use protogonos_store::FileStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn xor_config(population_size: usize, worker_count: usize) -> PopulationConfig {
    PopulationConfig {
        population_size,
        worker_count,
        selection_strategy: SelectionStrategy::Elite,
        ..PopulationConfig::default()
    }
}

#[test]
fn xor_generational_elite_run_improves_monotonically() {
    let population_loop = PopulationLoop::new(xor_config(8, 2), Arc::new(XorScape)).unwrap();
    let (_handle, receiver) = control_channel();
    let mut controller = RunController::new("scenario-xor", population_loop, 42, Some(2), None, receiver);

    let mut best_by_generation = Vec::new();
    let outcome = controller.run(None, 0, |g| best_by_generation.push(g.diagnostics.best_fitness)).unwrap();

    assert_eq!(best_by_generation.len(), 2);
    assert!(best_by_generation.windows(2).all(|w| w[1] >= w[0] - 1e-9));
    assert!(outcome.best_fitness > 0.5, "expected best fitness above 0.5, got {}", outcome.best_fitness);
}

#[test]
fn a_completed_run_can_seed_a_continuation_run() {
    let dir = tempdir().unwrap();
    let store = FileStore::new(dir.path());

    let loop_a = PopulationLoop::new(xor_config(8, 2), Arc::new(XorScape)).unwrap();
    let (_handle_a, receiver_a) = control_channel();
    let mut controller_a = RunController::new("run-a", loop_a, 1, Some(2), None, receiver_a);
    let outcome_a = controller_a.run(None, 0, |_| {}).unwrap();

    let snapshot = PopulationSnapshot::new(
        "run-a",
        outcome_a.final_generation,
        outcome_a.final_population.iter().map(|g| g.id.clone()).collect(),
    )
    .unwrap();
    store.save_population_snapshot("run-a", &snapshot, &outcome_a.final_population).unwrap();

    let (loaded_snapshot, loaded_population) = store.load_population_snapshot("run-a").unwrap();
    assert_eq!(loaded_snapshot.generation, outcome_a.final_generation);

    let loop_b = PopulationLoop::new(xor_config(8, 2), Arc::new(XorScape)).unwrap();
    let (_handle_b, receiver_b) = control_channel();
    let mut controller_b = RunController::new("run-b", loop_b, 1, Some(2), None, receiver_b);
    let outcome_b = controller_b.run(Some(loaded_population), loaded_snapshot.generation, |_| {}).unwrap();

    assert_eq!(outcome_b.diagnostics[0].generation, loaded_snapshot.generation);
    assert_eq!(outcome_b.final_generation, loaded_snapshot.generation + 2);
}

#[test]
fn a_run_started_paused_blocks_until_a_continue_command_arrives() {
    let population_loop = PopulationLoop::new(xor_config(8, 2), Arc::new(XorScape)).unwrap();
    let (handle, receiver) = control_channel();
    handle.pause().unwrap();

    let mut controller = RunController::new("scenario-pause", population_loop, 7, Some(2), None, receiver);
    let run_thread = std::thread::spawn(move || controller.run(None, 0, |_| {}));

    std::thread::sleep(Duration::from_millis(20));
    handle.continue_run().unwrap();

    let outcome = run_thread.join().unwrap().unwrap();
    assert_eq!(outcome.diagnostics.len(), 2);
}
