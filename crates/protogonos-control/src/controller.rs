// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! The run-level lifecycle on top of one `PopulationLoop`: drains the
//! control channel at the suspension point between generations, tracks
//! goal/evaluation-limit bookkeeping across the whole run, and
//! propagates cancellation. Everything inside one generation (evaluate,
//! speciate, select, tune, reproduce) stays `protogonos-population`'s
//! job; this type calls it exactly once per generation.

use crate::command::ControlCommand;
use protogonos_genome::{GenerationDiagnostics, Genome, LineageRecord, ProtoError, ProtoResult, SpeciesGeneration};
use protogonos_population::{GenerationOutcome, PopulationLoop};
use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxGenerationsReached,
    EvaluationsLimitReached,
    GoalReached,
    StoppedByCommand,
    Cancelled,
}

/// One `PrintTrace` command's side effect: a point-in-time summary,
/// independent of the per-generation diagnostics history. Accumulates
/// into the run's `trace_acc` artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSnapshot {
    pub generation: u64,
    pub best_fitness_so_far: f64,
}

/// Everything a completed (or gracefully stopped) run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: String,
    pub final_generation: u64,
    pub best_fitness: f64,
    pub diagnostics: Vec<GenerationDiagnostics>,
    pub species_history: Vec<SpeciesGeneration>,
    pub lineage: Vec<LineageRecord>,
    pub trace_snapshots: Vec<TraceSnapshot>,
    pub final_population: Vec<Genome>,
    pub stop_reason: StopReason,
}

pub struct RunController {
    run_id: String,
    population_loop: PopulationLoop,
    run_seed: u64,
    max_generations: Option<u64>,
    evaluations_limit: Option<u64>,
    control: Receiver<ControlCommand>,
    cancel: Arc<AtomicBool>,
}

impl RunController {
    pub fn new(
        run_id: impl Into<String>,
        population_loop: PopulationLoop,
        run_seed: u64,
        max_generations: Option<u64>,
        evaluations_limit: Option<u64>,
        control: Receiver<ControlCommand>,
    ) -> Self {
        RunController {
            run_id: run_id.into(),
            population_loop,
            run_seed,
            max_generations,
            evaluations_limit,
            control,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle external code (a signal handler, a `stop` CLI command
    /// routed to this process) can use to abort the in-flight
    /// generation immediately. Distinct from the `Stop` control
    /// command, which lets the current generation finish first.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn record_trace(trace_snapshots: &mut Vec<TraceSnapshot>, generation: u64, best_fitness: f64) {
        let best_fitness_so_far = if best_fitness.is_finite() { best_fitness } else { 0.0 };
        trace_snapshots.push(TraceSnapshot { generation, best_fitness_so_far });
    }

    /// Block until a `Continue`, `Stop`, or `GoalReached` arrives.
    /// A `Pause` received while already paused is a no-op; `PrintTrace`
    /// while paused records a snapshot but does not unblock.
    fn block_until_resumed(&self, trace_snapshots: &mut Vec<TraceSnapshot>, generation: u64, best_fitness: f64) -> ControlCommand {
        loop {
            match self.control.recv() {
                Ok(ControlCommand::Pause) => continue,
                Ok(ControlCommand::PrintTrace) => {
                    Self::record_trace(trace_snapshots, generation, best_fitness);
                    continue;
                }
                Ok(other) => return other,
                Err(_) => return ControlCommand::Stop,
            }
        }
    }

    /// Drain every command queued since the last suspension point.
    /// Returns `Some(reason)` if the run should stop before starting
    /// the next generation.
    fn drain_suspension_point(&self, trace_snapshots: &mut Vec<TraceSnapshot>, generation: u64, best_fitness: f64) -> Option<StopReason> {
        loop {
            match self.control.try_recv() {
                Ok(ControlCommand::Pause) => match self.block_until_resumed(trace_snapshots, generation, best_fitness) {
                    ControlCommand::Stop => return Some(StopReason::StoppedByCommand),
                    ControlCommand::GoalReached => return Some(StopReason::GoalReached),
                    _ => continue,
                },
                Ok(ControlCommand::Stop) => return Some(StopReason::StoppedByCommand),
                Ok(ControlCommand::GoalReached) => return Some(StopReason::GoalReached),
                Ok(ControlCommand::PrintTrace) => {
                    Self::record_trace(trace_snapshots, generation, best_fitness);
                    continue;
                }
                Ok(ControlCommand::Continue) => continue,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Run generations starting at `initial_generation` against
    /// `initial_population` (freshly seeded from the configured scape
    /// if `None`), until a stop condition is reached.
    ///
    /// `initial_generation` is the index of the next generation to
    /// run, 0-indexed. A population snapshot's recorded `generation`
    /// is exactly this value for a run continuing from it: a run that
    /// completed generations `0..N` leaves a snapshot at generation
    /// `N`, and continuing from it resumes at generation `N`.
    ///
    /// `on_generation` is called immediately after each completed
    /// generation, before the next suspension point, so a caller can
    /// persist diagnostics incrementally: if the run is later
    /// cancelled, everything already handed to this callback remains a
    /// valid partial artifact.
    pub fn run<F: FnMut(&GenerationOutcome)>(
        &mut self,
        initial_population: Option<Vec<Genome>>,
        initial_generation: u64,
        mut on_generation: F,
    ) -> ProtoResult<RunOutcome> {
        let mut population = initial_population.unwrap_or_else(|| self.population_loop.seed_population(self.run_seed));
        let mut previous_species_keys: BTreeSet<String> = BTreeSet::new();
        let mut generation = initial_generation;
        let mut best_fitness = f64::NEG_INFINITY;
        let mut evaluations_total = 0u64;
        let mut diagnostics = Vec::new();
        let mut species_history = Vec::new();
        let mut lineage = Vec::new();
        let mut trace_snapshots = Vec::new();

        let stop_reason = loop {
            if let Some(reason) = self.drain_suspension_point(&mut trace_snapshots, generation, best_fitness) {
                break reason;
            }
            if let Some(limit) = self.max_generations {
                if generation.saturating_sub(initial_generation) >= limit {
                    break StopReason::MaxGenerationsReached;
                }
            }
            if let Some(limit) = self.evaluations_limit {
                if evaluations_total >= limit {
                    break StopReason::EvaluationsLimitReached;
                }
            }

            let outcome = match self.population_loop.run_generation(
                &mut population,
                &previous_species_keys,
                self.run_seed,
                generation,
                &self.cancel,
            ) {
                Ok(outcome) => outcome,
                Err(ProtoError::Cancelled) => break StopReason::Cancelled,
                Err(err) => return Err(err),
            };

            evaluations_total += outcome.evaluations_this_generation;
            previous_species_keys = outcome.species_keys.clone();
            best_fitness = best_fitness.max(outcome.diagnostics.best_fitness);
            let goal_reached = outcome.goal_reached;

            on_generation(&outcome);
            diagnostics.push(outcome.diagnostics.clone());
            species_history.push(outcome.species_generation.clone());
            lineage.extend(outcome.lineage.clone());
            generation += 1;

            if goal_reached {
                tracing::info!(run_id = %self.run_id, generation, best_fitness, "fitness goal reached");
                break StopReason::GoalReached;
            }
        };

        Ok(RunOutcome {
            run_id: self.run_id.clone(),
            final_generation: generation,
            best_fitness: if best_fitness.is_finite() { best_fitness } else { 0.0 },
            diagnostics,
            species_history,
            lineage,
            trace_snapshots,
            final_population: population,
            stop_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::control_channel;
    use protogonos_genome::{FitnessPostprocessing, SelectionStrategy, SpeciationMode};
    use protogonos_population::PopulationConfig;
    use protogonos_scape::XorScape;
    use std::sync::Arc as StdArc;
    use std::time::Duration;

    fn population_config() -> PopulationConfig {
        PopulationConfig {
            population_size: 8,
            worker_count: 2,
            elite_count: 2,
            survival_percentage: 0.0,
            speciation_mode: SpeciationMode::Topology,
            fitness_postprocessing: FitnessPostprocessing::None,
            selection_strategy: SelectionStrategy::Elite,
            ..PopulationConfig::default()
        }
    }

    #[test]
    fn runs_configured_generation_count_and_reports_monotonic_best() {
        let population_loop = PopulationLoop::new(population_config(), StdArc::new(XorScape)).unwrap();
        let (_handle, receiver) = control_channel();
        let mut controller = RunController::new("run-xor", population_loop, 42, Some(2), None, receiver);

        let mut seen = Vec::new();
        let outcome = controller.run(None, 0, |g| seen.push(g.diagnostics.best_fitness)).unwrap();

        assert_eq!(outcome.diagnostics.len(), 2);
        assert_eq!(outcome.stop_reason, StopReason::MaxGenerationsReached);
        assert!(seen.windows(2).all(|w| w[1] >= w[0] - 1e-9));
    }

    #[test]
    fn goal_reached_stops_after_the_generation_that_hit_it() {
        let mut config = population_config();
        config.fitness_goal = Some(0.0);
        let population_loop = PopulationLoop::new(config, StdArc::new(XorScape)).unwrap();
        let (_handle, receiver) = control_channel();
        let mut controller = RunController::new("run-goal", population_loop, 1, Some(50), None, receiver);

        let outcome = controller.run(None, 0, |_| {}).unwrap();
        assert_eq!(outcome.stop_reason, StopReason::GoalReached);
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn stop_command_halts_before_the_next_generation() {
        let population_loop = PopulationLoop::new(population_config(), StdArc::new(XorScape)).unwrap();
        let (handle, receiver) = control_channel();
        handle.stop().unwrap();
        let mut controller = RunController::new("run-stop", population_loop, 42, Some(10), None, receiver);

        let outcome = controller.run(None, 0, |_| {}).unwrap();
        assert_eq!(outcome.stop_reason, StopReason::StoppedByCommand);
        assert_eq!(outcome.final_generation, 0);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn start_paused_blocks_until_continue() {
        let population_loop = PopulationLoop::new(population_config(), StdArc::new(XorScape)).unwrap();
        let (handle, receiver) = control_channel();
        handle.pause().unwrap();
        handle.schedule_continue_after(Duration::from_millis(20));
        let mut controller = RunController::new("run-paused", population_loop, 42, Some(1), None, receiver);

        let outcome = controller.run(None, 0, |_| {}).unwrap();
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.stop_reason, StopReason::MaxGenerationsReached);
    }

    #[test]
    fn cancellation_stops_with_no_partial_generation() {
        let population_loop = PopulationLoop::new(population_config(), StdArc::new(XorScape)).unwrap();
        let (_handle, receiver) = control_channel();
        let mut controller = RunController::new("run-cancel", population_loop, 42, Some(10), None, receiver);
        controller.cancel_handle().store(true, std::sync::atomic::Ordering::Relaxed);

        let outcome = controller.run(None, 0, |_| {}).unwrap();
        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert_eq!(outcome.final_generation, 0);
    }

    #[test]
    fn print_trace_accumulates_without_stopping() {
        let population_loop = PopulationLoop::new(population_config(), StdArc::new(XorScape)).unwrap();
        let (handle, receiver) = control_channel();
        handle.print_trace().unwrap();
        let mut controller = RunController::new("run-trace", population_loop, 42, Some(1), None, receiver);

        let outcome = controller.run(None, 0, |_| {}).unwrap();
        assert_eq!(outcome.trace_snapshots.len(), 1);
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn continuation_resumes_at_the_snapshot_generation() {
        let population_loop_a = PopulationLoop::new(population_config(), StdArc::new(XorScape)).unwrap();
        let (_handle_a, receiver_a) = control_channel();
        let mut controller_a = RunController::new("run-a", population_loop_a, 1, Some(2), None, receiver_a);
        let outcome_a = controller_a.run(None, 0, |_| {}).unwrap();
        assert_eq!(outcome_a.final_generation, 2);

        let population_loop_b = PopulationLoop::new(population_config(), StdArc::new(XorScape)).unwrap();
        let (_handle_b, receiver_b) = control_channel();
        let mut controller_b = RunController::new("run-b", population_loop_b, 1, Some(2), None, receiver_b);
        let outcome_b = controller_b.run(Some(outcome_a.final_population), outcome_a.final_generation, |_| {}).unwrap();

        assert_eq!(outcome_b.diagnostics[0].generation, 2);
        assert_eq!(outcome_b.final_generation, 4);
    }
}
