// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! The exoself attempt loop: repeatedly pick a base candidate, nudge
//! one numeric parameter, evaluate, and keep the result only if it
//! dominates the incumbent fitness.

use crate::candidates::CandidateBasesProvider;
use crate::report::TuneReport;
use protogonos_genome::{CandidateSelection, Fitness, Genome, ProtoError, ProtoResult, TuningCounters};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `active` modes only target elements this young or younger.
const ACTIVE_AGE_LIMIT: u64 = 3;

/// One perturbable element: a neuron's bias, a synapse weight (carried
/// under its destination neuron's age, since `Synapse` itself has no
/// generation field), or one actuator's local tunable. `age` is the
/// element's distance in generations from the genome's own generation,
/// used to anneal the perturbation spread (age 0 always yields the
/// widest spread).
#[derive(Clone)]
enum TunableTarget {
    Bias { neuron_id: String, age: u64 },
    Weight { synapse_id: String, age: u64 },
    Actuator { actuator_id: String, age: u64 },
}

impl TunableTarget {
    fn age(&self) -> u64 {
        match self {
            TunableTarget::Bias { age, .. } | TunableTarget::Weight { age, .. } | TunableTarget::Actuator { age, .. } => *age,
        }
    }
}

/// Does an element of the given `age` belong to the pool `selection`
/// draws perturbation targets from? `active` modes admit only young
/// elements (`age <= 3`); `current` modes admit only the current
/// generation's own elements (`age == 0`); every other mode, including
/// `all*`, admits everything.
fn admits_age(selection: CandidateSelection, age: u64) -> bool {
    match selection {
        CandidateSelection::Active | CandidateSelection::ActiveRandom => age <= ACTIVE_AGE_LIMIT,
        CandidateSelection::Current | CandidateSelection::CurrentRandom => age == 0,
        _ => true,
    }
}

fn tunable_targets(genome: &Genome, selection: CandidateSelection) -> Vec<TunableTarget> {
    let mut targets: Vec<TunableTarget> = genome
        .neurons
        .iter()
        .filter(|n| n.bias.is_some())
        .map(|n| TunableTarget::Bias {
            neuron_id: n.id.clone(),
            age: genome.generation.saturating_sub(n.generation),
        })
        .collect();
    targets.extend(genome.synapses.iter().filter_map(|s| {
        genome.neuron(&s.to_neuron_id).map(|to_neuron| TunableTarget::Weight {
            synapse_id: s.id.clone(),
            age: genome.generation.saturating_sub(to_neuron.generation),
        })
    }));
    targets.extend(genome.actuators.values().map(|a| TunableTarget::Actuator {
        actuator_id: a.id.clone(),
        age: genome.generation.saturating_sub(a.generation),
    }));
    targets.retain(|t| admits_age(selection, t.age()));
    targets
}

fn gaussian_sample(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// `spread = pi * annealing_factor^age`; age 0 always yields `pi`,
/// regardless of `annealing_factor` (`x^0 == 1` for every `x`).
fn spread_for_age(annealing_factor: f64, age: u64) -> f64 {
    std::f64::consts::PI * annealing_factor.powi(age as i32)
}

/// Pick one tunable element of `base` from the pool `selection` admits
/// and apply exactly one numeric perturbation to a clone, scaled by
/// that element's own age-annealed spread.
///
/// Returns `None` only when `base` has no tunable element at all.
/// When `selection`'s age filter empties the pool, `_random` variants
/// fall back to a uniform draw over the unfiltered pool; deterministic
/// variants return `base` unchanged, a hard no-op for this attempt.
fn perturb_one(
    base: &Genome,
    selection: CandidateSelection,
    rng: &mut StdRng,
    annealing_factor: f64,
    step_size: f64,
    perturbation_range: f64,
) -> Option<Genome> {
    let all_targets = tunable_targets(base, CandidateSelection::All);
    if all_targets.is_empty() {
        return None;
    }
    let filtered = tunable_targets(base, selection);
    let target = if !filtered.is_empty() {
        &filtered[rng.gen_range(0..filtered.len())]
    } else if matches!(
        selection,
        CandidateSelection::ActiveRandom | CandidateSelection::CurrentRandom | CandidateSelection::AllRandom | CandidateSelection::RecentRandom | CandidateSelection::LastgenRandom
    ) {
        &all_targets[rng.gen_range(0..all_targets.len())]
    } else {
        return Some(base.clone());
    };
    let spread = spread_for_age(annealing_factor, target.age());
    let magnitude = spread * perturbation_range * step_size;
    let mut candidate = base.clone();
    let delta = magnitude * gaussian_sample(rng);
    match target {
        TunableTarget::Bias { neuron_id, .. } => {
            if let Some(n) = candidate.neuron_mut(neuron_id) {
                if let Some(b) = n.bias.as_mut() {
                    *b += delta;
                }
            }
        }
        TunableTarget::Weight { synapse_id, .. } => {
            if let Some(s) = candidate.synapses.iter_mut().find(|s| &s.id == synapse_id) {
                s.weight += delta;
            }
        }
        TunableTarget::Actuator { actuator_id, .. } => {
            *candidate.actuator_tunables.entry(actuator_id.clone()).or_insert(0.0) += delta;
        }
    }
    Some(candidate)
}

fn validate(genome: &Genome) -> ProtoResult<()> {
    genome.tuning_meta.validate()
}

/// A candidate fitness dominates an incumbent iff it clears the
/// incumbent by a *relative*, sign-aware margin: `candidate >
/// incumbent + |incumbent| * min_improvement`, strictly. Vector
/// fitness must dominate component-wise; mismatched shapes (including
/// a scalar against a vector) never dominate.
fn dominates(candidate: &Fitness, incumbent: &Fitness, min_improvement: f64) -> bool {
    fn dominates_scalar(candidate: f64, incumbent: f64, min_improvement: f64) -> bool {
        candidate > incumbent + incumbent.abs() * min_improvement
    }

    match (candidate, incumbent) {
        (Fitness::Scalar(c), Fitness::Scalar(i)) => dominates_scalar(*c, *i, min_improvement),
        (Fitness::Vector(c), Fitness::Vector(i)) => {
            c.len() == i.len() && c.iter().zip(i).all(|(&cv, &iv)| dominates_scalar(cv, iv, min_improvement))
        }
        _ => false,
    }
}

/// Run stochastic hill-climbing attempts against `base`, using
/// `fitness_fn` to score each candidate.
///
/// `attempts` is a consecutive-no-improvement cap, not a total-attempts
/// cap: every rejection advances the counter toward it, every
/// acceptance resets the counter to zero, so an incumbent on a
/// winning streak can run past `attempts` total iterations.
///
/// `attempts == 0` is a deliberate no-op budget (a `TuneAttemptPolicy`
/// can decay to zero for a generation): this evaluates the baseline
/// once, returns a clone of `base` unchanged, and reports an
/// all-zero `TuningCounters` except for the single evaluation.
///
/// Pure with respect to `base` (never mutated) and returns a fresh
/// owned `Genome`, so concurrent callers each tuning their own genome
/// need no synchronization between them.
pub fn tune<F>(
    base: &Genome,
    attempts: u32,
    seed: u64,
    goal_fitness: Option<f64>,
    fitness_fn: F,
) -> ProtoResult<TuneReport>
where
    F: Fn(&Genome) -> ProtoResult<Fitness>,
{
    validate(base)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut counters = TuningCounters {
        invocations: 1,
        ..TuningCounters::default()
    };

    let baseline_fitness = fitness_fn(base)?;
    counters.evaluations += 1;

    let baseline_meets_goal = goal_fitness.map(|goal| baseline_fitness.primary() >= goal).unwrap_or(false);
    if attempts == 0 || baseline_meets_goal {
        return Ok(TuneReport {
            genome: base.clone(),
            fitness: baseline_fitness,
            counters,
            goal_reached: baseline_meets_goal,
        });
    }

    let selection = base.tuning_meta.candidate_selection;
    let mut provider = CandidateBasesProvider::new(base.clone(), baseline_fitness.primary());
    let mut best_genome = base.clone();
    let mut best_fitness = baseline_fitness;
    let mut goal_reached = false;
    let mut consecutive_no_improvement: u32 = 0;

    while consecutive_no_improvement < attempts {
        counters.attempts += 1;
        let base_candidate = provider.pick(selection, &mut rng).clone();

        let Some(candidate) = perturb_one(
            &base_candidate,
            selection,
            &mut rng,
            base.tuning_meta.annealing_factor,
            base.tuning_meta.step_size,
            base.tuning_meta.perturbation_range,
        ) else {
            tracing::debug!("tuner has no tunable parameter; stopping early");
            break;
        };

        let candidate_fitness = fitness_fn(&candidate)?;
        counters.evaluations += 1;

        if dominates(&candidate_fitness, &best_fitness, base.tuning_meta.min_improvement) {
            counters.accepted += 1;
            consecutive_no_improvement = 0;
            let score = candidate_fitness.primary();
            let mut accepted = candidate.clone();
            accepted.meta.fitness = Some(candidate_fitness.clone());
            provider.record_accepted(accepted, score);
            best_genome = candidate;
            best_fitness = candidate_fitness;
        } else {
            counters.rejected += 1;
            consecutive_no_improvement += 1;
        }

        if let Some(goal) = goal_fitness {
            if best_fitness.primary() >= goal {
                counters.goal_hits += 1;
                goal_reached = true;
                break;
            }
        }
    }

    Ok(TuneReport {
        genome: best_genome,
        fitness: best_fitness,
        counters,
        goal_reached,
    })
}

/// Wraps a scape-evaluation failure as a tuning-specific error without
/// losing the genome id that failed.
pub fn scape_failure(genome_id: impl Into<String>, message: impl Into<String>) -> ProtoError {
    ProtoError::ScapeFailure {
        genome_id: genome_id.into(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protogonos_genome::{IoUnit, Neuron, Synapse};

    fn xor_like_genome() -> Genome {
        let mut g = Genome::new("g0", 0);
        g.neurons.push(Neuron::new("n1", 0));
        let mut n2 = Neuron::new("n2", 0);
        n2.bias = Some(0.0);
        g.neurons.push(n2);
        g.synapses.push(Synapse::new("s1", "n1", "n2", 0.1));
        g.protected_neuron_ids.insert("n1".into());
        g.protected_neuron_ids.insert("n2".into());
        g
    }

    fn target_weight_fitness(genome: &Genome) -> ProtoResult<Fitness> {
        let weight = genome.synapses.first().map(|s| s.weight).unwrap_or(0.0);
        Ok(Fitness::Scalar(-((weight - 3.0).powi(2))))
    }

    #[test]
    fn zero_attempts_is_a_baseline_only_noop() {
        let g = xor_like_genome();
        let report = tune(&g, 0, 42, None, target_weight_fitness).unwrap();
        assert_eq!(report.counters.evaluations, 1);
        assert_eq!(report.counters.attempts, 0);
        assert_eq!(report.counters.accepted, 0);
        assert_eq!(report.genome.fingerprint(), g.fingerprint());
    }

    #[test]
    fn tuning_is_deterministic_for_a_fixed_seed() {
        let g = xor_like_genome();
        let a = tune(&g, 25, 7, None, target_weight_fitness).unwrap();
        let b = tune(&g, 25, 7, None, target_weight_fitness).unwrap();
        assert_eq!(a.fitness, b.fitness);
        assert_eq!(a.genome.fingerprint(), b.genome.fingerprint());
    }

    #[test]
    fn goal_fitness_short_circuits_remaining_attempts() {
        let g = xor_like_genome();
        let report = tune(&g, 1000, 3, Some(-0.0001), target_weight_fitness).unwrap();
        assert!(report.goal_reached);
        assert!(report.counters.attempts < 1000);
    }

    #[test]
    fn goal_already_met_by_baseline_stops_after_one_evaluation() {
        let g = xor_like_genome();
        let report = tune(&g, 40, 5, Some(0.9), |_| Ok(Fitness::Scalar(1.0))).unwrap();
        assert!(report.goal_reached);
        assert_eq!(report.counters.evaluations, 1);
        assert_eq!(report.counters.attempts, 0);
    }

    #[test]
    fn high_min_improvement_rejects_every_attempt() {
        let mut g = xor_like_genome();
        g.tuning_meta.min_improvement = 1_000_000.0;
        let report = tune(&g, 20, 9, None, target_weight_fitness).unwrap();
        assert_eq!(report.counters.accepted, 0);
        assert_eq!(report.counters.rejected, 20);
        assert_eq!(report.genome.fingerprint(), g.fingerprint());
    }

    #[test]
    fn invalid_tuning_meta_is_rejected_before_any_evaluation() {
        let mut g = xor_like_genome();
        g.tuning_meta.step_size = 0.0;
        let err = tune(&g, 5, 1, None, target_weight_fitness).unwrap_err();
        assert_eq!(err.kind(), protogonos_genome::ErrorKind::Validation);
    }

    #[test]
    fn concurrent_tune_calls_do_not_interfere() {
        use std::sync::Arc;
        use std::thread;

        let g = Arc::new(xor_like_genome());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let g = Arc::clone(&g);
                thread::spawn(move || tune(&g, 10, i as u64, None, target_weight_fitness).unwrap())
            })
            .collect();
        for h in handles {
            let report = h.join().unwrap();
            assert!(report.counters.evaluations >= 1);
        }
    }

    #[test]
    fn dominance_is_relative_strict_and_threshold_exclusive() {
        let incumbent = Fitness::Scalar(2.0);
        let min_improvement = 0.5;
        let at_threshold = Fitness::Scalar(2.0 * (1.0 + min_improvement));
        assert!(!dominates(&at_threshold, &incumbent, min_improvement));

        let just_above = Fitness::Scalar(2.0 * (1.0 + min_improvement) + 0.0001);
        assert!(dominates(&just_above, &incumbent, min_improvement));
    }

    #[test]
    fn vector_dominance_is_per_component_and_rejects_mismatched_length() {
        let incumbent = Fitness::Vector(vec![1.0, 2.0]);
        let min_improvement = 0.1;

        let improved = Fitness::Vector(vec![1.2, 2.4]);
        assert!(dominates(&improved, &incumbent, min_improvement));

        let one_component_short = Fitness::Vector(vec![1.2, 2.1]);
        assert!(!dominates(&one_component_short, &incumbent, min_improvement));

        let mismatched_length = Fitness::Vector(vec![1.2]);
        assert!(!dominates(&mismatched_length, &incumbent, min_improvement));
    }

    fn actuator_only_genome() -> Genome {
        let mut g = Genome::new("g-actuator", 3);
        let actuator = IoUnit::new("act1", 1, 1);
        g.actuator_ids.push(actuator.id.clone());
        g.actuators.insert(actuator.id.clone(), actuator);
        g
    }

    fn actuator_tunable_fitness(genome: &Genome) -> ProtoResult<Fitness> {
        let v = genome.actuator_tunables.get("act1").copied().unwrap_or(0.0);
        Ok(Fitness::Scalar(-((v - 5.0).powi(2))))
    }

    #[test]
    fn actuator_local_tunables_are_perturbed_when_they_are_the_only_target() {
        let g = actuator_only_genome();
        let report = tune(&g, 200, 11, None, actuator_tunable_fitness).unwrap();
        assert!(report.counters.accepted > 0);
        assert_ne!(report.genome.actuator_tunables.get("act1").copied().unwrap_or(0.0), 0.0);
    }

    #[test]
    fn consecutive_no_improvement_cap_can_run_past_the_planned_attempt_count() {
        use std::cell::Cell;

        let g = xor_like_genome();
        let call_count = Cell::new(0u32);
        let fitness_fn = move |_: &Genome| {
            let n = call_count.get();
            call_count.set(n + 1);
            // Call 0 is the baseline; calls 1-4 each strictly improve,
            // then fitness plateaus forever.
            Ok(Fitness::Scalar(if n == 0 { 0.0 } else { n.min(4) as f64 }))
        };

        let report = tune(&g, 2, 5, None, fitness_fn).unwrap();
        assert!(report.counters.attempts > 2, "a 2-attempt no-improvement cap should survive 4 acceptances before the 2 rejections that end it");
    }
}
