// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

use protogonos_genome::{Fitness, Genome, ProtoError, ProtoResult};
use protogonos_mutation::seed_for_index;
use protogonos_scape::Scape;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One genome's evaluation result, kept alongside its id since the
/// pool's output order matches input order but callers often want to
/// key back into a population by id regardless.
#[derive(Debug, Clone)]
pub struct EvalOutcome {
    pub genome_id: String,
    pub result: Result<Fitness, ProtoError>,
}

/// A bounded worker pool that scores a generation's genomes against a
/// shared `Scape`. Built on a dedicated `rayon::ThreadPool` so the
/// worker count is explicit and independent of the global rayon pool
/// the rest of the process might use.
pub struct EvalPool {
    scape: Arc<dyn Scape>,
    pool: rayon::ThreadPool,
}

impl EvalPool {
    pub fn new(scape: Arc<dyn Scape>, worker_count: usize) -> ProtoResult<Self> {
        let worker_count = worker_count.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .build()
            .map_err(|err| ProtoError::Validation(format!("failed to build evaluation worker pool: {err}")))?;
        Ok(EvalPool { scape, pool })
    }

    /// Score every genome in `genomes` concurrently. `run_seed` and
    /// `generation` are combined with each genome's population index
    /// to derive a per-genome evaluation seed that is stable
    /// regardless of worker count or scheduling order.
    ///
    /// `cancel` is polled once per genome just before evaluation; once
    /// set, every not-yet-started evaluation short-circuits to
    /// `ProtoError::Cancelled` instead of running the scape. Already
    /// in-flight evaluations on other workers still complete.
    pub fn evaluate_generation(
        &self,
        genomes: &[Genome],
        run_seed: u64,
        generation: u64,
        cancel: &AtomicBool,
    ) -> Vec<EvalOutcome> {
        self.pool.install(|| {
            genomes
                .par_iter()
                .enumerate()
                .map(|(index, genome)| {
                    if cancel.load(Ordering::Relaxed) {
                        return EvalOutcome {
                            genome_id: genome.id.clone(),
                            result: Err(ProtoError::Cancelled),
                        };
                    }
                    let seed = seed_for_index(run_seed, generation, index);
                    let result = self.scape.evaluate(genome, seed);
                    if let Err(ref err) = result {
                        tracing::debug!(genome_id = %genome.id, error = %err, "scape evaluation failed");
                    }
                    EvalOutcome {
                        genome_id: genome.id.clone(),
                        result,
                    }
                })
                .collect()
        })
    }
}

/// Write each outcome's fitness back onto the matching genome by id.
/// Genomes whose evaluation failed are left with `meta.fitness` unset;
/// callers decide whether a failed genome is penalized or dropped.
pub fn apply_outcomes(genomes: &mut [Genome], outcomes: &[EvalOutcome]) {
    use std::collections::HashMap;
    let by_id: HashMap<&str, &EvalOutcome> = outcomes.iter().map(|o| (o.genome_id.as_str(), o)).collect();
    for genome in genomes.iter_mut() {
        if let Some(outcome) = by_id.get(genome.id.as_str()) {
            if let Ok(fitness) = &outcome.result {
                genome.meta.fitness = Some(fitness.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protogonos_scape::XorScape;

    fn genomes(n: usize) -> Vec<Genome> {
        (0..n).map(|i| Genome::new(format!("g{i}"), 0)).collect()
    }

    #[test]
    fn evaluates_every_genome_and_preserves_order() {
        let pool = EvalPool::new(Arc::new(XorScape), 4).unwrap();
        let cancel = AtomicBool::new(false);
        let gs = genomes(10);
        let outcomes = pool.evaluate_generation(&gs, 42, 0, &cancel);
        assert_eq!(outcomes.len(), 10);
        for (g, o) in gs.iter().zip(outcomes.iter()) {
            assert_eq!(&g.id, &o.genome_id);
            assert!(o.result.is_ok());
        }
    }

    #[test]
    fn cancellation_short_circuits_remaining_work() {
        let pool = EvalPool::new(Arc::new(XorScape), 2).unwrap();
        let cancel = AtomicBool::new(true);
        let gs = genomes(5);
        let outcomes = pool.evaluate_generation(&gs, 1, 0, &cancel);
        assert!(outcomes.iter().all(|o| matches!(o.result, Err(ProtoError::Cancelled))));
    }

    #[test]
    fn apply_outcomes_writes_fitness_by_id() {
        let pool = EvalPool::new(Arc::new(XorScape), 2).unwrap();
        let cancel = AtomicBool::new(false);
        let mut gs = genomes(3);
        let outcomes = pool.evaluate_generation(&gs, 7, 1, &cancel);
        apply_outcomes(&mut gs, &outcomes);
        assert!(gs.iter().all(|g| g.meta.fitness.is_some()));
    }

    #[test]
    fn same_seed_and_generation_reproduce_identical_fitness() {
        let pool = EvalPool::new(Arc::new(XorScape), 3).unwrap();
        let cancel = AtomicBool::new(false);
        let gs = genomes(6);
        let a = pool.evaluate_generation(&gs, 99, 2, &cancel);
        let b = pool.evaluate_generation(&gs, 99, 2, &cancel);
        for (oa, ob) in a.iter().zip(b.iter()) {
            assert_eq!(oa.result.as_ref().unwrap(), ob.result.as_ref().unwrap());
        }
    }
}
