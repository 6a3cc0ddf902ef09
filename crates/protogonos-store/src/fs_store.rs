// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! A run's artifacts as a file tree under `run_root/<run_id>/`, plus a
//! shared `benchmarks/run_index.json` one level up. Every typed record
//! goes through `Record<T>`; `config.json`/benchmark files are kept as
//! plain JSON/CSV since they have no schema-evolution story of their
//! own and benefit from staying human-inspectable.

use crate::record::{decode_record, encode_record, require_finite, Record, RecordKind};
use crate::run_index::{self, RunIndexEntry};
use protogonos_genome::{
    GenerationDiagnostics, Genome, GenomeSummary, LineageRecord, PopulationSnapshot, ProtoError, ProtoResult,
    SpeciesGeneration,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One `top_genomes.json` entry: a genome's summary and fitness
/// without the full structural payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopGenomeEntry {
    pub genome_id: String,
    pub fitness: f64,
    pub fingerprint: String,
    pub summary: GenomeSummary,
}

/// One `trace_acc.json` entry, mirroring a `PrintTrace` command's
/// side effect without this crate depending on `protogonos-control`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub generation: u64,
    pub best_fitness_so_far: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScapeSummaryRecord {
    pub name: String,
    pub sensor_template_count: usize,
    pub actuator_template_count: usize,
}

/// Stamp for a fresh `RunIndexEntry.created_at_utc`. Kept here rather
/// than inline at every call site so run indices always use the same
/// format (`chrono`'s RFC 3339), matching how `run_index::upsert`
/// compares timestamps lexically.
pub fn now_utc_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root.join(run_id)
    }

    fn genomes_dir(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id).join("genomes")
    }

    fn ensure_dir(dir: &Path) -> ProtoResult<()> {
        fs::create_dir_all(dir).map_err(ProtoError::from)
    }

    fn write_file(path: &Path, contents: &str) -> ProtoResult<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir(parent)?;
        }
        fs::write(path, contents).map_err(ProtoError::from)
    }

    fn read_file(path: &Path) -> ProtoResult<String> {
        fs::read_to_string(path).map_err(ProtoError::from)
    }

    fn read_records<T: for<'de> Deserialize<'de>>(path: &Path, kind: RecordKind) -> ProtoResult<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = Self::read_file(path)?;
        let record: Record<Vec<T>> = decode_record(&raw, kind)?;
        Ok(record.payload)
    }

    fn write_records<T: Serialize>(path: &Path, kind: RecordKind, items: &[T]) -> ProtoResult<()> {
        let record = Record::new(kind, items);
        let encoded = encode_record(&record, kind)?;
        Self::write_file(path, &encoded)
    }

    // --- genome CRUD ---

    pub fn save_genome(&self, run_id: &str, genome: &Genome) -> ProtoResult<()> {
        let path = self.genomes_dir(run_id).join(format!("{}.json", genome.id));
        let record = Record::new(RecordKind::Genome, genome);
        let encoded = encode_record(&record, RecordKind::Genome)?;
        Self::write_file(&path, &encoded)
    }

    pub fn load_genome(&self, run_id: &str, genome_id: &str) -> ProtoResult<Genome> {
        let path = self.genomes_dir(run_id).join(format!("{genome_id}.json"));
        if !path.exists() {
            return Err(ProtoError::NotFound(format!("genome '{genome_id}' not found in run '{run_id}'")));
        }
        let raw = Self::read_file(&path)?;
        let record: Record<Genome> = decode_record(&raw, RecordKind::Genome)?;
        Ok(record.payload)
    }

    pub fn delete_genome(&self, run_id: &str, genome_id: &str) -> ProtoResult<()> {
        let path = self.genomes_dir(run_id).join(format!("{genome_id}.json"));
        if path.exists() {
            fs::remove_file(path).map_err(ProtoError::from)?;
        }
        Ok(())
    }

    // --- population snapshot ---

    pub fn save_population_snapshot(&self, run_id: &str, snapshot: &PopulationSnapshot, genomes: &[Genome]) -> ProtoResult<()> {
        snapshot.check_version()?;
        for genome in genomes {
            self.save_genome(run_id, genome)?;
        }
        let path = self.run_dir(run_id).join("population_snapshot.json");
        let record = Record::new(RecordKind::PopulationSnapshot, snapshot);
        let encoded = encode_record(&record, RecordKind::PopulationSnapshot)?;
        Self::write_file(&path, &encoded)
    }

    pub fn load_population_snapshot(&self, run_id: &str) -> ProtoResult<(PopulationSnapshot, Vec<Genome>)> {
        let path = self.run_dir(run_id).join("population_snapshot.json");
        if !path.exists() {
            return Err(ProtoError::NotFound(format!("no population snapshot for run '{run_id}'")));
        }
        let raw = Self::read_file(&path)?;
        let record: Record<PopulationSnapshot> = decode_record(&raw, RecordKind::PopulationSnapshot)?;
        let snapshot = record.payload;
        let genomes = snapshot
            .agent_ids
            .iter()
            .map(|id| self.load_genome(run_id, id))
            .collect::<ProtoResult<Vec<_>>>()?;
        Ok((snapshot, genomes))
    }

    /// Remove a run's population snapshot and every genome it
    /// referenced. Diagnostics/lineage/fitness history are left
    /// intact; only the resumable population state is deleted.
    pub fn delete_population(&self, run_id: &str) -> ProtoResult<()> {
        let snapshot_path = self.run_dir(run_id).join("population_snapshot.json");
        if snapshot_path.exists() {
            fs::remove_file(&snapshot_path).map_err(ProtoError::from)?;
        }
        let genomes_dir = self.genomes_dir(run_id);
        if genomes_dir.exists() {
            fs::remove_dir_all(&genomes_dir).map_err(ProtoError::from)?;
        }
        Ok(())
    }

    // --- generation diagnostics (append-as-you-go) ---

    pub fn append_generation_diagnostics(&self, run_id: &str, diagnostics: &GenerationDiagnostics) -> ProtoResult<()> {
        require_finite(diagnostics.best_fitness, "best_fitness")?;
        require_finite(diagnostics.mean_fitness, "mean_fitness")?;
        require_finite(diagnostics.min_fitness, "min_fitness")?;
        let path = self.run_dir(run_id).join("generation_diagnostics.json");
        let mut all: Vec<GenerationDiagnostics> = Self::read_records(&path, RecordKind::GenerationDiagnostics)?;
        all.push(diagnostics.clone());
        Self::write_records(&path, RecordKind::GenerationDiagnostics, &all)
    }

    pub fn read_generation_diagnostics(&self, run_id: &str) -> ProtoResult<Vec<GenerationDiagnostics>> {
        let path = self.run_dir(run_id).join("generation_diagnostics.json");
        Self::read_records(&path, RecordKind::GenerationDiagnostics)
    }

    // --- lineage (append-only) ---

    pub fn append_lineage(&self, run_id: &str, records: &[LineageRecord]) -> ProtoResult<()> {
        let path = self.run_dir(run_id).join("lineage.json");
        let mut all: Vec<LineageRecord> = Self::read_records(&path, RecordKind::LineageRecord)?;
        all.extend(records.iter().cloned());
        Self::write_records(&path, RecordKind::LineageRecord, &all)
    }

    pub fn read_lineage(&self, run_id: &str) -> ProtoResult<Vec<LineageRecord>> {
        let path = self.run_dir(run_id).join("lineage.json");
        Self::read_records(&path, RecordKind::LineageRecord)
    }

    // --- species history ---

    pub fn append_species_generation(&self, run_id: &str, generation: &SpeciesGeneration) -> ProtoResult<()> {
        let path = self.run_dir(run_id).join("species_history.json");
        let mut all: Vec<SpeciesGeneration> = Self::read_records(&path, RecordKind::SpeciesHistory)?;
        if let Some(last) = all.last() {
            if generation.generation <= last.generation {
                return Err(ProtoError::Validation(format!(
                    "species history generation must strictly increase: last={}, got={}",
                    last.generation, generation.generation
                )));
            }
        }
        all.push(generation.clone());
        Self::write_records(&path, RecordKind::SpeciesHistory, &all)
    }

    pub fn read_species_history(&self, run_id: &str) -> ProtoResult<Vec<SpeciesGeneration>> {
        let path = self.run_dir(run_id).join("species_history.json");
        Self::read_records(&path, RecordKind::SpeciesHistory)
    }

    // --- fitness history (best-by-generation) ---

    pub fn append_fitness_point(&self, run_id: &str, best_fitness: f64) -> ProtoResult<()> {
        require_finite(best_fitness, "best_fitness")?;
        let path = self.run_dir(run_id).join("fitness_history.json");
        let mut all: Vec<f64> = Self::read_records(&path, RecordKind::FitnessHistory)?;
        all.push(best_fitness);
        Self::write_records(&path, RecordKind::FitnessHistory, &all)
    }

    pub fn read_fitness_history(&self, run_id: &str) -> ProtoResult<Vec<f64>> {
        let path = self.run_dir(run_id).join("fitness_history.json");
        Self::read_records(&path, RecordKind::FitnessHistory)
    }

    // --- top genomes ---

    pub fn write_top_genomes(&self, run_id: &str, candidates: &[Genome], limit: usize) -> ProtoResult<()> {
        let mut entries: Vec<TopGenomeEntry> = candidates
            .iter()
            .filter_map(|g| {
                g.meta.fitness.as_ref().map(|f| TopGenomeEntry {
                    genome_id: g.id.clone(),
                    fitness: f.primary(),
                    fingerprint: g.fingerprint(),
                    summary: g.summary(),
                })
            })
            .collect();
        entries.sort_by(|a, b| b.fitness.partial_cmp(&a.fitness).unwrap_or(std::cmp::Ordering::Equal));
        entries.truncate(limit);
        let path = self.run_dir(run_id).join("top_genomes.json");
        Self::write_records(&path, RecordKind::TopGenomes, &entries)
    }

    pub fn read_top_genomes(&self, run_id: &str) -> ProtoResult<Vec<TopGenomeEntry>> {
        let path = self.run_dir(run_id).join("top_genomes.json");
        Self::read_records(&path, RecordKind::TopGenomes)
    }

    // --- scape summary ---

    pub fn write_scape_summary(&self, run_id: &str, summary: &ScapeSummaryRecord) -> ProtoResult<()> {
        let path = self.run_dir(run_id).join("scape_summary.json");
        let record = Record::new(RecordKind::ScapeSummary, summary);
        let encoded = encode_record(&record, RecordKind::ScapeSummary)?;
        Self::write_file(&path, &encoded)
    }

    pub fn read_scape_summary(&self, run_id: &str) -> ProtoResult<ScapeSummaryRecord> {
        let path = self.run_dir(run_id).join("scape_summary.json");
        let raw = Self::read_file(&path)?;
        let record: Record<ScapeSummaryRecord> = decode_record(&raw, RecordKind::ScapeSummary)?;
        Ok(record.payload)
    }

    // --- trace accumulator ---

    pub fn append_trace(&self, run_id: &str, entry: &TraceEntry) -> ProtoResult<()> {
        let path = self.run_dir(run_id).join("trace_acc.json");
        let mut all: Vec<TraceEntry> = self.read_json_array(&path)?;
        all.push(TraceEntry { generation: entry.generation, best_fitness_so_far: entry.best_fitness_so_far });
        self.write_json_array(&path, &all)
    }

    // --- config and benchmark artifacts (untyped JSON/CSV, no schema evolution) ---

    pub fn write_config<T: Serialize>(&self, run_id: &str, config: &T) -> ProtoResult<()> {
        let path = self.run_dir(run_id).join("config.json");
        self.write_json_array(&path, config)
    }

    pub fn read_config<T: for<'de> Deserialize<'de>>(&self, run_id: &str) -> ProtoResult<T> {
        let path = self.run_dir(run_id).join("config.json");
        let raw = Self::read_file(&path)?;
        serde_json::from_str(&raw).map_err(ProtoError::from)
    }

    pub fn write_benchmark_summary<T: Serialize>(&self, run_id: &str, summary: &T) -> ProtoResult<()> {
        let path = self.run_dir(run_id).join("benchmark_summary.json");
        self.write_json_array(&path, summary)
    }

    pub fn write_compare_tuning<T: Serialize>(&self, run_id: &str, comparison: &T) -> ProtoResult<()> {
        let path = self.run_dir(run_id).join("compare_tuning.json");
        self.write_json_array(&path, comparison)
    }

    /// `generation,best_fitness`, one row per generation, 1-indexed.
    pub fn write_benchmark_series(&self, run_id: &str, best_by_generation: &[f64]) -> ProtoResult<()> {
        let mut csv = String::from("generation,best_fitness\n");
        for (zero_indexed, fitness) in best_by_generation.iter().enumerate() {
            require_finite(*fitness, "best_fitness")?;
            csv.push_str(&format!("{},{}\n", zero_indexed + 1, fitness));
        }
        let path = self.run_dir(run_id).join("benchmark_series.csv");
        Self::write_file(&path, &csv)
    }

    // --- run index (shared across runs, under benchmarks/) ---

    fn run_index_path(&self) -> PathBuf {
        self.root.join("benchmarks").join("run_index.json")
    }

    pub fn read_run_index(&self) -> ProtoResult<Vec<RunIndexEntry>> {
        self.read_json_array(&self.run_index_path())
    }

    pub fn upsert_run_index(&self, entry: RunIndexEntry) -> ProtoResult<()> {
        let path = self.run_index_path();
        let mut entries = self.read_json_array(&path)?;
        run_index::upsert(&mut entries, entry);
        self.write_json_array(&path, &entries)
    }

    // --- small untyped JSON helpers shared by config/benchmark/index files ---

    fn read_json_array<T: for<'de> Deserialize<'de> + Default>(&self, path: &Path) -> ProtoResult<T> {
        if !path.exists() {
            return Ok(T::default());
        }
        let raw = Self::read_file(path)?;
        serde_json::from_str(&raw).map_err(ProtoError::from)
    }

    fn write_json_array<T: Serialize>(&self, path: &Path, value: &T) -> ProtoResult<()> {
        let encoded = serde_json::to_string_pretty(value).map_err(ProtoError::from)?;
        Self::write_file(path, &encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protogonos_genome::{Fitness, TuningCounters};
    use tempfile::tempdir;

    fn diagnostics(generation: u64, best_fitness: f64) -> GenerationDiagnostics {
        GenerationDiagnostics {
            generation,
            best_fitness,
            mean_fitness: best_fitness / 2.0,
            min_fitness: 0.0,
            species_count: 1,
            fingerprint_diversity: 0.0,
            tuning: TuningCounters::default(),
        }
    }

    #[test]
    fn genome_round_trips() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut genome = Genome::new("g1", 0);
        genome.meta.fitness = Some(Fitness::Scalar(0.75));

        store.save_genome("run-1", &genome).unwrap();
        let loaded = store.load_genome("run-1", "g1").unwrap();
        assert_eq!(loaded.id, "g1");
        assert_eq!(loaded.meta.fitness, Some(Fitness::Scalar(0.75)));
    }

    #[test]
    fn missing_genome_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let err = store.load_genome("run-1", "ghost").unwrap_err();
        assert_eq!(err.kind(), protogonos_genome::ErrorKind::NotFound);
    }

    #[test]
    fn population_snapshot_round_trips_with_its_genomes() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let genomes = vec![Genome::new("g1", 0), Genome::new("g2", 0)];
        let snapshot = PopulationSnapshot::new("snap-1", 1, vec!["g1".into(), "g2".into()]).unwrap();

        store.save_population_snapshot("run-1", &snapshot, &genomes).unwrap();
        let (loaded_snapshot, loaded_genomes) = store.load_population_snapshot("run-1").unwrap();
        assert_eq!(loaded_snapshot.generation, 1);
        assert_eq!(loaded_genomes.len(), 2);
    }

    #[test]
    fn delete_population_removes_snapshot_and_genomes_only() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let genomes = vec![Genome::new("g1", 0)];
        let snapshot = PopulationSnapshot::new("snap-1", 1, vec!["g1".into()]).unwrap();
        store.save_population_snapshot("run-1", &snapshot, &genomes).unwrap();
        store.append_generation_diagnostics("run-1", &diagnostics(0, 0.5)).unwrap();

        store.delete_population("run-1").unwrap();

        assert!(store.load_population_snapshot("run-1").is_err());
        assert_eq!(store.read_generation_diagnostics("run-1").unwrap().len(), 1);
    }

    #[test]
    fn generation_diagnostics_append_preserves_order() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.append_generation_diagnostics("run-1", &diagnostics(0, 0.1)).unwrap();
        store.append_generation_diagnostics("run-1", &diagnostics(1, 0.3)).unwrap();

        let all = store.read_generation_diagnostics("run-1").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].generation, 0);
        assert_eq!(all[1].generation, 1);
    }

    #[test]
    fn species_history_rejects_non_increasing_generation() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let gen0 = SpeciesGeneration { generation: 0, species: vec![], added: Default::default(), removed: Default::default() };
        let gen0_again = SpeciesGeneration { generation: 0, species: vec![], added: Default::default(), removed: Default::default() };
        store.append_species_generation("run-1", &gen0).unwrap();
        assert!(store.append_species_generation("run-1", &gen0_again).is_err());
    }

    #[test]
    fn top_genomes_are_sorted_descending_and_truncated() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut genomes = Vec::new();
        for (i, fitness) in [0.1, 0.9, 0.5].into_iter().enumerate() {
            let mut g = Genome::new(format!("g{i}"), 0);
            g.meta.fitness = Some(Fitness::Scalar(fitness));
            genomes.push(g);
        }

        store.write_top_genomes("run-1", &genomes, 2).unwrap();
        let top = store.read_top_genomes("run-1").unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].genome_id, "g1");
        assert_eq!(top[1].genome_id, "g2");
    }

    #[test]
    fn benchmark_series_is_one_indexed_csv() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.write_benchmark_series("run-1", &[0.1, 0.5]).unwrap();

        let csv = fs::read_to_string(store.run_dir("run-1").join("benchmark_series.csv")).unwrap();
        assert_eq!(csv, "generation,best_fitness\n1,0.1\n2,0.5\n");
    }

    #[test]
    fn benchmark_series_rejects_non_finite_fitness() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.write_benchmark_series("run-1", &[f64::NAN]).is_err());
    }

    #[test]
    fn run_index_upsert_is_queryable() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store
            .upsert_run_index(RunIndexEntry {
                run_id: "run-1".into(),
                created_at_utc: "2026-01-01T00:00:00Z".into(),
                scape: "xor".into(),
                final_generation: 2,
                best_fitness: 0.8,
            })
            .unwrap();

        let entries = store.read_run_index().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].run_id, "run-1");
    }
}
