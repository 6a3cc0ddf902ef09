// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! `run_index.json`: a flat directory of every run under the
//! benchmarks root, sorted newest-first so `runs` can list without
//! opening each run's own artifacts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunIndexEntry {
    pub run_id: String,
    pub created_at_utc: String,
    pub scape: String,
    pub final_generation: u64,
    pub best_fitness: f64,
}

/// Upsert `entry` into `entries` by run id, then sort by
/// `created_at_utc` descending; ties are broken by later append order
/// (a re-upserted or newly-added entry sorts ahead of an
/// equal-timestamp entry that has sat in the index longer).
pub fn upsert(entries: &mut Vec<RunIndexEntry>, entry: RunIndexEntry) {
    entries.retain(|e| e.run_id != entry.run_id);
    entries.push(entry);

    let append_order: Vec<usize> = (0..entries.len()).collect();
    let mut indexed: Vec<(usize, RunIndexEntry)> = append_order.into_iter().zip(entries.drain(..)).collect();
    indexed.sort_by(|a, b| b.1.created_at_utc.cmp(&a.1.created_at_utc).then(b.0.cmp(&a.0)));
    entries.extend(indexed.into_iter().map(|(_, e)| e));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(run_id: &str, created_at: &str) -> RunIndexEntry {
        RunIndexEntry {
            run_id: run_id.to_string(),
            created_at_utc: created_at.to_string(),
            scape: "xor".to_string(),
            final_generation: 1,
            best_fitness: 0.5,
        }
    }

    #[test]
    fn sorts_newest_first() {
        let mut entries = Vec::new();
        upsert(&mut entries, entry("a", "2026-01-01T00:00:00Z"));
        upsert(&mut entries, entry("b", "2026-01-02T00:00:00Z"));
        assert_eq!(entries[0].run_id, "b");
        assert_eq!(entries[1].run_id, "a");
    }

    #[test]
    fn ties_break_by_later_append_order() {
        let mut entries = Vec::new();
        upsert(&mut entries, entry("a", "2026-01-01T00:00:00Z"));
        upsert(&mut entries, entry("b", "2026-01-01T00:00:00Z"));
        assert_eq!(entries[0].run_id, "b");
        assert_eq!(entries[1].run_id, "a");
    }

    #[test]
    fn upsert_replaces_existing_entry_for_the_same_run_id() {
        let mut entries = Vec::new();
        upsert(&mut entries, entry("a", "2026-01-01T00:00:00Z"));
        let mut updated = entry("a", "2026-01-01T00:00:00Z");
        updated.final_generation = 5;
        upsert(&mut entries, updated);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].final_generation, 5);
    }
}
