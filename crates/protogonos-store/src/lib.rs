// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! # protogonos-store
//!
//! File-tree persistence for a run's artifacts: genomes, population
//! snapshots, lineage, fitness history, generation diagnostics,
//! species history, top genomes, scape summaries, trace accumulation,
//! and the cross-run benchmark index. Every structured record goes
//! through the `Record<T>` envelope in [`record`], which stamps and
//! checks a `{schema_version, codec_version}` pair so a reader never
//! silently misinterprets an artifact written by an older codec.

pub mod fs_store;
pub mod record;
pub mod run_index;

pub use fs_store::{now_utc_rfc3339, FileStore, ScapeSummaryRecord, TopGenomeEntry, TraceEntry};
pub use record::{decode_record, encode_record, require_finite, Record, RecordKind};
pub use run_index::{upsert as upsert_run_index, RunIndexEntry};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
