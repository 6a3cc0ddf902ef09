// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! The typed envelope every persisted record is wrapped in, and the
//! closed set of record kinds this crate writes. Mirrors the
//! closed-enum-over-string-tag pattern `protogonos-genome::catalog`
//! uses for evolutionary enums, applied here to storage record kinds.

use protogonos_genome::{ErrorKind, ProtoError, ProtoResult, CODEC_VERSION, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of record kinds this crate persists. Unknown kinds
/// on decode are `ProtoError::Validation`, not a silent pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Genome,
    PopulationSnapshot,
    LineageRecord,
    FitnessHistory,
    GenerationDiagnostics,
    SpeciesHistory,
    TopGenomes,
    ScapeSummary,
    RunIndex,
}

impl RecordKind {
    pub fn canonical(&self) -> &'static str {
        match self {
            RecordKind::Genome => "genome",
            RecordKind::PopulationSnapshot => "population_snapshot",
            RecordKind::LineageRecord => "lineage_record",
            RecordKind::FitnessHistory => "fitness_history",
            RecordKind::GenerationDiagnostics => "generation_diagnostics",
            RecordKind::SpeciesHistory => "species_history",
            RecordKind::TopGenomes => "top_genomes",
            RecordKind::ScapeSummary => "scape_summary",
            RecordKind::RunIndex => "run_index",
        }
    }

    pub fn normalize(raw: &str) -> ProtoResult<Self> {
        match raw {
            "genome" => Ok(RecordKind::Genome),
            "population_snapshot" => Ok(RecordKind::PopulationSnapshot),
            "lineage_record" => Ok(RecordKind::LineageRecord),
            "fitness_history" => Ok(RecordKind::FitnessHistory),
            "generation_diagnostics" => Ok(RecordKind::GenerationDiagnostics),
            "species_history" => Ok(RecordKind::SpeciesHistory),
            "top_genomes" => Ok(RecordKind::TopGenomes),
            "scape_summary" => Ok(RecordKind::ScapeSummary),
            "run_index" => Ok(RecordKind::RunIndex),
            other => Err(ProtoError::Validation(format!("unsupported record kind '{other}'"))),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// A typed envelope wrapping every persisted payload with the
/// schema/codec pair it was written under, so a reader can reject a
/// record it no longer knows how to interpret instead of silently
/// misreading it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record<T> {
    pub schema_version: u32,
    pub codec_version: u32,
    pub kind: RecordKind,
    pub payload: T,
}

impl<T> Record<T> {
    pub fn new(kind: RecordKind, payload: T) -> Self {
        Record {
            schema_version: SCHEMA_VERSION,
            codec_version: CODEC_VERSION,
            kind,
            payload,
        }
    }

    pub fn check_version(&self) -> ProtoResult<()> {
        if self.schema_version != SCHEMA_VERSION || self.codec_version != CODEC_VERSION {
            return Err(ProtoError::VersionMismatch {
                expected_schema: SCHEMA_VERSION,
                expected_codec: CODEC_VERSION,
                actual_schema: self.schema_version,
                actual_codec: self.codec_version,
            });
        }
        Ok(())
    }
}

/// Reject a scalar that can't round-trip through JSON without silent
/// data loss (`serde_json` encodes NaN/Infinity as `null`).
pub fn require_finite(value: f64, field: &str) -> ProtoResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ProtoError::Validation(format!("field '{field}' is not finite: {value}")))
    }
}

/// Encode a record to pretty JSON, rejecting the kind mismatch case up
/// front so a caller can never write a `Record<T>` tagged with the
/// wrong `RecordKind`.
pub fn encode_record<T: Serialize>(record: &Record<T>, expected_kind: RecordKind) -> ProtoResult<String> {
    if record.kind != expected_kind {
        return Err(ProtoError::Validation(format!(
            "record kind mismatch: expected '{expected_kind}', got '{}'",
            record.kind
        )));
    }
    serde_json::to_string_pretty(record).map_err(ProtoError::from)
}

/// Decode a record, checking both the schema/codec pair and that the
/// kind tag matches what the caller expected to read.
pub fn decode_record<T: for<'de> Deserialize<'de>>(raw: &str, expected_kind: RecordKind) -> ProtoResult<Record<T>> {
    let record: Record<T> = serde_json::from_str(raw).map_err(ProtoError::from)?;
    record.check_version()?;
    if record.kind != expected_kind {
        return Err(ProtoError::Validation(format!(
            "record kind mismatch: expected '{expected_kind}', got '{}'",
            record.kind
        )));
    }
    Ok(record)
}

pub fn error_kind_is_version_mismatch(err: &ProtoError) -> bool {
    err.kind() == ErrorKind::VersionMismatch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_encode_decode() {
        let record = Record::new(RecordKind::ScapeSummary, vec![1, 2, 3]);
        let encoded = encode_record(&record, RecordKind::ScapeSummary).unwrap();
        let decoded: Record<Vec<i32>> = decode_record(&encoded, RecordKind::ScapeSummary).unwrap();
        assert_eq!(decoded.payload, vec![1, 2, 3]);
    }

    #[test]
    fn mismatched_kind_on_decode_is_rejected() {
        let record = Record::new(RecordKind::ScapeSummary, 7u32);
        let encoded = encode_record(&record, RecordKind::ScapeSummary).unwrap();
        let err = decode_record::<u32>(&encoded, RecordKind::TopGenomes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn version_mismatch_on_decode_is_detected() {
        let mut record = Record::new(RecordKind::ScapeSummary, 7u32);
        record.schema_version = 99;
        let encoded = serde_json::to_string(&record).unwrap();
        let err = decode_record::<u32>(&encoded, RecordKind::ScapeSummary).unwrap_err();
        assert!(error_kind_is_version_mismatch(&err));
    }

    #[test]
    fn non_finite_scalar_is_rejected() {
        assert!(require_finite(f64::NAN, "best_fitness").is_err());
        assert!(require_finite(f64::INFINITY, "best_fitness").is_err());
        assert!(require_finite(0.5, "best_fitness").is_ok());
    }

    #[test]
    fn unsupported_kind_tag_fails_normalize() {
        let err = RecordKind::normalize("not_a_kind").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
