// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::error::ProtoError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Current supported schema/codec pair. Every persisted record
/// carries this; a mismatch on decode is a hard error.
pub const SCHEMA_VERSION: u32 = 1;
pub const CODEC_VERSION: u32 = 1;

/// A point-in-time population membership record.
///
/// `agent_ids` must be duplicate-free and preserve first-occurrence
/// order; this is enforced at construction, not merely documented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub id: String,
    pub generation: u64,
    pub agent_ids: Vec<String>,
    pub schema_version: u32,
    pub codec_version: u32,
}

impl PopulationSnapshot {
    pub fn new(id: impl Into<String>, generation: u64, agent_ids: Vec<String>) -> Result<Self, ProtoError> {
        let mut seen = HashSet::with_capacity(agent_ids.len());
        for id in &agent_ids {
            if !seen.insert(id.clone()) {
                return Err(ProtoError::Validation(format!(
                    "population snapshot contains duplicate agent id '{id}'"
                )));
            }
        }
        Ok(PopulationSnapshot {
            id: id.into(),
            generation,
            agent_ids,
            schema_version: SCHEMA_VERSION,
            codec_version: CODEC_VERSION,
        })
    }

    pub fn check_version(&self) -> Result<(), ProtoError> {
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

    /// Reconcile this snapshot's membership against a previous one,
    /// returning `(added, removed)` agent id sets: births and deaths
    /// for this generation.
    pub fn diff(&self, previous: &PopulationSnapshot) -> (Vec<String>, Vec<String>) {
        let prev: HashSet<&String> = previous.agent_ids.iter().collect();
        let curr: HashSet<&String> = self.agent_ids.iter().collect();
        let added = self
            .agent_ids
            .iter()
            .filter(|id| !prev.contains(id))
            .cloned()
            .collect();
        let removed = previous
            .agent_ids
            .iter()
            .filter(|id| !curr.contains(id))
            .cloned()
            .collect();
        (added, removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_agent_ids_are_rejected() {
        let err = PopulationSnapshot::new("p1", 0, vec!["a".into(), "b".into(), "a".into()])
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn diff_reports_added_and_removed() {
        let prev = PopulationSnapshot::new("p0", 0, vec!["a".into(), "b".into()]).unwrap();
        let curr = PopulationSnapshot::new("p1", 1, vec!["b".into(), "c".into()]).unwrap();
        let (added, removed) = curr.diff(&prev);
        assert_eq!(added, vec!["c".to_string()]);
        assert_eq!(removed, vec!["a".to_string()]);
    }

    #[test]
    fn version_mismatch_is_detected() {
        let mut snap = PopulationSnapshot::new("p0", 0, vec![]).unwrap();
        snap.schema_version = 99;
        assert!(snap.check_version().is_err());
    }
}
