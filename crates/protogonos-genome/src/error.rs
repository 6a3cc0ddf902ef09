// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy shared across the evolution core.
//!
//! Every error carries a `kind()` so the orchestrator can distinguish
//! fatal-at-boundary errors (Validation, Compatibility) from
//! per-genome recoverable ones (ScapeFailure) without string matching.

use thiserror::Error;

pub type ProtoResult<T> = Result<T, ProtoError>;

/// The error kind tag, exposed separately from the message so callers
/// can branch on it (e.g. to decide whether to abort a run or just
/// record a per-genome failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Compatibility,
    NotFound,
    VersionMismatch,
    Cancelled,
    ScapeFailure,
    StoreFailure,
}

#[derive(Error, Debug, Clone)]
pub enum ProtoError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("compatibility error: {0}")]
    Compatibility(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("version mismatch: expected schema {expected_schema}/codec {expected_codec}, got {actual_schema}/{actual_codec}")]
    VersionMismatch {
        expected_schema: u32,
        expected_codec: u32,
        actual_schema: u32,
        actual_codec: u32,
    },

    #[error("cancelled")]
    Cancelled,

    #[error("scape failure evaluating genome {genome_id}: {message}")]
    ScapeFailure { genome_id: String, message: String },

    #[error("store failure: {0}")]
    StoreFailure(String),
}

impl ProtoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtoError::Validation(_) => ErrorKind::Validation,
            ProtoError::Compatibility(_) => ErrorKind::Compatibility,
            ProtoError::NotFound(_) => ErrorKind::NotFound,
            ProtoError::VersionMismatch { .. } => ErrorKind::VersionMismatch,
            ProtoError::Cancelled => ErrorKind::Cancelled,
            ProtoError::ScapeFailure { .. } => ErrorKind::ScapeFailure,
            ProtoError::StoreFailure(_) => ErrorKind::StoreFailure,
        }
    }

    /// Whether this error should abort an in-progress generational run.
    /// Only cancellation and store failure are run-fatal inside the
    /// loop; scape failures are recorded per-genome instead.
    pub fn is_run_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Cancelled | ErrorKind::StoreFailure)
    }
}

impl From<serde_json::Error> for ProtoError {
    fn from(err: serde_json::Error) -> Self {
        ProtoError::StoreFailure(format!("json: {err}"))
    }
}

impl From<std::io::Error> for ProtoError {
    fn from(err: std::io::Error) -> Self {
        ProtoError::StoreFailure(format!("io: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scape_failure_is_not_run_fatal() {
        let err = ProtoError::ScapeFailure {
            genome_id: "g1".into(),
            message: "nan fitness".into(),
        };
        assert!(!err.is_run_fatal());
        assert_eq!(err.kind(), ErrorKind::ScapeFailure);
    }

    #[test]
    fn cancelled_and_store_failure_are_run_fatal() {
        assert!(ProtoError::Cancelled.is_run_fatal());
        assert!(ProtoError::StoreFailure("disk full".into()).is_run_fatal());
    }
}
