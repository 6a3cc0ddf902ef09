// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tracks which run ids currently have a live control channel, so a
//! `pause`/`stop`/`goal-reached`/`print-trace` request against an
//! unknown or already-finished run fails loudly instead of silently
//! doing nothing.

use crate::command::{control_channel, ControlCommand, ControlHandle};
use protogonos_genome::{ProtoError, ProtoResult};
use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct ControlRegistry {
    handles: Arc<Mutex<HashMap<String, ControlHandle>>>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        ControlRegistry::default()
    }

    /// Register a freshly started run, returning the receiver half its
    /// `RunController` should drain.
    pub fn register(&self, run_id: impl Into<String>) -> (ControlHandle, Receiver<ControlCommand>) {
        let (handle, receiver) = control_channel();
        self.handles.lock().unwrap().insert(run_id.into(), handle.clone());
        (handle, receiver)
    }

    /// Drop a finished run's handle. Further commands against its id
    /// become `NotFound` errors.
    pub fn unregister(&self, run_id: &str) {
        self.handles.lock().unwrap().remove(run_id);
    }

    pub fn is_active(&self, run_id: &str) -> bool {
        self.handles.lock().unwrap().contains_key(run_id)
    }

    pub fn send(&self, run_id: &str, command: ControlCommand) -> ProtoResult<()> {
        let handle = {
            let handles = self.handles.lock().unwrap();
            handles
                .get(run_id)
                .cloned()
                .ok_or_else(|| ProtoError::NotFound(format!("no active run with id '{run_id}'")))?
        };
        handle
            .send(command)
            .map_err(|_| ProtoError::NotFound(format!("run '{run_id}' control channel closed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_against_unknown_run_id_is_not_found() {
        let registry = ControlRegistry::new();
        let err = registry.send("missing", ControlCommand::Pause).unwrap_err();
        assert_eq!(err.kind(), protogonos_genome::ErrorKind::NotFound);
    }

    #[test]
    fn registered_run_accepts_commands_until_unregistered() {
        let registry = ControlRegistry::new();
        let (_handle, receiver) = registry.register("run-a");
        assert!(registry.is_active("run-a"));

        registry.send("run-a", ControlCommand::Stop).unwrap();
        assert_eq!(receiver.recv().unwrap(), ControlCommand::Stop);

        registry.unregister("run-a");
        assert!(!registry.is_active("run-a"));
        assert!(registry.send("run-a", ControlCommand::Stop).is_err());
    }
}
