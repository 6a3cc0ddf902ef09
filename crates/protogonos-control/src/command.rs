// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Control-channel commands for a running evolution loop, and the
//! sending half callers use to issue them.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// One instruction to a `RunController`, drained at the suspension
/// points between generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Continue,
    Stop,
    GoalReached,
    PrintTrace,
}

#[derive(Debug, thiserror::Error)]
#[error("control channel closed; the run has already finished")]
pub struct ControlSendError;

/// Sending half of a run's control channel. Cheap to clone; every
/// clone feeds the same receiver the `RunController` drains.
#[derive(Clone)]
pub struct ControlHandle {
    sender: Sender<ControlCommand>,
}

impl ControlHandle {
    pub fn send(&self, command: ControlCommand) -> Result<(), ControlSendError> {
        self.sender.send(command).map_err(|_| ControlSendError)
    }

    pub fn pause(&self) -> Result<(), ControlSendError> {
        self.send(ControlCommand::Pause)
    }

    pub fn continue_run(&self) -> Result<(), ControlSendError> {
        self.send(ControlCommand::Continue)
    }

    pub fn stop(&self) -> Result<(), ControlSendError> {
        self.send(ControlCommand::Stop)
    }

    pub fn goal_reached(&self) -> Result<(), ControlSendError> {
        self.send(ControlCommand::GoalReached)
    }

    pub fn print_trace(&self) -> Result<(), ControlSendError> {
        self.send(ControlCommand::PrintTrace)
    }

    /// Send a `Continue` after `delay` from a background thread.
    /// Implements `AutoContinueAfter` without the orchestrator needing
    /// its own timer: call `pause()` then `schedule_continue_after()`
    /// before starting the run.
    pub fn schedule_continue_after(&self, delay: Duration) {
        let sender = self.sender.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            let _ = sender.send(ControlCommand::Continue);
        });
    }
}

/// Create a fresh control channel. The `ControlHandle` is the send
/// side a caller holds onto (and can clone across threads); the
/// `Receiver` is handed to the `RunController` that owns the run.
pub fn control_channel() -> (ControlHandle, Receiver<ControlCommand>) {
    let (sender, receiver) = mpsc::channel();
    (ControlHandle { sender }, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sent_commands_arrive_in_order() {
        let (handle, receiver) = control_channel();
        handle.pause().unwrap();
        handle.continue_run().unwrap();
        assert_eq!(receiver.recv().unwrap(), ControlCommand::Pause);
        assert_eq!(receiver.recv().unwrap(), ControlCommand::Continue);
    }

    #[test]
    fn send_after_receiver_dropped_is_an_error() {
        let (handle, receiver) = control_channel();
        drop(receiver);
        assert!(handle.stop().is_err());
    }

    #[test]
    fn scheduled_continue_arrives_after_delay() {
        let (handle, receiver) = control_channel();
        handle.schedule_continue_after(Duration::from_millis(10));
        let command = receiver.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(command, ControlCommand::Continue);
    }
}
