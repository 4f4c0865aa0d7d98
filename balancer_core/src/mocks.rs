//! Test and helper sinks for balancer_core.

use crate::events::{CommandSink, SetCommand};
use std::sync::{Arc, Mutex};

/// Sink that records every outbound command; useful for asserting on the
/// command path in tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    commands: Arc<Mutex<Vec<SetCommand>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<SetCommand> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<SetCommand> {
        self.commands
            .lock()
            .ok()
            .and_then(|c| c.last().cloned())
    }
}

impl CommandSink for RecordingSink {
    fn send(&self, cmd: &SetCommand) {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(cmd.clone());
        }
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl CommandSink for NullSink {
    fn send(&self, _cmd: &SetCommand) {}
}
