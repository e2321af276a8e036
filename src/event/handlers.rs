use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{EventHandler, SwitchEvent};

/// Keeps every event it receives; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<SwitchEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far
    pub fn events(&self) -> Vec<SwitchEvent> {
        self.events.lock().clone()
    }

    /// Drain the received events
    pub fn take(&self) -> Vec<SwitchEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventHandler for EventLog {
    fn handle_event(&mut self, event: &SwitchEvent) {
        self.events.lock().push(event.clone());
    }
}
