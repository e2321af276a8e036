use std::cell::RefCell;
use std::collections::VecDeque;

use log::trace;

use crate::event::{EventHandler, SwitchEvent};

/// Broadcasts switcher events to registered handlers.
///
/// Events emitted by a handler while a broadcast is running are delivered
/// after the current one, in order. Handlers subscribed during a broadcast
/// receive the events emitted after they joined.
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
    joining: RefCell<Vec<Box<dyn EventHandler>>>,
    pending: RefCell<VecDeque<SwitchEvent>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.len()))
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            joining: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
        }
    }

    /// Subscribe a handler to receive events
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        match self.handlers.try_borrow_mut() {
            Ok(mut handlers) => handlers.push(handler),
            // a broadcast is running: it adds the handler before its next event
            Err(_) => self.joining.borrow_mut().push(handler),
        }
    }

    /// Number of subscribed handlers
    pub fn len(&self) -> usize {
        self.handlers.try_borrow().map(|handlers| handlers.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Emit an event to all registered handlers
    pub fn emit(&self, event: SwitchEvent) {
        self.pending.borrow_mut().push_back(event);
        // a broadcast is already running further up the stack: it drains the queue
        let Ok(mut handlers) = self.handlers.try_borrow_mut() else {
            return;
        };
        loop {
            handlers.extend(self.joining.borrow_mut().drain(..));
            let Some(event) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            trace!("broadcasting {event:?} to {} handler(s)", handlers.len());
            for handler in handlers.iter_mut() {
                handler.handle_event(&event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;

    #[test]
    fn test_every_handler_receives_events() {
        let bus = EventBus::new();
        let first = EventLog::new();
        let second = EventLog::new();
        bus.subscribe(Box::new(first.clone()));
        bus.subscribe(Box::new(second.clone()));

        bus.emit(SwitchEvent::ShortcutsChanged);
        assert_eq!(bus.len(), 2);
        assert_eq!(first.events(), vec![SwitchEvent::ShortcutsChanged]);
        assert_eq!(second.events(), vec![SwitchEvent::ShortcutsChanged]);
    }

    thread_local! {
        static SHARED_BUS: EventBus = EventBus::new();
    }

    /// Subscribes `late` to the shared bus on the first event it sees
    struct Recruiter {
        late: Option<EventLog>,
    }

    impl EventHandler for Recruiter {
        fn handle_event(&mut self, _event: &SwitchEvent) {
            if let Some(late) = self.late.take() {
                SHARED_BUS.with(|bus| bus.subscribe(Box::new(late)));
            }
        }
    }

    #[test]
    fn test_subscribe_during_broadcast() {
        let late = EventLog::new();
        SHARED_BUS.with(|bus| {
            bus.subscribe(Box::new(Recruiter {
                late: Some(late.clone()),
            }));
            bus.emit(SwitchEvent::ShortcutsChanged);
            bus.emit(SwitchEvent::TreeReplaced { setup: None });
            assert_eq!(bus.len(), 2);
        });
        assert_eq!(late.events(), vec![SwitchEvent::TreeReplaced { setup: None }]);
    }
}
