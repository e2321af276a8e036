use std::collections::VecDeque;
use std::sync::Arc;

use egui::KeyboardShortcut;
use parking_lot::Mutex;

use crate::host::PresetId;
use crate::item::ItemId;

/// Everything that can drive the switcher
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// A key combination was pressed
    Shortcut(KeyboardShortcut),
    /// An item was clicked in the picker
    Picker(ItemId),
    /// The toolbar button was clicked
    Toolbar,
    /// Next brush of a group
    Next(ItemId),
    /// Previous brush of a group
    Previous(ItemId),
    /// The host selected a preset, maybe on its own
    HostPresetChanged(Option<PresetId>),
    /// The host paint tool is being left (`false`) or was entered (`true`)
    HostToolChanged { activated: bool },
    /// The host eraser toggle changed to the given state
    HostEraserModeChanged(bool),
    /// Turn off whatever is active
    Deactivate,
    /// The plugin is disabled or the host is closing
    Shutdown,
}

/// Triggers waiting for the one being processed to finish.
///
/// Clones share the same queue, so event handlers and host callbacks can
/// hold one and enqueue while the coordinator is busy.
#[derive(Debug, Clone, Default)]
pub struct TriggerQueue {
    pending: Arc<Mutex<VecDeque<Trigger>>>,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, trigger: Trigger) {
        self.pending.lock().push_back(trigger);
    }

    pub fn pop(&self) -> Option<Trigger> {
        self.pending.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
