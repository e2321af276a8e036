use crate::item::ItemId;
use crate::setup::SetupId;

/// Notifications broadcast to the UI collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchEvent {
    /// A brush became active, or nothing is active anymore
    ActivationChanged {
        item: Option<ItemId>,
    },
    /// A group's navigation position moved; `None` when it was reset
    GroupCursorChanged {
        group: ItemId,
        index: Option<usize>,
    },
    DriftDetected {
        setup: SetupId,
        drifted: bool,
    },
    /// User edits were written back into the brush on deactivation
    BrushModified {
        item: ItemId,
    },
    /// The live tree was replaced wholesale
    TreeReplaced {
        setup: Option<SetupId>,
    },
    ShortcutsChanged,
}
