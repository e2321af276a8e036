use serde::{Deserialize, Serialize};

use crate::item::{Brush, ItemId, ItemTree};

/// Which brush the toolbar button activates when nothing is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    /// Always the first brush of the tree
    FirstFromList,
    /// The brush activated last, falling back to the first one
    #[default]
    LastSelected,
}

/// User preferences of the switcher
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SwitcherSettings {
    #[serde(default)]
    pub selection_mode: SelectionMode,

    /// Last brush activated through any trigger
    #[serde(default)]
    pub last_selected: Option<ItemId>,
}

impl SwitcherSettings {
    /// Brush the toolbar button targets
    pub fn default_brush<'a>(&self, tree: &'a ItemTree) -> Option<&'a Brush> {
        let remembered = match self.selection_mode {
            SelectionMode::FirstFromList => None,
            SelectionMode::LastSelected => self.last_selected.and_then(|id| tree.brush(id)),
        };
        remembered.or_else(|| tree.first_brush())
    }
}
